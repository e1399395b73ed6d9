use crate::session::ShellState;

use super::{BuiltinCommand, BuiltinOutput};

#[derive(Default)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn usage(&self) -> &'static str {
        "exit         - Exit the shell"
    }

    fn execute(&self, state: &mut ShellState, _args: &[String]) -> BuiltinOutput {
        state.should_exit = true;
        BuiltinOutput::empty()
    }
}
