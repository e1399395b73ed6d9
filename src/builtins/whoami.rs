use crate::session::ShellState;

use super::{BuiltinCommand, BuiltinOutput};

#[derive(Default)]
pub struct Whoami;

impl BuiltinCommand for Whoami {
    fn name(&self) -> &'static str {
        "whoami"
    }

    fn usage(&self) -> &'static str {
        "whoami       - Show current user"
    }

    fn execute(&self, _state: &mut ShellState, _args: &[String]) -> BuiltinOutput {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "Unknown".into());

        BuiltinOutput::ok(user)
    }
}
