use crate::session::ShellState;

use super::{BuiltinCommand, BuiltinOutput};

#[derive(Default)]
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn usage(&self) -> &'static str {
        "pwd          - Print working directory"
    }

    fn execute(&self, _state: &mut ShellState, _args: &[String]) -> BuiltinOutput {
        match std::env::current_dir() {
            Ok(cwd) => BuiltinOutput::ok(cwd.to_string_lossy()),
            Err(err) => BuiltinOutput::error(format!("pwd: {err}")),
        }
    }
}
