use itertools::Itertools;

use crate::session::ShellState;

use super::{BuiltinCommand, BuiltinOutput};

#[derive(Default)]
pub struct History;

impl BuiltinCommand for History {
    fn name(&self) -> &'static str {
        "history"
    }

    fn usage(&self) -> &'static str {
        "history      - Show command history"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> BuiltinOutput {
        if !args.is_empty() {
            return BuiltinOutput::error("history: too many arguments");
        }

        let text = state
            .history
            .iter()
            .enumerate()
            .map(|(idx, line)| format!("{:4}  {line}", idx + 1))
            .join("\n");

        BuiltinOutput::ok(text)
    }
}
