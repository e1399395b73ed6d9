use itertools::Itertools;

use crate::session::ShellState;

use super::{BuiltinCommand, BuiltinOutput};

#[derive(Default)]
pub struct Jobs;

impl BuiltinCommand for Jobs {
    fn name(&self) -> &'static str {
        "jobs"
    }

    fn usage(&self) -> &'static str {
        "jobs         - List background jobs"
    }

    fn execute(&self, state: &mut ShellState, _args: &[String]) -> BuiltinOutput {
        BuiltinOutput::ok(
            state
                .jobs
                .list()
                .map(|(id, label)| format!("[{id}] Running\t{label}"))
                .join("\n"),
        )
    }
}
