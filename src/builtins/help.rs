use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::session::ShellState;

use super::{BuiltinCommand, BuiltinCommands, BuiltinOutput};

#[derive(Default)]
pub struct Help;

impl BuiltinCommand for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn usage(&self) -> &'static str {
        "help         - Show this help message"
    }

    fn execute(&self, _state: &mut ShellState, _args: &[String]) -> BuiltinOutput {
        let commands = BuiltinCommands::iter().map(|cmd| cmd.usage()).join("\n");

        BuiltinOutput::ok(format!(
            "Available Commands:\n------------------\n{commands}\n\n\
             Anything else runs as a program. `a | b` pipes, `< file` and \
             `> file` redirect, a trailing `&` runs in the background."
        ))
    }
}
