use itertools::Itertools;

use crate::session::ShellState;

use super::{BuiltinCommand, BuiltinOutput};

#[derive(Default)]
pub struct Aliases;

impl BuiltinCommand for Aliases {
    fn name(&self) -> &'static str {
        "aliases"
    }

    fn usage(&self) -> &'static str {
        "aliases [-s name command] - List or define aliases"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> BuiltinOutput {
        match args {
            [] if state.aliases.is_empty() => BuiltinOutput::ok("No aliases defined"),
            [] => BuiltinOutput::ok(
                state
                    .aliases
                    .iter()
                    .map(|(name, cmd)| format!("{name}='{cmd}'"))
                    .join("\n"),
            ),
            [flag, name, command @ ..] if flag == "-s" => {
                let command = command.join(" ");
                let out = format!("Added alias: {name}='{command}'");
                state.aliases.insert(name.clone(), command);
                BuiltinOutput::ok(out)
            }
            _ => BuiltinOutput::error("Usage: aliases [-s name command]"),
        }
    }
}
