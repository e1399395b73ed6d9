use enum_dispatch::enum_dispatch;
use strum::{EnumIter, IntoEnumIterator};

use crate::session::ShellState;

pub mod aliases;
pub mod cd;
pub mod exit;
pub mod help;
pub mod history;
pub mod jobs;
pub mod pwd;
pub mod whoami;

/// What a built-in hands back to the session: whether it worked and the text
/// to show (or write to the redirect target).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltinOutput {
    pub success: bool,
    pub output: String,
}

impl BuiltinOutput {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn empty() -> Self {
        Self::ok(String::new())
    }

    pub fn error(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Commands run inside the shell process. They only ever run as the primary
/// command of a line and are never part of a pipeline.
#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn usage(&self) -> &'static str;
    fn execute(&self, state: &mut ShellState, args: &[String]) -> BuiltinOutput;
}

#[enum_dispatch]
#[derive(EnumIter)]
pub enum BuiltinCommands {
    Cd(cd::Cd),
    Pwd(pwd::Pwd),
    Exit(exit::Exit),
    History(history::History),
    Aliases(aliases::Aliases),
    Jobs(jobs::Jobs),
    Help(help::Help),
    Whoami(whoami::Whoami),
}

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_by_name() {
        assert!(matches!(
            BuiltinCommands::from_name("cd"),
            Some(BuiltinCommands::Cd(_))
        ));
        assert!(BuiltinCommands::from_name("ls").is_none());
    }

    #[test]
    fn names_are_unique() {
        let mut names = BuiltinCommands::iter().map(|c| c.name()).collect::<Vec<_>>();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }
}
