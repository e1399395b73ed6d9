use std::{fmt, str::FromStr};

use crate::parse::{parse_command, CommandParseError};

/// One command of a pipeline: a lower-cased command name and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub command: String,
    pub args: Vec<String>,
}

impl fmt::Display for StageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The structured form of one input line.
///
/// `input` feeds the first stage only and `output` receives the last stage
/// only. A plan without a primary command is the no-op plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPlan {
    pub primary: Option<StageSpec>,
    pub stages: Vec<StageSpec>,
    pub background: bool,
    pub input: Option<String>,
    pub output: Option<String>,
}

impl CommandPlan {
    pub fn is_noop(&self) -> bool {
        self.primary.is_none()
    }

    pub fn is_piped(&self) -> bool {
        !self.stages.is_empty()
    }

    /// Every stage in execution order, primary first.
    pub fn pipeline(&self) -> impl Iterator<Item = &StageSpec> {
        self.primary.iter().chain(self.stages.iter())
    }
}

impl FromStr for CommandPlan {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_command(s)
    }
}
