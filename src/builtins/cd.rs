use std::path::PathBuf;

use crate::session::ShellState;

use super::{BuiltinCommand, BuiltinOutput};

#[derive(Default)]
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn usage(&self) -> &'static str {
        "cd [dir]     - Change directory"
    }

    fn execute(&self, _state: &mut ShellState, args: &[String]) -> BuiltinOutput {
        trace!("executing cd builtin: {args:?}");

        let target = match args.first() {
            Some(path) => PathBuf::from(path),
            None => match dirs::home_dir() {
                Some(home) => home,
                None => return BuiltinOutput::error("cd: no home directory"),
            },
        };

        let full_path = match target.canonicalize() {
            Ok(path) => path,
            Err(_) => {
                return BuiltinOutput::error(format!(
                    "cd: no such directory: {}",
                    target.display()
                ))
            }
        };

        trace!("cd: {:?}", full_path);

        match std::env::set_current_dir(&full_path) {
            Ok(_) => BuiltinOutput::empty(),
            Err(err) => {
                error!("failed to cd: {}", err);
                BuiltinOutput::error(format!("cd: {}: {err}", target.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_fails() {
        let mut state = ShellState::default();
        let out = Cd.execute(&mut state, &["/definitely/not/here".into()]);
        assert!(!out.success);
        assert_eq!(out.output, "cd: no such directory: /definitely/not/here");
    }
}
