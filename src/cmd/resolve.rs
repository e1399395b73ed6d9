//! Command name to executable path resolution.
//!
//! The platform strategy is picked once by [`Resolver::detect`]; callers only
//! ever see [`ExecutableSearch::resolve`], which returns `None` when nothing
//! matches.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use enum_dispatch::enum_dispatch;

#[enum_dispatch(Resolver)]
pub trait ExecutableSearch {
    /// Directories searched for relative command names, in order.
    fn search_path(&self) -> &[PathBuf];

    fn resolve(&self, command: &str) -> Option<PathBuf>;
}

#[enum_dispatch]
#[derive(Debug, Clone)]
pub enum Resolver {
    Unix(UnixSearch),
    Windows(WindowsSearch),
}

impl Resolver {
    /// Builds the strategy for the platform we are running on, searching
    /// `PATH` followed by `extra`.
    pub fn detect(extra: &[PathBuf]) -> Self {
        let mut paths = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect::<Vec<_>>())
            .unwrap_or_default();

        for dir in extra {
            if !paths.contains(dir) {
                paths.push(dir.clone());
            }
        }

        if cfg!(windows) {
            let root = env::var_os("SystemRoot").unwrap_or_else(|| OsString::from(r"C:\Windows"));
            Self::Windows(WindowsSearch::with_system_dir(paths, PathBuf::from(root)))
        } else {
            Self::Unix(UnixSearch::new(paths))
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnixSearch {
    paths: Vec<PathBuf>,
}

impl UnixSearch {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl ExecutableSearch for UnixSearch {
    fn search_path(&self) -> &[PathBuf] {
        &self.paths
    }

    fn resolve(&self, command: &str) -> Option<PathBuf> {
        let path = Path::new(command);
        if path.is_absolute() {
            return is_executable(path).then(|| path.to_path_buf());
        }

        which_in(command, &self.paths)
    }
}

#[derive(Debug, Clone)]
pub struct WindowsSearch {
    paths: Vec<PathBuf>,
}

impl WindowsSearch {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Appends `<root>\System32` unless the search path already has it.
    pub fn with_system_dir(mut paths: Vec<PathBuf>, root: PathBuf) -> Self {
        let system32 = root.join("System32");
        if !paths.contains(&system32) {
            paths.push(system32);
        }
        Self { paths }
    }
}

impl ExecutableSearch for WindowsSearch {
    fn search_path(&self) -> &[PathBuf] {
        &self.paths
    }

    fn resolve(&self, command: &str) -> Option<PathBuf> {
        let path = Path::new(command);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }

        let mut variants = vec![command.to_owned()];
        if !command.to_ascii_lowercase().ends_with(".exe") {
            variants.push(format!("{command}.exe"));
        }

        variants.iter().find_map(|variant| {
            which_in(variant, &self.paths).or_else(|| {
                self.paths
                    .iter()
                    .map(|dir| dir.join(variant))
                    .find(|candidate| candidate.is_file())
            })
        })
    }
}

fn which_in(command: &str, paths: &[PathBuf]) -> Option<PathBuf> {
    let joined = match env::join_paths(paths) {
        Ok(joined) => joined,
        Err(err) => {
            warn!("search path is not joinable: {err}");
            return None;
        }
    };
    let cwd = env::current_dir().ok()?;

    match which::which_in(command, Some(joined), cwd) {
        Ok(found) => {
            trace!(command, ?found, "resolved executable");
            Some(found)
        }
        Err(err) => {
            trace!(command, "no executable found: {err}");
            None
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};

    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt};

    use super::*;

    fn touch(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn absolute_executable_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let tool = touch(dir.path(), "tool", 0o755);

        let resolver = UnixSearch::new(Vec::new());
        assert_eq!(resolver.resolve(tool.to_str().unwrap()), Some(tool));
    }

    #[test]
    fn absolute_non_executable_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data = touch(dir.path(), "data", 0o644);

        let resolver = UnixSearch::new(Vec::new());
        assert_eq!(resolver.resolve(data.to_str().unwrap()), None);
        assert_eq!(resolver.resolve(dir.path().to_str().unwrap()), None);
    }

    #[test]
    fn searches_configured_directories() {
        let dir = tempfile::tempdir().unwrap();
        let tool = touch(dir.path(), "plumb-test-tool", 0o755);

        let resolver = UnixSearch::new(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve("plumb-test-tool"), Some(tool));
    }

    #[test]
    fn missing_command_is_none() {
        let resolver = Resolver::detect(&[]);
        assert_eq!(resolver.resolve("nonexistentcommand123"), None);
    }

    #[test]
    fn finds_system_shell_on_path() {
        let resolver = Resolver::detect(&[]);
        let sh = resolver.resolve("sh").expect("sh on PATH");
        assert!(sh.is_absolute());
        assert!(sh.ends_with("sh"));
    }

    #[test]
    fn detect_appends_extra_directories_once() {
        let dir = tempfile::tempdir().unwrap();
        let extra = vec![dir.path().to_path_buf(), dir.path().to_path_buf()];

        let resolver = Resolver::detect(&extra);
        let count = resolver
            .search_path()
            .iter()
            .filter(|p| p.as_path() == dir.path())
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn windows_strategy_tries_exe_suffix() {
        let dir = tempfile::tempdir().unwrap();
        // not executable on unix, so only the manual scan can find it
        let tool = touch(dir.path(), "tool.exe", 0o644);

        let resolver = WindowsSearch::new(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve("tool"), Some(tool.clone()));
        assert_eq!(resolver.resolve("tool.exe"), Some(tool));
        assert_eq!(resolver.resolve("other"), None);
    }

    #[test]
    fn windows_strategy_adds_system_dir_once() {
        let root = PathBuf::from("/windows");
        let resolver = WindowsSearch::with_system_dir(vec![root.join("System32")], root);
        assert_eq!(resolver.search_path().len(), 1);
    }
}
