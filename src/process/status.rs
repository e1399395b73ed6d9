use std::process::ExitStatus;

/// What one foreground stage left behind once it exited.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub command: String,
    pub status: ExitStatus,
    pub stderr: String,
}

impl StageReport {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// A stage failed if it wrote to stderr or exited non-zero.
    pub fn failure(&self) -> bool {
        !self.success() || !self.stderr.trim().is_empty()
    }

    /// Killed by SIGPIPE: whoever read its output stopped reading early.
    #[cfg(unix)]
    pub fn broken_pipe(&self) -> bool {
        use std::os::unix::process::ExitStatusExt;

        self.status.signal() == Some(nix::sys::signal::Signal::SIGPIPE as i32)
    }

    #[cfg(not(unix))]
    pub fn broken_pipe(&self) -> bool {
        false
    }
}

/// The result of a foreground pipeline that ran to completion.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Captured stdout of the last stage with trailing whitespace removed.
    /// Empty when the last stage wrote somewhere else.
    pub stdout: String,
    pub stages: Vec<StageReport>,
}

impl PipelineOutput {
    /// Every failed stage, except upstream stages that merely lost their
    /// reader.
    pub fn failures(&self) -> impl Iterator<Item = &StageReport> {
        let last = self.stages.len().saturating_sub(1);

        self.stages
            .iter()
            .enumerate()
            .filter(move |(idx, stage)| {
                stage.failure() && !(*idx < last && stage.broken_pipe())
            })
            .map(|(_, stage)| stage)
    }
}
