use std::path::PathBuf;

use tokio::process::Child;

/// A spawned pipeline stage.
#[derive(Debug)]
pub struct Stage {
    pub command: String,
    pub path: PathBuf,
    pub args: Vec<String>,
    pub child: Child,
}

impl Stage {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Non-blocking check for exit. Errors count as exited, there is nothing
    /// left to wait for.
    pub fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(status) => status.is_some(),
            Err(err) => {
                warn!(command = %self.command, "failed to poll stage: {err}");
                true
            }
        }
    }

    /// Kills the stage if it is still running and reaps it. Killing a process
    /// that already exited is not an error.
    pub async fn terminate(&mut self) {
        if let Err(err) = self.child.kill().await {
            debug!(command = %self.command, "kill failed: {err}");
        }
    }
}

pub async fn terminate_all(stages: &mut [Stage]) {
    for stage in stages {
        stage.terminate().await;
    }
}
