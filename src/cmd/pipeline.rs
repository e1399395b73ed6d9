use std::{io, path::PathBuf, process::Stdio};

use itertools::Itertools;
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
    task::JoinHandle,
};

use super::{
    plan::StageSpec,
    resolve::{ExecutableSearch, Resolver},
};
use crate::{
    jobs::{BackgroundJob, JobId, JobRegistry},
    process::{child::terminate_all, Pipe, PipelineOutput, Stage, StageReport},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("command not found: {command}")]
    CommandNotFound { stage: usize, command: String },
    #[error("failed to create pipe: {0}")]
    Pipe(#[from] nix::Error),
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read output of {command}: {source}")]
    Capture {
        command: String,
        #[source]
        source: io::Error,
    },
    /// tokio drops a child's pid once it is reaped. Unreachable while
    /// background stages are registered before anything waits on them.
    #[error("{command} exited before it could be tracked")]
    Detach { command: String },
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Completed(PipelineOutput),
    Backgrounded(JobId),
}

type Capture = JoinHandle<io::Result<Vec<u8>>>;

/// The streams a foreground stage's output is read from while it runs.
struct Captured {
    stderr: Option<Capture>,
    stdout: Option<Capture>,
}

/// Spawns pipelines of external commands.
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    resolver: Resolver,
}

impl PipelineExecutor {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Runs `stages` as one pipeline.
    ///
    /// `stdin` feeds the first stage and `stdout` receives the last; when
    /// absent the first stage inherits the shell's stdin and the last stage's
    /// output is captured and returned. Background pipelines are handed to
    /// `jobs` without waiting.
    ///
    /// No process outlives a failed call: anything already spawned is killed
    /// and reaped before the error is returned.
    pub async fn run(
        &self,
        jobs: &mut JobRegistry,
        stages: &[StageSpec],
        background: bool,
        stdin: Option<Stdio>,
        stdout: Option<Stdio>,
    ) -> Result<PipelineOutcome, PipelineError> {
        if stages.is_empty() {
            return Ok(PipelineOutcome::Completed(PipelineOutput::default()));
        }

        let paths = self.resolve_all(stages)?;

        let mut spawned = Vec::with_capacity(stages.len());
        let mut captured = Vec::with_capacity(stages.len());

        let res = spawn_stages(
            stages,
            paths,
            background,
            stdin,
            stdout,
            &mut spawned,
            &mut captured,
        );

        if let Err(err) = res {
            warn!("pipeline aborted: {err}");
            terminate_all(&mut spawned).await;
            return Err(err);
        }

        if background {
            let label = stages.iter().join(" | ");

            return match BackgroundJob::new(label, spawned) {
                Some(job) => Ok(PipelineOutcome::Backgrounded(jobs.register(job))),
                None => Err(PipelineError::Detach {
                    command: stages[stages.len() - 1].command.clone(),
                }),
            };
        }

        let res = wait_stages(&mut spawned, captured).await;

        // a no-op for stages that already exited
        terminate_all(&mut spawned).await;

        res.map(PipelineOutcome::Completed)
    }

    fn resolve_all(&self, stages: &[StageSpec]) -> Result<Vec<PathBuf>, PipelineError> {
        stages
            .iter()
            .enumerate()
            .map(|(idx, stage)| {
                self.resolver.resolve(&stage.command).ok_or_else(|| {
                    debug!(stage = idx, command = %stage.command, "resolution failed");
                    PipelineError::CommandNotFound {
                        stage: idx,
                        command: stage.command.clone(),
                    }
                })
            })
            .collect()
    }
}

/// Spawns every stage left to right, pushing each into `spawned` as soon as it
/// exists so the caller can clean up after a partial failure.
fn spawn_stages(
    stages: &[StageSpec],
    paths: Vec<PathBuf>,
    background: bool,
    stdin: Option<Stdio>,
    mut stdout: Option<Stdio>,
    spawned: &mut Vec<Stage>,
    captured: &mut Vec<Captured>,
) -> Result<(), PipelineError> {
    let last = stages.len() - 1;
    let mut next_stdin = stdin;

    for (idx, (spec, path)) in stages.iter().zip(paths).enumerate() {
        let mut cmd = Command::new(&path);
        cmd.args(&spec.args).kill_on_drop(true);

        cmd.stdin(next_stdin.take().unwrap_or_else(|| {
            if background {
                Stdio::null()
            } else {
                Stdio::inherit()
            }
        }));

        let read_end = if idx < last {
            let pipe = Pipe::new()?;
            cmd.stdout(pipe.write);
            Some(pipe.read)
        } else {
            cmd.stdout(stdout.take().unwrap_or_else(|| {
                if background {
                    Stdio::inherit()
                } else {
                    Stdio::piped()
                }
            }));
            None
        };

        cmd.stderr(if background {
            Stdio::inherit()
        } else {
            Stdio::piped()
        });

        trace!(stage = idx, ?path, args = ?spec.args, "spawning stage");

        let mut child = cmd.spawn().map_err(|source| PipelineError::Spawn {
            command: spec.command.clone(),
            source,
        })?;

        // the command still holds the parent's copy of the write end, the
        // next stage never sees eof until it is gone
        drop(cmd);

        if !background {
            captured.push(Captured {
                stderr: child.stderr.take().map(capture),
                stdout: child.stdout.take().map(capture),
            });
        }

        spawned.push(Stage {
            command: spec.command.clone(),
            path,
            args: spec.args.clone(),
            child,
        });

        next_stdin = read_end.map(Stdio::from);
    }

    Ok(())
}

/// Waits for every stage in order, then collects what each one wrote.
async fn wait_stages(
    spawned: &mut [Stage],
    captured: Vec<Captured>,
) -> Result<PipelineOutput, PipelineError> {
    let mut statuses = Vec::with_capacity(spawned.len());

    for stage in spawned.iter_mut() {
        let status = stage
            .child
            .wait()
            .await
            .map_err(|source| PipelineError::Wait {
                command: stage.command.clone(),
                source,
            })?;

        trace!(command = %stage.command, ?status, "stage exited");
        statuses.push(status);
    }

    let mut output = PipelineOutput::default();

    for ((stage, status), streams) in spawned.iter().zip(statuses).zip(captured) {
        let stderr = collect(&stage.command, streams.stderr).await?;
        let stdout = collect(&stage.command, streams.stdout).await?;

        if !stdout.is_empty() {
            // only the last stage's stdout is ever piped back to us
            output.stdout = stdout.trim_end().to_owned();
        }

        output.stages.push(StageReport {
            command: stage.command.clone(),
            status,
            stderr,
        });
    }

    Ok(output)
}

fn capture<R>(mut stream: R) -> Capture
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

async fn collect(command: &str, capture: Option<Capture>) -> Result<String, PipelineError> {
    let Some(capture) = capture else {
        return Ok(String::new());
    };

    let buf = capture
        .await
        .map_err(io::Error::from)
        .and_then(|res| res)
        .map_err(|source| PipelineError::Capture {
            command: command.to_owned(),
            source,
        })?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
