use std::{
    fs::{self, File},
    io::Write,
    process::Stdio,
};

use color_eyre::Result;
use tokio::select;

use crate::{
    builtins::{BuiltinCommand, BuiltinCommands},
    cmd::{
        pipeline::{PipelineExecutor, PipelineOutcome},
        plan::CommandPlan,
        resolve::Resolver,
    },
    config::ShellConfig,
    input::{InputMessage, InputReader},
    jobs::JobRegistry,
    parse::parse_command,
};

pub mod alias;
pub mod history;

pub use self::{alias::AliasTable, history::CommandHistory};

/// Everything a session mutates over its lifetime. Built-ins get it by
/// reference instead of reaching for globals.
#[derive(Debug, Default)]
pub struct ShellState {
    pub history: CommandHistory,
    pub aliases: AliasTable,
    pub jobs: JobRegistry,
    pub should_exit: bool,
}

impl ShellState {
    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            history: CommandHistory::with_limit(config.history_limit),
            aliases: config.aliases.clone().into_iter().collect(),
            jobs: JobRegistry::new(),
            should_exit: false,
        }
    }
}

pub struct Session {
    state: ShellState,
    executor: PipelineExecutor,
    prompt: Option<String>,
}

impl Session {
    pub fn new(config: &ShellConfig, show_prompt: bool) -> Self {
        let resolver = Resolver::detect(&config.extra_paths);
        trace!(?resolver, "selected executable resolver");

        Self {
            state: ShellState::from_config(config),
            executor: PipelineExecutor::new(resolver),
            prompt: show_prompt.then(|| config.prompt.clone()),
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    /// Reads and runs lines until `exit` or end of input, then kills whatever
    /// is still running in the background.
    pub async fn run<W: Write>(&mut self, input: &mut InputReader, out: &mut W) -> Result<()> {
        loop {
            if let Some(prompt) = &self.prompt {
                write!(out, "{prompt}")?;
                out.flush()?;
            }

            let msg = select! {
                msg = input.next_line() => msg,
                res = tokio::signal::ctrl_c() => {
                    res?;
                    writeln!(out, "\nUse 'exit' to quit.")?;
                    continue;
                }
            };

            match msg {
                InputMessage::Line(line) => {
                    self.execute_line(&line, out).await?;
                    if self.state.should_exit {
                        break;
                    }
                }
                InputMessage::Eof => {
                    if self.prompt.is_some() {
                        writeln!(out)?;
                    }
                    break;
                }
                InputMessage::Error(err) => {
                    error!("failed to read input: {err}");
                    writeln!(out, "plumb: {err}")?;
                    break;
                }
            }
        }

        self.shutdown().await;

        Ok(())
    }

    pub async fn shutdown(&mut self) {
        if !self.state.jobs.is_empty() {
            debug!(jobs = self.state.jobs.len(), "killing background jobs");
        }
        self.state.jobs.kill_all().await;
    }

    /// Runs one line. Only failures to write to `out` are returned; anything
    /// that goes wrong with the command itself is reported to `out`.
    pub async fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        for job in self.state.jobs.poll_and_reap() {
            writeln!(out, "{job}")?;
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        self.state.history.push(line);

        let expanded = self.state.aliases.expand(line);

        let plan = match parse_command(&expanded) {
            Ok(plan) => plan,
            Err(err) => {
                writeln!(out, "plumb: {err}")?;
                return Ok(());
            }
        };

        trace!(?plan, "parsed command");

        let Some(primary) = &plan.primary else {
            return Ok(());
        };

        if let Some(builtin) = BuiltinCommands::from_name(&primary.command) {
            return self.run_builtin(builtin, &plan, out);
        }

        self.run_pipeline(&plan, out).await
    }

    fn run_builtin<W: Write>(
        &mut self,
        builtin: BuiltinCommands,
        plan: &CommandPlan,
        out: &mut W,
    ) -> Result<()> {
        if plan.is_piped() {
            writeln!(out, "{}: built-in commands cannot be piped", builtin.name())?;
            return Ok(());
        }

        let args = plan
            .primary
            .as_ref()
            .map(|primary| primary.args.as_slice())
            .unwrap_or_default();

        let result = builtin.execute(&mut self.state, args);

        if result.output.is_empty() {
            return Ok(());
        }

        match &plan.output {
            Some(path) if result.success => {
                if let Err(err) = fs::write(path, format!("{}\n", result.output)) {
                    writeln!(out, "plumb: {path}: {err}")?;
                }
            }
            _ => writeln!(out, "{}", result.output)?,
        }

        Ok(())
    }

    async fn run_pipeline<W: Write>(&mut self, plan: &CommandPlan, out: &mut W) -> Result<()> {
        let stdin = match &plan.input {
            Some(path) => match File::open(path) {
                Ok(file) => Some(Stdio::from(file)),
                Err(err) => {
                    writeln!(out, "plumb: {path}: {err}")?;
                    return Ok(());
                }
            },
            None => None,
        };

        let stdout = match &plan.output {
            Some(path) => match File::create(path) {
                Ok(file) => Some(Stdio::from(file)),
                Err(err) => {
                    writeln!(out, "plumb: {path}: {err}")?;
                    return Ok(());
                }
            },
            None => None,
        };

        let stages = plan.pipeline().cloned().collect::<Vec<_>>();

        let outcome = self
            .executor
            .run(&mut self.state.jobs, &stages, plan.background, stdin, stdout)
            .await;

        match outcome {
            Ok(PipelineOutcome::Completed(output)) => {
                for stage in output.failures() {
                    let stderr = stage.stderr.trim_end();
                    if stderr.is_empty() {
                        writeln!(out, "{}: {}", stage.command, stage.status)?;
                    } else {
                        writeln!(out, "Error in command {}: {stderr}", stage.command)?;
                    }
                }

                if !output.stdout.is_empty() {
                    writeln!(out, "{}", output.stdout)?;
                }
            }
            Ok(PipelineOutcome::Backgrounded(id)) => {
                writeln!(out, "[{id}] Running in background")?;
            }
            Err(err) => {
                writeln!(out, "plumb: {err}")?;
            }
        }

        out.flush()?;

        Ok(())
    }
}
