//! Console interpreters.
//!
//! An interpreter ties a [`RenderContext`] to the lifecycle hooks a command
//! loop drives (`init`, `resume`, `suspend`, `exec`, `display_prompt`).
//! Executing the command itself is left to a [`CommandRunner`]; the
//! interpreter only prepares the output stream around it.

use std::io::Write;

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::renderer::{RenderContext, StructuredOutput};
use crate::sink::{QuotingSink, SharedWriter, Sink, StreamSink};

/// Runs one command line against a structured output stream.
pub trait CommandRunner {
    fn run(&mut self, command: &str, out: &mut dyn StructuredOutput) -> Result<()>;
}

impl<F> CommandRunner for F
where
    F: FnMut(&str, &mut dyn StructuredOutput) -> Result<()>,
{
    fn run(&mut self, command: &str, out: &mut dyn StructuredOutput) -> Result<()> {
        self(command, out)
    }
}

/// Lifecycle hooks of a front end.
pub trait Interpreter {
    fn name(&self) -> &str;

    fn init(&mut self) -> Result<()>;

    /// Make this interpreter the one receiving commands.
    fn resume(&mut self) -> Result<()>;

    fn suspend(&mut self) -> Result<()>;

    /// Execute one command. A failing command is reported on the log stream
    /// and its error returned.
    fn exec(&mut self, command: &str) -> Result<()>;

    /// Show `prompt` unless the interpreter is quiet. Returns whether it was
    /// shown.
    fn display_prompt(&mut self, prompt: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Ready,
    Active,
}

/// Console front end over any sink.
pub struct ConsoleInterpreter<S: Sink> {
    name: String,
    context: RenderContext<S>,
    log: Box<dyn Sink>,
    runner: Box<dyn CommandRunner>,
    quiet: bool,
    state: Lifecycle,
}

/// Plain human-readable console.
pub fn console<W, L>(
    out: W,
    log: L,
    config: &RenderConfig,
    runner: impl CommandRunner + 'static,
) -> ConsoleInterpreter<StreamSink<W>>
where
    W: Write,
    L: Write + 'static,
{
    ConsoleInterpreter::new(
        "console",
        RenderContext::new(StreamSink::new(out)).with_verbosity(config.verbosity),
        Box::new(StreamSink::new(log)),
        runner,
    )
}

/// Console whose output and log streams are quoted records on one writer.
pub fn quoted_console<W>(
    raw: SharedWriter<W>,
    config: &RenderConfig,
    runner: impl CommandRunner + 'static,
) -> ConsoleInterpreter<QuotingSink<SharedWriter<W>>>
where
    W: Write + 'static,
{
    let out = QuotingSink::new(raw.clone(), config.console_marker.clone());
    let log = QuotingSink::new(raw, config.log_marker.clone());
    ConsoleInterpreter::new(
        "console-quoted",
        RenderContext::new(out).with_verbosity(config.verbosity),
        Box::new(log),
        runner,
    )
}

impl<S: Sink> ConsoleInterpreter<S> {
    pub fn new(
        name: impl Into<String>,
        context: RenderContext<S>,
        log: Box<dyn Sink>,
        runner: impl CommandRunner + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            context,
            log,
            runner: Box::new(runner),
            quiet: false,
            state: Lifecycle::Created,
        }
    }

    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    pub fn is_active(&self) -> bool {
        self.state == Lifecycle::Active
    }

    pub fn context(&self) -> &RenderContext<S> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext<S> {
        &mut self.context
    }

    pub fn log_mut(&mut self) -> &mut dyn Sink {
        self.log.as_mut()
    }

    pub fn into_context(self) -> RenderContext<S> {
        self.context
    }
}

impl<S: Sink> Interpreter for ConsoleInterpreter<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self) -> Result<()> {
        if self.state == Lifecycle::Created {
            self.state = Lifecycle::Ready;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.state == Lifecycle::Created {
            bail!("interpreter `{}` resumed before init", self.name);
        }
        debug!(interpreter = %self.name, "resuming");
        self.state = Lifecycle::Active;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        if self.state == Lifecycle::Active {
            debug!(interpreter = %self.name, "suspending");
            self.context.flush()?;
            self.log.flush()?;
            self.state = Lifecycle::Ready;
        }
        Ok(())
    }

    fn exec(&mut self, command: &str) -> Result<()> {
        if self.state != Lifecycle::Active {
            bail!("interpreter `{}` is not active", self.name);
        }
        info!(interpreter = %self.name, command, "executing");
        self.context.reset();

        let result = self.runner.run(command, &mut self.context);
        let flushed = self.context.flush();
        if let Err(err) = &result {
            self.log.write_unfiltered(&format!("{err:#}\n"))?;
            self.log.flush()?;
        }
        result?;
        Ok(flushed?)
    }

    fn display_prompt(&mut self, prompt: &str) -> Result<bool> {
        if self.quiet {
            return Ok(false);
        }
        self.context.text(prompt)?;
        self.context.flush()?;
        Ok(true)
    }
}
