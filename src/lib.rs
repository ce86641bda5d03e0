//! # cliout
//!
//! Console backend for structured command output.
//!
//! Commands describe their results as tables, lists and fields through
//! [`StructuredOutput`]; a [`RenderContext`] turns those calls into aligned
//! text on a [`Sink`]. Wrapping the destination in a [`QuotingSink`] gives
//! the same output as escaped, marker-framed records for a program reading
//! the console alongside a human.

pub mod config;
pub mod error;
pub mod interp;
pub mod renderer;
pub mod script;
pub mod sink;

#[cfg(test)]
mod tests;

pub use config::{OutputMode, RenderConfig};
pub use error::{InvariantViolation, RenderError, Result};
pub use interp::{console, quoted_console, CommandRunner, ConsoleInterpreter, Interpreter};
pub use renderer::*;
pub use script::{RenderEvent, Script, ScriptCommand};
pub use sink::*;
