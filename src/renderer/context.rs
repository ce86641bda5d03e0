use std::fmt;

use tracing::{debug, trace, warn};

use crate::error::{InvariantViolation, RenderError, Result};
use crate::renderer::components::FieldFormatter;
use crate::renderer::traits::{Alignment, ListKind, StructuredOutput};
use crate::sink::Sink;

fn violation(violation: InvariantViolation) -> RenderError {
    warn!(%violation, "structured output misuse");
    violation.into()
}

/// Where the context is in the table protocol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TableState {
    #[default]
    Idle,
    Header {
        columns: usize,
        headers: usize,
        id: String,
    },
    Body {
        id: String,
    },
}

/// Console renderer for one output stream.
///
/// Owns its sink and a single suppression flag. The flag is raised by a
/// table declared with zero rows and cleared by the matching `end_table`;
/// while it is up, every output call except [`message`] and [`flush`] is
/// accepted and dropped.
///
/// [`message`]: StructuredOutput::message
/// [`flush`]: StructuredOutput::flush
#[derive(Debug)]
pub struct RenderContext<S: Sink> {
    sink: S,
    suppressed: bool,
    verbosity: u32,
    table: TableState,
    list_depth: usize,
}

impl<S: Sink> RenderContext<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            suppressed: false,
            verbosity: 0,
            table: TableState::Idle,
            list_depth: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn verbosity(&self) -> u32 {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: u32) {
        self.verbosity = verbosity;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn table_state(&self) -> &TableState {
        &self.table
    }

    pub fn list_depth(&self) -> usize {
        self.list_depth
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Forget any half-finished table or list.
    ///
    /// Called before each top-level command so that a command which bailed
    /// out mid-table cannot leave the stream suppressed.
    pub fn reset(&mut self) {
        if self.suppressed || self.table != TableState::Idle || self.list_depth > 0 {
            debug!(table = ?self.table, lists = self.list_depth, "resetting render state");
        }
        self.suppressed = false;
        self.table = TableState::Idle;
        self.list_depth = 0;
    }

    fn write_spaces(&mut self, count: usize) -> Result<()> {
        if count > 0 {
            self.sink.write_str(&FieldFormatter.blank(count))?;
        }
        Ok(())
    }

    fn write_separator(&mut self, alignment: Alignment) -> Result<()> {
        if let Some(separator) = FieldFormatter.separator(alignment) {
            self.sink.write_char(separator)?;
        }
        Ok(())
    }
}

impl<S: Sink> StructuredOutput for RenderContext<S> {
    fn begin_table(&mut self, columns: usize, rows: usize, id: &str) -> Result<()> {
        // Tables never nest, so a single flag is enough for suppression.
        if self.table != TableState::Idle || (rows > 0 && self.suppressed) {
            return Err(violation(InvariantViolation::NestedTable { id: id.to_string() }));
        }
        if rows == 0 {
            debug!(table = id, "empty table, suppressing output");
            self.suppressed = true;
        }
        self.table = TableState::Header {
            columns,
            headers: 0,
            id: id.to_string(),
        };
        Ok(())
    }

    fn table_header(
        &mut self,
        width: usize,
        alignment: Alignment,
        column_name: &str,
        label: &str,
    ) -> Result<()> {
        match &mut self.table {
            TableState::Header { headers, .. } => *headers += 1,
            _ => {
                return Err(violation(InvariantViolation::HeaderOutsideTable {
                    column: column_name.to_string(),
                }))
            }
        }
        if self.suppressed {
            return Ok(());
        }
        self.field_string(0, width, alignment, None, label)
    }

    fn table_body(&mut self) -> Result<()> {
        let (columns, headers, id) = match &self.table {
            TableState::Header {
                columns,
                headers,
                id,
            } => (*columns, *headers, id.clone()),
            _ => return Err(violation(InvariantViolation::BodyOutsideTable)),
        };
        if headers != columns {
            return Err(violation(InvariantViolation::HeaderCountMismatch {
                id,
                expected: columns,
                actual: headers,
            }));
        }
        self.table = TableState::Body { id };
        if self.suppressed {
            return Ok(());
        }
        // Terminates the header line.
        self.text("\n")
    }

    fn end_table(&mut self) -> Result<()> {
        self.suppressed = false;
        match std::mem::take(&mut self.table) {
            TableState::Idle => Err(violation(InvariantViolation::UnbalancedTableEnd)),
            _ => Ok(()),
        }
    }

    fn begin_list(&mut self, kind: ListKind, id: Option<&str>) -> Result<()> {
        self.list_depth += 1;
        trace!(?kind, id, depth = self.list_depth, "begin list");
        Ok(())
    }

    fn end_list(&mut self, kind: ListKind) -> Result<()> {
        if self.list_depth == 0 {
            return Err(violation(InvariantViolation::UnbalancedListEnd));
        }
        trace!(?kind, depth = self.list_depth, "end list");
        self.list_depth -= 1;
        Ok(())
    }

    fn field_int(
        &mut self,
        index: usize,
        width: usize,
        alignment: Alignment,
        name: Option<&str>,
        value: i64,
    ) -> Result<()> {
        if self.suppressed {
            return Ok(());
        }
        self.field_string(index, width, alignment, name, &value.to_string())
    }

    fn field_skip(
        &mut self,
        index: usize,
        width: usize,
        alignment: Alignment,
        name: Option<&str>,
    ) -> Result<()> {
        self.field_string(index, width, alignment, name, "")
    }

    fn field_string(
        &mut self,
        index: usize,
        width: usize,
        alignment: Alignment,
        name: Option<&str>,
        content: &str,
    ) -> Result<()> {
        if self.suppressed {
            trace!(index, name, "field suppressed");
            return Ok(());
        }
        let padding = FieldFormatter.padding(width, alignment, content);
        self.write_spaces(padding.before)?;
        self.sink.write_str(content)?;
        self.write_spaces(padding.after)?;
        self.write_separator(alignment)
    }

    fn field_fmt(
        &mut self,
        index: usize,
        _width: usize,
        alignment: Alignment,
        name: Option<&str>,
        args: fmt::Arguments<'_>,
    ) -> Result<()> {
        if self.suppressed {
            trace!(index, name, "field suppressed");
            return Ok(());
        }
        self.sink.write_str(&args.to_string())?;
        self.write_separator(alignment)
    }

    fn spaces(&mut self, count: usize) -> Result<()> {
        if self.suppressed {
            return Ok(());
        }
        self.write_spaces(count)
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.suppressed {
            return Ok(());
        }
        self.sink.write_str(text)?;
        Ok(())
    }

    fn text_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        if self.suppressed {
            return Ok(());
        }
        self.sink.write_str(&args.to_string())?;
        Ok(())
    }

    fn message(&mut self, verbosity: u32, args: fmt::Arguments<'_>) -> Result<()> {
        if self.verbosity >= verbosity {
            self.sink.write_unfiltered(&args.to_string())?;
        }
        Ok(())
    }

    fn wrap_hint(&mut self, marker: &str) -> Result<()> {
        if self.suppressed {
            return Ok(());
        }
        self.sink.wrap_hint(marker)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}
