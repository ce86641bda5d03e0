use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Horizontal alignment of a field within its column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Verbatim content: no padding and no trailing separator
    #[default]
    None,
    Left,
    Right,
    Center,
}

/// Grouping flavour of a list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Named fields belonging together (one breakpoint, one frame)
    #[default]
    Tuple,
    /// A sequence of like items
    List,
}

/// Structured output calls issued by the command layer.
///
/// Commands describe *what* they show through these calls; the
/// implementation decides how it looks. Every call is synchronous and its
/// only effect is output on the underlying sink, or nothing at all while
/// output is suppressed.
///
/// A table is driven as
/// `begin_table` → `table_header`* → `table_body` → fields/lists → `end_table`,
/// and every `begin_table` must be paired with exactly one `end_table`,
/// including tables declared with zero rows.
pub trait StructuredOutput {
    /// Start a table. A table with `rows == 0` suppresses all output,
    /// its headers included, until [`end_table`](Self::end_table).
    fn begin_table(&mut self, columns: usize, rows: usize, id: &str) -> Result<()>;

    fn table_header(
        &mut self,
        width: usize,
        alignment: Alignment,
        column_name: &str,
        label: &str,
    ) -> Result<()>;

    /// Close the header line; body rows follow.
    fn table_body(&mut self) -> Result<()>;

    fn end_table(&mut self) -> Result<()>;

    fn begin_list(&mut self, kind: ListKind, id: Option<&str>) -> Result<()>;

    fn end_list(&mut self, kind: ListKind) -> Result<()>;

    fn field_int(
        &mut self,
        index: usize,
        width: usize,
        alignment: Alignment,
        name: Option<&str>,
        value: i64,
    ) -> Result<()>;

    /// Reserve a column without showing a value.
    fn field_skip(
        &mut self,
        index: usize,
        width: usize,
        alignment: Alignment,
        name: Option<&str>,
    ) -> Result<()>;

    fn field_string(
        &mut self,
        index: usize,
        width: usize,
        alignment: Alignment,
        name: Option<&str>,
        content: &str,
    ) -> Result<()>;

    /// Formatted field. Written as-is; only the separator depends on
    /// `alignment`.
    fn field_fmt(
        &mut self,
        index: usize,
        width: usize,
        alignment: Alignment,
        name: Option<&str>,
        args: fmt::Arguments<'_>,
    ) -> Result<()>;

    fn spaces(&mut self, count: usize) -> Result<()>;

    fn text(&mut self, text: &str) -> Result<()>;

    fn text_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()>;

    /// Status/diagnostic text shown when the verbosity threshold is at least
    /// `verbosity`. Not affected by table suppression.
    fn message(&mut self, verbosity: u32, args: fmt::Arguments<'_>) -> Result<()>;

    fn wrap_hint(&mut self, marker: &str) -> Result<()>;

    /// Flush the sink. Happens even while output is suppressed.
    fn flush(&mut self) -> Result<()>;
}
