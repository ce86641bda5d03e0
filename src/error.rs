//! Error types for the rendering engine.
//!
//! Two kinds of failure leave a render call:
//!
//! - **Invariant violations**: the caller broke the table/list protocol
//!   (nested tables, an `end_table` with nothing open, ...). These are
//!   programming errors and are never retried.
//! - **I/O errors**: the sink could not accept or flush output. They are
//!   passed through untouched; the engine does not buffer around them.

use thiserror::Error;

/// Result alias used by every render call.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors returned by [`StructuredOutput`](crate::StructuredOutput) calls.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The table/list protocol was used out of order.
    #[error("render protocol violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// The underlying sink failed.
    #[error("sink error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Whether this error is a caller bug rather than a sink failure.
    #[must_use]
    pub const fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

/// Table and list protocol violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A table was begun while another one was still open.
    #[error("table `{id}` begun inside another table")]
    NestedTable { id: String },

    /// `table_header` outside a table's header section.
    #[error("table header `{column}` outside a table header section")]
    HeaderOutsideTable { column: String },

    /// `table_body` outside a table's header section.
    #[error("table body begun outside a table header section")]
    BodyOutsideTable,

    /// The number of headers did not match the declared column count.
    #[error("table `{id}` declared {expected} columns but got {actual} headers")]
    HeaderCountMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    /// `end_table` without a matching `begin_table`.
    #[error("end of table without a matching begin")]
    UnbalancedTableEnd,

    /// `end_list` without a matching `begin_list`.
    #[error("end of list without a matching begin")]
    UnbalancedListEnd,
}
