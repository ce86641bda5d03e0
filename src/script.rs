//! Replayable render scripts.
//!
//! A script records what a command layer would emit, command by command, so
//! output can be reproduced without the command layer itself:
//!
//! ```json
//! {"commands": [{"command": "info breakpoints", "events": [
//!   {"op": "begin_table", "columns": 1, "rows": 1, "id": "bkpts"},
//!   {"op": "table_header", "width": 3, "align": "left", "column": "number", "label": "Num"},
//!   {"op": "table_body"},
//!   {"op": "field_int", "width": 3, "align": "left", "name": "number", "value": 1},
//!   {"op": "text", "text": "\n"},
//!   {"op": "end_table"}
//! ]}]}
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::interp::CommandRunner;
use crate::renderer::{Alignment, ListKind, StructuredOutput};

/// One recorded call on a [`StructuredOutput`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderEvent {
    BeginTable {
        columns: usize,
        rows: usize,
        id: String,
    },
    TableHeader {
        width: usize,
        #[serde(default)]
        align: Alignment,
        column: String,
        label: String,
    },
    TableBody,
    EndTable,
    BeginList {
        #[serde(default)]
        kind: ListKind,
        #[serde(default)]
        id: Option<String>,
    },
    EndList {
        #[serde(default)]
        kind: ListKind,
    },
    FieldInt {
        #[serde(flatten)]
        field: FieldSlot,
        value: i64,
    },
    FieldSkip {
        #[serde(flatten)]
        field: FieldSlot,
    },
    FieldString {
        #[serde(flatten)]
        field: FieldSlot,
        value: String,
    },
    /// Pre-formatted text in a field position
    FieldFmt {
        #[serde(flatten)]
        field: FieldSlot,
        text: String,
    },
    Spaces {
        count: usize,
    },
    Text {
        text: String,
    },
    Message {
        #[serde(default)]
        verbosity: u32,
        text: String,
    },
    WrapHint {
        #[serde(default)]
        marker: String,
    },
    Flush,
    /// Abort the command with an error
    Fail {
        message: String,
    },
}

/// Position and layout shared by every field event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSlot {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub width: usize,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RenderEvent {
    pub fn apply(&self, out: &mut dyn StructuredOutput) -> Result<()> {
        match self {
            Self::BeginTable { columns, rows, id } => out.begin_table(*columns, *rows, id)?,
            Self::TableHeader {
                width,
                align,
                column,
                label,
            } => out.table_header(*width, *align, column, label)?,
            Self::TableBody => out.table_body()?,
            Self::EndTable => out.end_table()?,
            Self::BeginList { kind, id } => out.begin_list(*kind, id.as_deref())?,
            Self::EndList { kind } => out.end_list(*kind)?,
            Self::FieldInt { field, value } => out.field_int(
                field.index,
                field.width,
                field.align,
                field.name.as_deref(),
                *value,
            )?,
            Self::FieldSkip { field } => {
                out.field_skip(field.index, field.width, field.align, field.name.as_deref())?
            }
            Self::FieldString { field, value } => out.field_string(
                field.index,
                field.width,
                field.align,
                field.name.as_deref(),
                value,
            )?,
            Self::FieldFmt { field, text } => out.field_fmt(
                field.index,
                field.width,
                field.align,
                field.name.as_deref(),
                format_args!("{text}"),
            )?,
            Self::Spaces { count } => out.spaces(*count)?,
            Self::Text { text } => out.text(text)?,
            Self::Message { verbosity, text } => out.message(*verbosity, format_args!("{text}"))?,
            Self::WrapHint { marker } => out.wrap_hint(marker)?,
            Self::Flush => out.flush()?,
            Self::Fail { message } => bail!("{message}"),
        }
        Ok(())
    }
}

/// Events emitted for one command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCommand {
    pub command: String,
    #[serde(default)]
    pub events: Vec<RenderEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub commands: Vec<ScriptCommand>,
    /// Index of the first entry not yet consumed by [`CommandRunner::run`]
    #[serde(skip)]
    cursor: usize,
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid render script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .context("failed to read script")?;
        Self::from_json(&text)
    }

    /// Command lines in script order.
    pub fn command_lines(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.command.as_str())
    }

    /// Replay the first entry recorded for `command`, stopping at the first
    /// failure.
    pub fn replay(&self, command: &str, out: &mut dyn StructuredOutput) -> Result<()> {
        let Some(recorded) = self.commands.iter().find(|c| c.command == command) else {
            bail!("Undefined command: \"{command}\".");
        };
        replay_events(recorded, out)
    }

    /// Replay the next entry for `command` after the last one consumed.
    ///
    /// Repeated command lines (`next`, `step`) each get their own recorded
    /// output, in script order.
    pub fn replay_next(&mut self, command: &str, out: &mut dyn StructuredOutput) -> Result<()> {
        let Some(offset) = self.commands[self.cursor..]
            .iter()
            .position(|c| c.command == command)
        else {
            bail!("Undefined command: \"{command}\".");
        };
        let position = self.cursor + offset;
        self.cursor = position + 1;
        replay_events(&self.commands[position], out)
    }

    /// Start consuming entries from the top of the script again.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

fn replay_events(recorded: &ScriptCommand, out: &mut dyn StructuredOutput) -> Result<()> {
    for (position, event) in recorded.events.iter().enumerate() {
        if let RenderEvent::Fail { message } = event {
            bail!("{message}");
        }
        event
            .apply(out)
            .with_context(|| format!("event {position} of `{}` failed", recorded.command))?;
    }
    Ok(())
}

impl CommandRunner for Script {
    fn run(&mut self, command: &str, out: &mut dyn StructuredOutput) -> Result<()> {
        self.replay_next(command, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvariantViolation, RenderError};
    use crate::renderer::RenderContext;

    const BREAKPOINTS: &str = r#"{"commands": [
        {"command": "info breakpoints", "events": [
            {"op": "begin_table", "columns": 2, "rows": 1, "id": "bkpts"},
            {"op": "table_header", "width": 3, "align": "left", "column": "number", "label": "Num"},
            {"op": "table_header", "width": 10, "align": "left", "column": "what", "label": "What"},
            {"op": "table_body"},
            {"op": "begin_list", "id": "bkpt"},
            {"op": "field_int", "index": 0, "width": 3, "align": "left", "name": "number", "value": 1},
            {"op": "field_fmt", "index": 1, "name": "what", "text": "in main at main.c:3"},
            {"op": "end_list"},
            {"op": "text", "text": "\n"},
            {"op": "end_table"}
        ]},
        {"command": "info display", "events": [
            {"op": "begin_table", "columns": 1, "rows": 0, "id": "displays"},
            {"op": "table_header", "width": 3, "column": "number", "label": "Num"},
            {"op": "table_body"},
            {"op": "end_table"},
            {"op": "message", "text": "There are no auto-display expressions now.\n"}
        ]}
    ]}"#;

    #[test]
    fn test_parses_events_with_defaults() {
        let script = Script::from_json(BREAKPOINTS).unwrap();
        assert_eq!(
            script.command_lines().collect::<Vec<_>>(),
            vec!["info breakpoints", "info display"]
        );
        assert_eq!(
            script.commands[1].events[1],
            RenderEvent::TableHeader {
                width: 3,
                align: Alignment::None,
                column: "number".to_string(),
                label: "Num".to_string(),
            }
        );
        assert_eq!(
            script.commands[0].events[4],
            RenderEvent::BeginList {
                kind: ListKind::Tuple,
                id: Some("bkpt".to_string()),
            }
        );
    }

    #[test]
    fn test_replay_renders_table() {
        let script = Script::from_json(BREAKPOINTS).unwrap();
        let mut ctx = RenderContext::new(String::new());
        script.replay("info breakpoints", &mut ctx).unwrap();
        assert_eq!(ctx.sink(), "Num What       \n1   in main at main.c:3\n");
    }

    #[test]
    fn test_replay_empty_table_keeps_message() {
        let script = Script::from_json(BREAKPOINTS).unwrap();
        let mut ctx = RenderContext::new(String::new());
        script.replay("info display", &mut ctx).unwrap();
        assert_eq!(ctx.sink(), "There are no auto-display expressions now.\n");
    }

    #[test]
    fn test_unknown_command() {
        let script = Script::default();
        let mut ctx = RenderContext::new(String::new());
        let err = script.replay("frob", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "Undefined command: \"frob\".");
    }

    #[test]
    fn test_protocol_error_keeps_its_type() {
        let script = Script::from_json(
            r#"{"commands": [{"command": "bad", "events": [{"op": "end_table"}]}]}"#,
        )
        .unwrap();
        let mut ctx = RenderContext::new(String::new());
        let err = script.replay("bad", &mut ctx).unwrap_err();
        assert!(err.to_string().contains("event 0 of `bad`"));
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::Invariant(InvariantViolation::UnbalancedTableEnd))
        ));
    }

    #[test]
    fn test_fail_event_reports_its_message() {
        let script = Script::from_json(
            r#"{"commands": [{"command": "info locals", "events": [
                {"op": "begin_table", "columns": 1, "rows": 0, "id": "locals"},
                {"op": "fail", "message": "No frame selected."},
                {"op": "text", "text": "unreachable"}
            ]}]}"#,
        )
        .unwrap();
        let mut ctx = RenderContext::new(String::new());
        let err = script.replay("info locals", &mut ctx).unwrap_err();
        assert_eq!(format!("{err:#}"), "No frame selected.");
        assert!(ctx.is_suppressed());
    }

    #[test]
    fn test_repeated_commands_replay_in_order() {
        let mut script = Script::from_json(
            r#"{"commands": [
                {"command": "next", "events": [{"op": "text", "text": "4\tx = 1;\n"}]},
                {"command": "next", "events": [{"op": "text", "text": "5\ty = 2;\n"}]}
            ]}"#,
        )
        .unwrap();
        let lines: Vec<String> = script.command_lines().map(str::to_string).collect();
        let mut ctx = RenderContext::new(String::new());
        for line in &lines {
            script.run(line, &mut ctx).unwrap();
        }
        assert_eq!(ctx.sink(), "4\tx = 1;\n5\ty = 2;\n");

        let err = script.run("next", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "Undefined command: \"next\".");

        script.rewind();
        script.run("next", &mut ctx).unwrap();
        assert_eq!(ctx.sink(), "4\tx = 1;\n5\ty = 2;\n4\tx = 1;\n");
    }

    #[test]
    fn test_rejects_unknown_op() {
        let err = Script::from_json(r#"{"commands": [{"command": "x", "events": [{"op": "nope"}]}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid render script"));
    }
}
