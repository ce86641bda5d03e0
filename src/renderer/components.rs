use unicode_width::UnicodeWidthStr;

use crate::renderer::traits::Alignment;

/// Written after every aligned field so plain output can be tokenized.
pub const FIELD_SEPARATOR: char = ' ';

/// Spaces placed around a field's content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub before: usize,
    pub after: usize,
}

impl Padding {
    /// Padding for `content` in a column `width` terminal cells wide.
    ///
    /// Content at least as wide as the column is never padded or cut.
    /// Centering puts the odd leftover cell before the content.
    pub fn for_field(width: usize, alignment: Alignment, content: &str) -> Self {
        Self::for_width(width, alignment, UnicodeWidthStr::width(content))
    }

    pub fn for_width(width: usize, alignment: Alignment, content_width: usize) -> Self {
        let pad = width.saturating_sub(content_width);
        match alignment {
            _ if pad == 0 => Self::default(),
            Alignment::None => Self::default(),
            Alignment::Right => Self {
                before: pad,
                after: 0,
            },
            Alignment::Left => Self {
                before: 0,
                after: pad,
            },
            Alignment::Center => {
                let after = pad / 2;
                Self {
                    before: pad - after,
                    after,
                }
            }
        }
    }
}

/// Helper for the field layout rules shared by every field call
pub struct FieldFormatter;

impl FieldFormatter {
    pub fn padding(&self, width: usize, alignment: Alignment, content: &str) -> Padding {
        Padding::for_field(width, alignment, content)
    }

    /// Aligned fields end with [`FIELD_SEPARATOR`]; free-form ones do not.
    pub fn separator(&self, alignment: Alignment) -> Option<char> {
        match alignment {
            Alignment::None => None,
            _ => Some(FIELD_SEPARATOR),
        }
    }

    pub fn blank(&self, count: usize) -> String {
        " ".repeat(count)
    }
}
