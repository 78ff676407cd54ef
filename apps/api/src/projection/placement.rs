//! Templates and the section → column placement table.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A column of a layout. Single-column templates only use `Main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Main,
    Left,
    Right,
}

/// Where the `split` template puts each known section id.
pub const SPLIT_PLACEMENT: &[(&str, Column)] = &[
    ("experience", Column::Left),
    ("skills", Column::Right),
    ("projects", Column::Right),
    ("education", Column::Right),
    ("certifications", Column::Right),
    ("community", Column::Right),
    ("awards", Column::Right),
];

/// Column for section ids missing from [`SPLIT_PLACEMENT`].
pub const SPLIT_DEFAULT_COLUMN: Column = Column::Right;

/// Width share of the split columns, in percent of the text width.
pub const SPLIT_LEFT_PERCENT: u8 = 60;
pub const SPLIT_RIGHT_PERCENT: u8 = 40;

pub fn split_column_for(section_id: &str) -> Column {
    SPLIT_PLACEMENT
        .iter()
        .find(|(id, _)| *id == section_id)
        .map(|(_, column)| *column)
        .unwrap_or(SPLIT_DEFAULT_COLUMN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// One column, sections in natural order under the summary.
    Classic,
    /// Experience on the left (60%), everything else on the right (40%).
    Split,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub columns: usize,
}

impl Template {
    pub fn all() -> &'static [Template] {
        &[Template::Classic, Template::Split]
    }

    /// Resolves a user-supplied template id. Unknown ids fall back to `Classic`.
    pub fn from_id(id: &str) -> Self {
        let normalized = id.trim().to_ascii_lowercase();
        match Template::all().iter().find(|t| t.id() == normalized) {
            Some(template) => *template,
            None => {
                debug!(template = id, "Unknown template id, using classic layout");
                Template::Classic
            }
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Split => "split",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Template::Classic => "Classic",
            Template::Split => "Split",
        }
    }

    /// Columns in reading order.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Template::Classic => &[Column::Main],
            Template::Split => &[Column::Left, Column::Right],
        }
    }

    pub fn column_for(&self, section_id: &str) -> Column {
        match self {
            Template::Classic => Column::Main,
            Template::Split => split_column_for(section_id),
        }
    }

    pub fn info(&self) -> TemplateInfo {
        TemplateInfo {
            id: self.id(),
            name: self.name(),
            columns: self.columns().len(),
        }
    }
}
