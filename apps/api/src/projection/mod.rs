// Template-neutral projection of a canonical record: header, summary, and the
// visible sections split into the template's columns. Screen rendering and
// document export both build on this, so they always agree on what is shown.

pub mod header;
pub mod items;
pub mod placement;

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::schema::fields::non_blank;
use crate::schema::items::SectionItem;
use crate::schema::record::{get_sorted_sections, ResumeRecord, Section};

pub use header::{contact_items, contact_line};
pub use items::{section_lines, Line, LineKind};
pub use placement::{Column, Template, TemplateInfo};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderProjection {
    pub name: String,
    pub title: String,
    /// Non-empty contact values in display order.
    pub contact: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedSection {
    pub id: String,
    pub title: String,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProjection {
    pub column: Column,
    pub sections: Vec<ProjectedSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub template: Template,
    pub header: HeaderProjection,
    pub summary: Option<String>,
    /// One entry per template column, in reading order.
    pub columns: Vec<ColumnProjection>,
}

impl Projection {
    pub fn column(&self, column: Column) -> &[ProjectedSection] {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.sections.as_slice())
            .unwrap_or_default()
    }

    /// All sections across columns, column by column.
    pub fn sections(&self) -> impl Iterator<Item = &ProjectedSection> {
        self.columns.iter().flat_map(|c| c.sections.iter())
    }
}

/// Summary shown under the header. A hidden summary section hides it entirely,
/// even when `basics.summary` is set.
pub fn resolve_summary(record: &ResumeRecord) -> Option<String> {
    match record.summary_section() {
        Some(section) if !section.visible => None,
        _ => record.summary_text(),
    }
}

pub fn project(record: &ResumeRecord, template: Template) -> Projection {
    let basics = &record.basics;
    let header = HeaderProjection {
        name: non_blank(basics.name.as_deref()).unwrap_or_default().to_string(),
        title: non_blank(basics.title.as_deref()).unwrap_or_default().to_string(),
        contact: contact_items(basics),
    };

    let mut seen_ids = HashSet::new();
    let sections: Vec<&Section> = get_sorted_sections(record)
        .into_iter()
        .filter(|section| section.visible)
        .filter(|section| {
            let first = seen_ids.insert(section.id.as_str());
            if !first {
                warn!(section = %section.id, "Duplicate section id, keeping the first occurrence");
            }
            first
        })
        .collect();

    let columns = template
        .columns()
        .iter()
        .map(|&column| ColumnProjection {
            column,
            sections: sections
                .iter()
                .filter(|section| template.column_for(&section.id) == column)
                .map(|section| project_section(section))
                .collect(),
        })
        .collect();

    Projection {
        template,
        header,
        summary: resolve_summary(record),
        columns,
    }
}

fn project_section(section: &Section) -> ProjectedSection {
    let skipped = section
        .items
        .iter()
        .filter(|item| matches!(item, SectionItem::Unknown(_)))
        .count();
    if skipped > 0 {
        debug!(section = %section.id, skipped, "Skipping unrecognized items");
    }

    ProjectedSection {
        id: section.id.clone(),
        title: section.title(),
        lines: section_lines(section),
    }
}
