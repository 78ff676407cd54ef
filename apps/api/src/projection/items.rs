//! Flattening of section items into display lines.
//!
//! Every template shows the same lines for an item; only their placement differs.

use serde::Serialize;

use crate::schema::fields::{join_non_empty, non_blank};
use crate::schema::items::{
    CertificationItem, EducationItem, ListItem, ProjectItem, SectionItem, TimelineItem,
};
use crate::schema::record::Section;

/// Joins the fields of an item heading.
pub const FIELD_SEPARATOR: &str = " | ";
/// Joins tags in list and tech lines.
pub const TAG_SEPARATOR: &str = ", ";
pub const TECH_LABEL: &str = "Tech";
/// Label for list items that carry none.
pub const DEFAULT_LIST_LABEL: &str = "Skills";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// First line of a structured item (role, degree, project name...).
    Heading,
    Detail,
    Bullet,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub kind: LineKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub text: String,
}

impl Line {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            label: None,
            text: text.into(),
        }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(LineKind::Heading, text)
    }

    pub fn detail(text: impl Into<String>) -> Self {
        Self::new(LineKind::Detail, text)
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self::new(LineKind::Bullet, text)
    }

    pub fn link(text: impl Into<String>) -> Self {
        Self::new(LineKind::Link, text)
    }

    pub fn labeled(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Detail,
            label: Some(label.into()),
            text: text.into(),
        }
    }

    /// The line as a reader sees it, label included.
    pub fn plain_text(&self) -> String {
        match &self.label {
            Some(label) => format!("{label}: {}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Lines for one item. Unknown items yield nothing.
pub fn item_lines(item: &SectionItem) -> Vec<Line> {
    match item {
        SectionItem::Text(text) => text_lines(&text.content),
        SectionItem::Timeline(timeline) => timeline_lines(timeline),
        SectionItem::List(list) => list_lines(list),
        SectionItem::Education(education) => education_lines(education),
        SectionItem::Project(project) => project_lines(project),
        SectionItem::Certification(cert) => certification_lines(cert),
        SectionItem::Unknown(_) => Vec::new(),
    }
}

/// Lines for a whole section. When no item produces a line, the section's
/// `rawText` is shown instead, one line per non-blank input line.
pub fn section_lines(section: &Section) -> Vec<Line> {
    let lines: Vec<Line> = section.items.iter().flat_map(item_lines).collect();
    if lines.is_empty() {
        return text_lines(&section.raw_text);
    }
    lines
}

fn text_lines(text: &str) -> Vec<Line> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(Line::detail)
        .collect()
}

fn push_heading(lines: &mut Vec<Line>, heading: String) {
    if !heading.is_empty() {
        lines.push(Line::heading(heading));
    }
}

fn push_bullets(lines: &mut Vec<Line>, bullets: &[String]) {
    lines.extend(
        bullets
            .iter()
            .filter_map(|b| non_blank(Some(b.as_str())))
            .map(Line::bullet),
    );
}

fn push_tags(lines: &mut Vec<Line>, label: &str, tags: &[String]) {
    let joined = join_non_empty(tags.iter().map(|t| Some(t.as_str())), TAG_SEPARATOR);
    if !joined.is_empty() {
        lines.push(Line::labeled(label, joined));
    }
}

fn timeline_lines(item: &TimelineItem) -> Vec<Line> {
    let range = item.date_range();
    let mut lines = Vec::new();
    push_heading(
        &mut lines,
        join_non_empty(
            [
                item.role.as_deref(),
                item.organization.as_deref(),
                Some(range.as_str()),
                item.location.as_deref(),
            ],
            FIELD_SEPARATOR,
        ),
    );
    push_bullets(&mut lines, &item.bullets);
    push_tags(&mut lines, TECH_LABEL, &item.tech);
    lines
}

fn list_lines(item: &ListItem) -> Vec<Line> {
    let label = non_blank(item.label.as_deref()).unwrap_or(DEFAULT_LIST_LABEL);
    let mut lines = Vec::new();
    push_tags(&mut lines, label, &item.items);
    lines
}

fn education_lines(item: &EducationItem) -> Vec<Line> {
    let range = item.date_range();
    let mut lines = Vec::new();
    push_heading(
        &mut lines,
        join_non_empty(
            [
                item.degree.as_deref(),
                item.school.as_deref(),
                Some(range.as_str()),
                item.location.as_deref(),
            ],
            FIELD_SEPARATOR,
        ),
    );
    lines
}

fn project_lines(item: &ProjectItem) -> Vec<Line> {
    let mut lines = Vec::new();
    push_heading(
        &mut lines,
        non_blank(item.name.as_deref()).unwrap_or_default().to_string(),
    );
    if let Some(description) = non_blank(item.description.as_deref()) {
        lines.push(Line::detail(description));
    }
    push_bullets(&mut lines, &item.bullets);
    push_tags(&mut lines, TECH_LABEL, &item.tech);
    if let Some(link) = non_blank(item.link.as_deref()) {
        lines.push(Line::link(link));
    }
    lines
}

fn certification_lines(item: &CertificationItem) -> Vec<Line> {
    let mut lines = Vec::new();
    push_heading(
        &mut lines,
        join_non_empty(
            [
                item.name.as_deref(),
                item.issuer.as_deref(),
                item.date.as_deref(),
            ],
            FIELD_SEPARATOR,
        ),
    );
    lines
}
