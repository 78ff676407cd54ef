//! Screen rendering: a serializable render tree the client lays out as-is.
//!
//! Both templates are built from the same [`Projection`]; the only differences
//! are how the contact block is arranged and how sections are split into columns.

use serde::Serialize;

use crate::projection::header::CONTACT_SEPARATOR;
use crate::projection::placement::{SPLIT_LEFT_PERCENT, SPLIT_RIGHT_PERCENT};
use crate::projection::{project, Column, Line, LineKind, ProjectedSection, Projection, Template};
use crate::schema::record::ResumeRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderTree {
    pub template: Template,
    pub header: RenderHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub body: RenderBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderHeader {
    pub name: String,
    pub title: String,
    pub contact: ContactBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum ContactBlock {
    /// Everything on one line, `" | "`-separated.
    Line { text: String },
    /// One value per line.
    Lines { items: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum RenderBody {
    SingleColumn {
        sections: Vec<RenderSection>,
    },
    TwoColumn {
        left: Vec<RenderSection>,
        right: Vec<RenderSection>,
        left_percent: u8,
        right_percent: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderSection {
    pub id: String,
    pub title: String,
    pub nodes: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    Heading { text: String },
    Text { text: String },
    Bullet { text: String },
    Labeled { label: String, text: String },
    Link { href: String },
}

impl From<&Line> for RenderNode {
    fn from(line: &Line) -> Self {
        let text = line.text.clone();
        match (line.kind, &line.label) {
            (LineKind::Heading, _) => RenderNode::Heading { text },
            (LineKind::Bullet, _) => RenderNode::Bullet { text },
            (LineKind::Link, _) => RenderNode::Link { href: text },
            (LineKind::Detail, Some(label)) => RenderNode::Labeled {
                label: label.clone(),
                text,
            },
            (LineKind::Detail, None) => RenderNode::Text { text },
        }
    }
}

/// Renders `record` with the template named `template_id`.
/// Unknown ids render with the classic template.
pub fn render(record: &ResumeRecord, template_id: &str) -> RenderTree {
    render_projection(&project(record, Template::from_id(template_id)))
}

pub fn render_projection(projection: &Projection) -> RenderTree {
    let header = &projection.header;
    let contact = match projection.template {
        Template::Classic => ContactBlock::Line {
            text: header.contact.join(CONTACT_SEPARATOR),
        },
        Template::Split => ContactBlock::Lines {
            items: header.contact.clone(),
        },
    };

    let body = match projection.template {
        Template::Classic => RenderBody::SingleColumn {
            sections: render_sections(projection.column(Column::Main)),
        },
        Template::Split => RenderBody::TwoColumn {
            left: render_sections(projection.column(Column::Left)),
            right: render_sections(projection.column(Column::Right)),
            left_percent: SPLIT_LEFT_PERCENT,
            right_percent: SPLIT_RIGHT_PERCENT,
        },
    };

    RenderTree {
        template: projection.template,
        header: RenderHeader {
            name: header.name.clone(),
            title: header.title.clone(),
            contact,
        },
        summary: projection.summary.clone(),
        body,
    }
}

fn render_sections(sections: &[ProjectedSection]) -> Vec<RenderSection> {
    sections
        .iter()
        .map(|section| RenderSection {
            id: section.id.clone(),
            title: section.title.clone(),
            nodes: section.lines.iter().map(RenderNode::from).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::items::{ProjectItem, SectionItem, TimelineItem};
    use crate::schema::record::{Basics, Section};
    use serde_json::json;

    fn record() -> ResumeRecord {
        let mut record = ResumeRecord::new(Basics {
            name: Some("Grace Hopper".into()),
            email: Some("grace@example.com".into()),
            location: Some("Arlington, VA".into()),
            ..Default::default()
        });
        record.insert_section(Section::new("experience", "Experience", 1).with_items(vec![
            SectionItem::Timeline(TimelineItem {
                role: Some("Rear Admiral".into()),
                bullets: vec!["Built COBOL".into()],
                ..Default::default()
            }),
        ]));
        record.insert_section(Section::new("projects", "Projects", 3).with_items(vec![
            SectionItem::Project(ProjectItem {
                name: Some("FLOW-MATIC".into()),
                link: Some("example.com/flow".into()),
                ..Default::default()
            }),
        ]));
        record
    }

    #[test]
    fn test_classic_contact_is_single_line() {
        let tree = render(&record(), "classic");
        assert_eq!(
            tree.header.contact,
            ContactBlock::Line {
                text: "grace@example.com | Arlington, VA".into()
            }
        );
        assert!(matches!(tree.body, RenderBody::SingleColumn { .. }));
    }

    #[test]
    fn test_split_contact_one_per_line_and_columns() {
        let tree = render(&record(), "split");
        assert_eq!(
            tree.header.contact,
            ContactBlock::Lines {
                items: vec!["grace@example.com".into(), "Arlington, VA".into()]
            }
        );
        match tree.body {
            RenderBody::TwoColumn {
                left,
                right,
                left_percent,
                right_percent,
            } => {
                assert_eq!(left.len(), 1);
                assert_eq!(left[0].id, "experience");
                assert_eq!(right[0].id, "projects");
                assert_eq!((left_percent, right_percent), (60, 40));
            }
            other => panic!("expected two columns, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_template_renders_classic() {
        let tree = render(&record(), "does-not-exist");
        assert_eq!(tree.template, Template::Classic);
        assert_eq!(tree, render(&record(), "classic"));
    }

    #[test]
    fn test_nodes_follow_line_kinds() {
        let tree = render(&record(), "classic");
        let RenderBody::SingleColumn { sections } = tree.body else {
            panic!("classic is single column");
        };
        assert_eq!(
            sections[0].nodes,
            vec![
                RenderNode::Heading {
                    text: "Rear Admiral".into()
                },
                RenderNode::Bullet {
                    text: "Built COBOL".into()
                },
            ]
        );
        assert_eq!(
            sections[1].nodes[1],
            RenderNode::Link {
                href: "example.com/flow".into()
            }
        );
    }

    #[test]
    fn test_tree_serializes_with_layout_tags() {
        let value = serde_json::to_value(render(&record(), "split")).unwrap();
        assert_eq!(value["template"], json!("split"));
        assert_eq!(value["body"]["layout"], json!("two_column"));
        assert_eq!(value["header"]["contact"]["layout"], json!("lines"));
        assert_eq!(value["body"]["left"][0]["nodes"][0]["kind"], json!("heading"));
        assert!(value.get("summary").is_none());
    }
}
