use crate::projection::header::CONTACT_SEPARATOR;
use crate::projection::placement::{SPLIT_LEFT_PERCENT, SPLIT_RIGHT_PERCENT};
use crate::projection::{project, Column, Line, LineKind, ProjectedSection, Template};
use crate::schema::record::ResumeRecord;

use super::ExportError;

/// A run of text inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocBlock {
    Name(String),
    Title(String),
    Contact(String),
    /// Summary paragraph; each entry is a line of the same paragraph.
    Summary(Vec<String>),
    SectionHeading(String),
    Paragraph { runs: Vec<Run> },
    Bullet(String),
    Table(TwoColumnTable),
}

/// Borderless two-column table. Widths are percentages of the text width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoColumnTable {
    pub left_percent: u8,
    pub right_percent: u8,
    pub left: Vec<DocBlock>,
    pub right: Vec<DocBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTree {
    pub blocks: Vec<DocBlock>,
}

impl DocumentTree {
    /// Rejects trees the writer cannot express: column widths that do not add
    /// up to the full width, and tables nested inside table cells.
    pub fn check(&self) -> Result<(), ExportError> {
        for block in &self.blocks {
            if let DocBlock::Table(table) = block {
                let total = u16::from(table.left_percent) + u16::from(table.right_percent);
                if total != 100 {
                    return Err(ExportError::InvalidTree(format!(
                        "column widths add up to {total}%, expected 100%"
                    )));
                }
                let nested = table
                    .left
                    .iter()
                    .chain(&table.right)
                    .any(|b| matches!(b, DocBlock::Table(_)));
                if nested {
                    return Err(ExportError::InvalidTree(
                        "tables cannot be nested inside table cells".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Visible text per paragraph, in document order. Table cells are read
    /// left column first.
    pub fn paragraph_texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_texts(&self.blocks, &mut out);
        out
    }
}

fn collect_texts(blocks: &[DocBlock], out: &mut Vec<String>) {
    for block in blocks {
        match block {
            DocBlock::Name(text)
            | DocBlock::Title(text)
            | DocBlock::Contact(text)
            | DocBlock::SectionHeading(text)
            | DocBlock::Bullet(text) => out.push(text.clone()),
            DocBlock::Summary(lines) => out.push(lines.join("\n")),
            DocBlock::Paragraph { runs } => {
                out.push(runs.iter().map(|r| r.text.as_str()).collect());
            }
            DocBlock::Table(table) => {
                collect_texts(&table.left, out);
                collect_texts(&table.right, out);
            }
        }
    }
}

/// Builds the export document for `record`.
///
/// Header and summary are identical across templates and the contact block is
/// always a single line, so every template exports the same text. Only the
/// body arrangement differs.
pub fn build_document(
    record: &ResumeRecord,
    template: Template,
) -> Result<DocumentTree, ExportError> {
    let projection = project(record, template);
    let header = &projection.header;
    let mut blocks = Vec::new();

    if !header.name.is_empty() {
        blocks.push(DocBlock::Name(header.name.clone()));
    }
    if !header.title.is_empty() {
        blocks.push(DocBlock::Title(header.title.clone()));
    }
    if !header.contact.is_empty() {
        blocks.push(DocBlock::Contact(header.contact.join(CONTACT_SEPARATOR)));
    }
    if let Some(summary) = &projection.summary {
        blocks.push(DocBlock::Summary(
            summary.lines().map(|l| l.trim().to_string()).collect(),
        ));
    }

    match template {
        Template::Classic => blocks.extend(section_blocks(projection.column(Column::Main))),
        Template::Split => blocks.push(DocBlock::Table(TwoColumnTable {
            left_percent: SPLIT_LEFT_PERCENT,
            right_percent: SPLIT_RIGHT_PERCENT,
            left: section_blocks(projection.column(Column::Left)),
            right: section_blocks(projection.column(Column::Right)),
        })),
    }

    let tree = DocumentTree { blocks };
    tree.check()?;
    Ok(tree)
}

fn section_blocks(sections: &[ProjectedSection]) -> Vec<DocBlock> {
    sections
        .iter()
        .flat_map(|section| {
            std::iter::once(DocBlock::SectionHeading(section.title.clone()))
                .chain(section.lines.iter().map(line_block))
        })
        .collect()
}

fn line_block(line: &Line) -> DocBlock {
    match (line.kind, &line.label) {
        (LineKind::Bullet, _) => DocBlock::Bullet(line.text.clone()),
        (LineKind::Heading, _) => DocBlock::Paragraph {
            runs: vec![Run::bold(line.text.clone())],
        },
        (_, Some(label)) => DocBlock::Paragraph {
            runs: vec![Run::bold(format!("{label}: ")), Run::plain(line.text.clone())],
        },
        (LineKind::Detail | LineKind::Link, None) => DocBlock::Paragraph {
            runs: vec![Run::plain(line.text.clone())],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::items::{ListItem, SectionItem, TimelineItem};
    use crate::schema::record::{Basics, Section};

    fn record() -> ResumeRecord {
        let mut record = ResumeRecord::new(Basics {
            name: Some("Ada Lovelace".into()),
            phone: Some("555-0100".into()),
            links: vec!["ada.dev".into()],
            summary: Some("First line\nSecond line".into()),
            ..Default::default()
        });
        record.insert_section(Section::new("experience", "Experience", 1).with_items(vec![
            SectionItem::Timeline(TimelineItem {
                role: Some("Analyst".into()),
                bullets: vec!["Wrote the first program".into()],
                ..Default::default()
            }),
        ]));
        record.insert_section(Section::new("skills", "Skills", 2).with_items(vec![
            SectionItem::List(ListItem {
                label: Some("Math".into()),
                items: vec!["Analysis".into()],
            }),
        ]));
        record
    }

    #[test]
    fn test_classic_document_is_flat() {
        let tree = build_document(&record(), Template::Classic).unwrap();
        assert_eq!(tree.blocks[0], DocBlock::Name("Ada Lovelace".into()));
        assert_eq!(tree.blocks[1], DocBlock::Contact("555-0100 | ada.dev".into()));
        assert_eq!(
            tree.blocks[2],
            DocBlock::Summary(vec!["First line".into(), "Second line".into()])
        );
        assert!(tree.blocks.iter().all(|b| !matches!(b, DocBlock::Table(_))));
        assert!(tree.blocks.contains(&DocBlock::Paragraph {
            runs: vec![Run::bold("Math: "), Run::plain("Analysis")]
        }));
    }

    #[test]
    fn test_split_document_has_one_table() {
        let tree = build_document(&record(), Template::Split).unwrap();
        let tables: Vec<&TwoColumnTable> = tree
            .blocks
            .iter()
            .filter_map(|b| match b {
                DocBlock::Table(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].left[0], DocBlock::SectionHeading("Experience".into()));
        assert_eq!(tables[0].right[0], DocBlock::SectionHeading("Skills".into()));
    }

    #[test]
    fn test_templates_share_text() {
        let mut classic = build_document(&record(), Template::Classic)
            .unwrap()
            .paragraph_texts();
        let mut split = build_document(&record(), Template::Split)
            .unwrap()
            .paragraph_texts();
        classic.sort();
        split.sort();
        assert_eq!(classic, split);
    }

    #[test]
    fn test_check_rejects_bad_widths_and_nesting() {
        let bad_widths = DocumentTree {
            blocks: vec![DocBlock::Table(TwoColumnTable {
                left_percent: 70,
                right_percent: 40,
                left: vec![],
                right: vec![],
            })],
        };
        assert!(matches!(bad_widths.check(), Err(ExportError::InvalidTree(_))));

        let inner = TwoColumnTable {
            left_percent: 50,
            right_percent: 50,
            left: vec![],
            right: vec![],
        };
        let nested = DocumentTree {
            blocks: vec![DocBlock::Table(TwoColumnTable {
                left_percent: 60,
                right_percent: 40,
                left: vec![DocBlock::Table(inner)],
                right: vec![],
            })],
        };
        assert!(matches!(nested.check(), Err(ExportError::InvalidTree(_))));
    }

    #[test]
    fn test_empty_record_builds_empty_document() {
        let tree =
            build_document(&ResumeRecord::new(Basics::default()), Template::Classic).unwrap();
        assert!(tree.blocks.is_empty());
    }
}
