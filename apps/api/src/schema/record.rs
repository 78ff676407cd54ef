//! Resume record shapes: the canonical section-map record (v2) and the flat legacy
//! record (v1). Conversions between them live in `schema::migration`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::schema::fields::{first_non_empty, humanize_id, null_as_default};
use crate::schema::items::{
    CertificationItem, EducationItem, ListItem, ProjectItem, SectionItem, TimelineItem,
};

pub const SUMMARY_SECTION_ID: &str = "summary";

/// Legacy arrays in the order their sections are numbered during migration.
pub const CANONICAL_SECTION_ORDER: [&str; 6] = [
    SUMMARY_SECTION_ID,
    "experience",
    "skills",
    "projects",
    "education",
    "certifications",
];

// ────────────────────────────────────────────────────────────────────────────
// Canonical record (v2)
// ────────────────────────────────────────────────────────────────────────────

/// Contact and identity block. Every field is optional; absent means "render nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Basics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Position hint among sibling sections; lower renders first.
    #[serde(default, deserialize_with = "deserialize_order")]
    pub order: i64,
    #[serde(default = "default_visible", deserialize_with = "deserialize_visible")]
    pub visible: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<SectionItem>,
    /// Fallback body when the items produce nothing renderable.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub raw_text: String,
}

fn default_visible() -> bool {
    true
}

/// `null` reads as visible, same as a missing flag.
fn deserialize_visible<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_visible))
}

/// Accepts integers, floats and numeric strings; anything else reads as 0.
fn deserialize_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
        _ => 0,
    })
}

impl Section {
    pub fn new(id: impl Into<String>, label: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            order,
            visible: true,
            items: Vec::new(),
            raw_text: String::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<SectionItem>) -> Self {
        self.items = items;
        self
    }

    /// Display title: the label, else the humanized id.
    pub fn title(&self) -> String {
        first_non_empty([Some(self.label.clone()), Some(humanize_id(&self.id))])
            .unwrap_or_default()
    }

    pub fn is_summary(&self) -> bool {
        self.id == SUMMARY_SECTION_ID
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub basics: Basics,
    /// Keyed by section id. The map key is authoritative for lookups.
    pub sections: BTreeMap<String, Section>,
}

impl ResumeRecord {
    pub fn new(basics: Basics) -> Self {
        Self {
            basics,
            sections: BTreeMap::new(),
        }
    }

    /// Inserts `section` under its own id, replacing any section with that id.
    pub fn insert_section(&mut self, section: Section) {
        self.sections.insert(section.id.clone(), section);
    }

    pub fn summary_section(&self) -> Option<&Section> {
        self.sections
            .get(SUMMARY_SECTION_ID)
            .or_else(|| self.sections.values().find(|s| s.is_summary()))
    }

    /// Summary text, first non-empty of: the summary section's text items
    /// (newline-joined), its `rawText`, then `basics.summary`.
    pub fn summary_text(&self) -> Option<String> {
        let section = self.summary_section();
        let from_items = section.map(|s| {
            s.items
                .iter()
                .filter_map(SectionItem::as_text)
                .map(|t| t.content.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        });

        first_non_empty([
            from_items,
            section.map(|s| s.raw_text.clone()),
            self.basics.summary.clone(),
        ])
    }
}

/// Sections in render order: `order` ascending, ties broken by id, then map key.
///
/// The summary section is excluded because it belongs to the header block.
/// Invisible sections are kept; visibility is the projection's concern.
pub fn get_sorted_sections(record: &ResumeRecord) -> Vec<&Section> {
    let mut sections: Vec<(&String, &Section)> = record
        .sections
        .iter()
        .filter(|(key, section)| key.as_str() != SUMMARY_SECTION_ID && !section.is_summary())
        .collect();

    sections.sort_by(|(key_a, a), (key_b, b)| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| key_a.cmp(key_b))
    });

    sections.into_iter().map(|(_, section)| section).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Legacy record (v1)
// ────────────────────────────────────────────────────────────────────────────

/// The flat pre-sections shape: one array per canonical section, no ordering or
/// visibility metadata, no room for custom sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeRecordV1 {
    #[serde(deserialize_with = "null_as_default")]
    pub basics: Basics,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<TimelineItem>,
    #[serde(deserialize_with = "deserialize_legacy_skills")]
    pub skills: Vec<ListItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<ProjectItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<EducationItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub certifications: Vec<CertificationItem>,
}

/// Older records store skills as bare strings. Those are folded into one unlabelled
/// group at the position of the first string; object entries decode as [`ListItem`].
fn deserialize_legacy_skills<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ListItem>, D::Error> {
    let raw: Vec<Value> = null_as_default(deserializer)?;
    let mut skills: Vec<ListItem> = Vec::with_capacity(raw.len());
    let mut loose: Option<usize> = None;
    for entry in raw {
        match entry {
            Value::String(skill) => match loose {
                Some(at) => skills[at].items.push(skill),
                None => {
                    loose = Some(skills.len());
                    skills.push(ListItem {
                        label: None,
                        items: vec![skill],
                    });
                }
            },
            Value::Null => {}
            other => {
                let item = ListItem::deserialize(other).map_err(serde::de::Error::custom)?;
                skills.push(item);
            }
        }
    }
    Ok(skills)
}
