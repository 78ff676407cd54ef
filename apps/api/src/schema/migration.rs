//! Conversions between the legacy flat record (v1) and the canonical section-map
//! record (v2), plus the single ingestion entry point [`normalize`].
//!
//! Both migrations are total. The only failure is input that matches neither shape,
//! reported as [`MigrationError`] by [`RawRecord::from_value`].
//!
//! v2 → v1 is lossy by declaration: custom sections, ordering, visibility, labels,
//! `rawText` and items that do not fit the legacy array for their section are dropped.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::schema::fields::humanize_id;
use crate::schema::items::SectionItem;
use crate::schema::record::{
    ResumeRecord, ResumeRecordV1, Section, CANONICAL_SECTION_ORDER, SUMMARY_SECTION_ID,
};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("record must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("`sections` must be an object, found {found}")]
    InvalidSections { found: &'static str },

    #[error("record matches neither the canonical nor the legacy shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A top-level legacy array outside the canonical six (e.g. `awards`).
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalArray {
    pub id: String,
    pub items: Vec<Value>,
}

/// A record as received at the boundary, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Canonical(ResumeRecord),
    Legacy {
        record: ResumeRecordV1,
        additional: Vec<AdditionalArray>,
    },
}

/// Legacy root keys that never become additional sections.
const LEGACY_KNOWN_KEYS: &[&str] = &[
    "basics",
    "experience",
    "skills",
    "projects",
    "education",
    "certifications",
];

/// Basics fields that very old payloads carried at the root.
const BASICS_FIELDS: &[&str] = &[
    "name", "title", "email", "phone", "location", "links", "summary",
];

/// Structural check: the value is an object whose `sections` is an object.
pub fn is_v2(value: &Value) -> bool {
    value.get("sections").map_or(false, Value::is_object)
}

impl RawRecord {
    pub fn from_value(value: Value) -> Result<Self, MigrationError> {
        let mut root = match value {
            Value::Object(map) => map,
            other => {
                return Err(MigrationError::NotAnObject {
                    found: json_type(&other),
                })
            }
        };

        match root.get("sections").map(json_type) {
            Some("object") => {
                let mut record: ResumeRecord = serde_json::from_value(Value::Object(root))?;
                fill_section_ids(&mut record);
                Ok(RawRecord::Canonical(record))
            }
            Some("null") | None => {
                let additional = take_additional_arrays(&mut root);
                lift_root_basics(&mut root);
                let record: ResumeRecordV1 = serde_json::from_value(Value::Object(root))?;
                Ok(RawRecord::Legacy { record, additional })
            }
            Some(found) => Err(MigrationError::InvalidSections { found }),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, RawRecord::Legacy { .. })
    }
}

/// Parses and canonicalizes a record of unknown version.
pub fn normalize(value: Value) -> Result<ResumeRecord, MigrationError> {
    RawRecord::from_value(value).map(ensure_v2_format)
}

/// Canonical input passes through untouched; legacy input is migrated.
pub fn ensure_v2_format(raw: RawRecord) -> ResumeRecord {
    match raw {
        RawRecord::Canonical(record) => record,
        RawRecord::Legacy { record, additional } => {
            let mut migrated = migrate_v1_to_v2(&record);
            append_additional_sections(&mut migrated, additional);
            migrated
        }
    }
}

pub fn migrate_v1_to_v2(legacy: &ResumeRecordV1) -> ResumeRecord {
    let mut record = ResumeRecord::new(legacy.basics.clone());

    if let Some(summary) = legacy
        .basics
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        record.insert_section(
            canonical_section(SUMMARY_SECTION_ID).with_items(vec![SectionItem::text(summary)]),
        );
    }

    let arrays: [(&str, Vec<SectionItem>); 5] = [
        (
            "experience",
            legacy.experience.iter().cloned().map(SectionItem::Timeline).collect(),
        ),
        (
            "skills",
            legacy.skills.iter().cloned().map(SectionItem::List).collect(),
        ),
        (
            "projects",
            legacy.projects.iter().cloned().map(SectionItem::Project).collect(),
        ),
        (
            "education",
            legacy.education.iter().cloned().map(SectionItem::Education).collect(),
        ),
        (
            "certifications",
            legacy
                .certifications
                .iter()
                .cloned()
                .map(SectionItem::Certification)
                .collect(),
        ),
    ];

    for (id, items) in arrays {
        record.insert_section(canonical_section(id).with_items(items));
    }

    debug!(sections = record.sections.len(), "Migrated legacy record to v2");
    record
}

pub fn migrate_v2_to_v1(record: &ResumeRecord) -> ResumeRecordV1 {
    let mut basics = record.basics.clone();
    if let Some(resolved) = record.summary_text() {
        let unchanged = basics.summary.as_deref().map(str::trim) == Some(resolved.as_str());
        if !unchanged {
            basics.summary = Some(resolved);
        }
    }

    let dropped: Vec<&str> = record
        .sections
        .keys()
        .map(String::as_str)
        .filter(|id| !CANONICAL_SECTION_ORDER.contains(id))
        .collect();
    if !dropped.is_empty() {
        debug!(?dropped, "Custom sections have no legacy slot; dropping");
    }

    ResumeRecordV1 {
        basics,
        experience: collect_items(record, "experience", SectionItem::as_timeline),
        skills: collect_items(record, "skills", SectionItem::as_list),
        projects: collect_items(record, "projects", SectionItem::as_project),
        education: collect_items(record, "education", SectionItem::as_education),
        certifications: collect_items(record, "certifications", SectionItem::as_certification),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn canonical_section(id: &str) -> Section {
    let order = CANONICAL_SECTION_ORDER
        .iter()
        .position(|c| *c == id)
        .unwrap_or(CANONICAL_SECTION_ORDER.len()) as i64;
    Section::new(id, humanize_id(id), order)
}

fn collect_items<T: Clone>(
    record: &ResumeRecord,
    id: &str,
    narrow: fn(&SectionItem) -> Option<&T>,
) -> Vec<T> {
    record
        .sections
        .get(id)
        .map(|s| s.items.iter().filter_map(narrow).cloned().collect())
        .unwrap_or_default()
}

fn append_additional_sections(record: &mut ResumeRecord, additional: Vec<AdditionalArray>) {
    let base = CANONICAL_SECTION_ORDER.len() as i64;
    for (offset, array) in additional.into_iter().enumerate() {
        let items = array.items.into_iter().map(SectionItem::from).collect();
        let section = Section::new(array.id.as_str(), humanize_id(&array.id), base + offset as i64)
            .with_items(items);
        record.insert_section(section);
    }
}

/// Removes non-canonical top-level arrays, in order of appearance.
fn take_additional_arrays(root: &mut Map<String, Value>) -> Vec<AdditionalArray> {
    let ids: Vec<String> = root
        .iter()
        .filter(|(key, value)| {
            value.is_array()
                && !LEGACY_KNOWN_KEYS.contains(&key.as_str())
                && !BASICS_FIELDS.contains(&key.as_str())
        })
        .map(|(key, _)| key.clone())
        .collect();

    ids.into_iter()
        .filter_map(|id| match root.remove(&id) {
            Some(Value::Array(items)) => Some(AdditionalArray { id, items }),
            _ => None,
        })
        .collect()
}

/// Moves root-level basics fields into `basics` unless `basics` already has a value.
fn lift_root_basics(root: &mut Map<String, Value>) {
    let mut basics = match root.remove("basics") {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            // Not an object: leave it for serde to reject.
            root.insert("basics".to_string(), other);
            return;
        }
    };

    for field in BASICS_FIELDS {
        if let Some(value) = root.remove(*field) {
            let occupied = basics.get(*field).map_or(false, |v| !is_blank(v));
            if !occupied {
                basics.insert((*field).to_string(), value);
            }
        }
    }

    root.insert("basics".to_string(), Value::Object(basics));
}

fn fill_section_ids(record: &mut ResumeRecord) {
    for (key, section) in record.sections.iter_mut() {
        if section.id.trim().is_empty() {
            section.id = key.clone();
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
