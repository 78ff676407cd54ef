use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema::items::SectionItem;
use crate::schema::record::ResumeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The record breaks an invariant; renderers skip the offending part.
    Error,
    /// Renderable, but probably not what the user meant.
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    EmptySectionId,
    SectionIdMismatch,
    DuplicateSectionId,
    UnknownItemVariant,
    EmptyItem,
}

impl ViolationKind {
    pub fn severity(&self) -> Severity {
        match self {
            ViolationKind::EmptyItem => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    /// Map key of the section the violation was found in.
    pub section: String,
    pub item_index: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }
}

fn violation(
    kind: ViolationKind,
    section: &str,
    item_index: Option<usize>,
    message: String,
) -> Violation {
    Violation {
        kind,
        severity: kind.severity(),
        section: section.to_string(),
        item_index,
        message,
    }
}

/// Checks the structural invariants of a canonical record.
///
/// Never fails: every problem is reported as a [`Violation`] so the caller can
/// decide between best-effort rendering and rejection. `valid` is false iff at
/// least one error-severity violation was found.
pub fn validate(record: &ResumeRecord) -> ValidationResult {
    let mut violations = Vec::new();
    let mut first_key_for_id: HashMap<&str, &str> = HashMap::new();

    // BTreeMap iteration: violations come out in key order.
    for (key, section) in &record.sections {
        let id = section.id.trim();

        if id.is_empty() {
            violations.push(violation(
                ViolationKind::EmptySectionId,
                key,
                None,
                format!("Section '{key}' has an empty id"),
            ));
        } else {
            if id != key {
                violations.push(violation(
                    ViolationKind::SectionIdMismatch,
                    key,
                    None,
                    format!("Section stored under '{key}' declares id '{id}'"),
                ));
            }
            if let Some(first) = first_key_for_id.get(id) {
                violations.push(violation(
                    ViolationKind::DuplicateSectionId,
                    key,
                    None,
                    format!("Section id '{id}' is already used by section '{first}'"),
                ));
            } else {
                first_key_for_id.insert(id, key.as_str());
            }
        }

        for (index, item) in section.items.iter().enumerate() {
            match item {
                SectionItem::Unknown(raw) => {
                    let tag = raw
                        .get("type")
                        .and_then(|t| t.as_str())
                        .unwrap_or("<missing>");
                    violations.push(violation(
                        ViolationKind::UnknownItemVariant,
                        key,
                        Some(index),
                        format!("Item {index} in '{key}' has unrecognized shape (type: {tag})"),
                    ));
                }
                known if !known.has_content() => {
                    violations.push(violation(
                        ViolationKind::EmptyItem,
                        key,
                        Some(index),
                        format!(
                            "{} item {index} in '{key}' has no content",
                            known.kind().as_str()
                        ),
                    ));
                }
                _ => {}
            }
        }
    }

    let valid = !violations.iter().any(|v| v.severity == Severity::Error);
    ValidationResult { valid, violations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::items::ListItem;
    use crate::schema::record::{Basics, Section};
    use serde_json::json;

    fn record() -> ResumeRecord {
        let mut r = ResumeRecord::new(Basics::default());
        r.insert_section(Section::new("experience", "Experience", 1));
        r.insert_section(Section::new("skills", "Skills", 2).with_items(vec![
            SectionItem::List(ListItem {
                label: Some("Languages".into()),
                items: vec!["Rust".into()],
            }),
        ]));
        r
    }

    fn kinds(result: &ValidationResult) -> Vec<ViolationKind> {
        result.violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_clean_record_is_valid() {
        let result = validate(&record());
        assert!(result.valid);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_duplicate_section_id_reported() {
        let mut r = record();
        r.sections
            .insert("work".to_string(), Section::new("experience", "Work", 3));

        let result = validate(&r);
        assert!(!result.valid);
        assert!(kinds(&result).contains(&ViolationKind::DuplicateSectionId));
        assert!(kinds(&result).contains(&ViolationKind::SectionIdMismatch));
        let dup = result
            .violations
            .iter()
            .find(|v| v.kind == ViolationKind::DuplicateSectionId)
            .unwrap();
        assert_eq!(dup.section, "work");
    }

    #[test]
    fn test_empty_section_id_reported() {
        let mut r = record();
        r.sections.insert("x".to_string(), Section::new("", "", 0));
        let result = validate(&r);
        assert_eq!(kinds(&result), vec![ViolationKind::EmptySectionId]);
    }

    #[test]
    fn test_unknown_item_is_error_with_index() {
        let mut r = record();
        r.sections.get_mut("skills").unwrap().items.push(SectionItem::Unknown(
            json!({"type": "video"}),
        ));
        let result = validate(&r);
        assert!(!result.valid);
        let v = &result.violations[0];
        assert_eq!(v.kind, ViolationKind::UnknownItemVariant);
        assert_eq!(v.item_index, Some(1));
        assert!(v.message.contains("video"));
    }

    #[test]
    fn test_empty_item_is_only_a_warning() {
        let mut r = record();
        r.sections
            .get_mut("experience")
            .unwrap()
            .items
            .push(SectionItem::text("   "));
        let result = validate(&r);
        assert!(result.valid);
        assert_eq!(kinds(&result), vec![ViolationKind::EmptyItem]);
        assert_eq!(result.errors().count(), 0);
    }
}
