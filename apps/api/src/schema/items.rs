//! Section items: the closed set of content shapes a section can hold.
//!
//! On the wire every item is an object with a `type` discriminant. Items whose tag is
//! missing, unknown, or whose fields do not fit the tagged shape are preserved verbatim
//! as [`SectionItem::Unknown`] so a record never fails to load because of one odd item;
//! renderers skip them and `validate` reports them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::schema::fields::{date_range, non_blank, null_as_default};

// ────────────────────────────────────────────────────────────────────────────
// Item shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextItem {
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
}

/// A dated role: job, volunteer position, community membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineItem {
    #[serde(alias = "position", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(alias = "company", skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
    #[serde(alias = "techStack", deserialize_with = "null_as_default")]
    pub tech: Vec<String>,
}

/// A labelled group of plain strings, e.g. "Languages: Rust, Go".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListItem {
    #[serde(alias = "category", alias = "name", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(alias = "institution", skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
    #[serde(alias = "techStack", deserialize_with = "null_as_default")]
    pub tech: Vec<String>,
    #[serde(alias = "url", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificationItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl TimelineItem {
    pub fn date_range(&self) -> String {
        date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

impl EducationItem {
    pub fn date_range(&self) -> String {
        date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// The sum type
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SectionItem {
    Text(TextItem),
    Timeline(TimelineItem),
    List(ListItem),
    Education(EducationItem),
    Project(ProjectItem),
    Certification(CertificationItem),
    /// Raw payload that matched no known shape. Kept so a save does not lose it.
    Unknown(Value),
}

/// Discriminant of a [`SectionItem`], used for logs, violations and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Text,
    Timeline,
    List,
    Education,
    Project,
    Certification,
    Unknown,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Text => "text",
            ItemKind::Timeline => "timeline",
            ItemKind::List => "list",
            ItemKind::Education => "education",
            ItemKind::Project => "project",
            ItemKind::Certification => "certification",
            ItemKind::Unknown => "unknown",
        }
    }
}

impl SectionItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            SectionItem::Text(_) => ItemKind::Text,
            SectionItem::Timeline(_) => ItemKind::Timeline,
            SectionItem::List(_) => ItemKind::List,
            SectionItem::Education(_) => ItemKind::Education,
            SectionItem::Project(_) => ItemKind::Project,
            SectionItem::Certification(_) => ItemKind::Certification,
            SectionItem::Unknown(_) => ItemKind::Unknown,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        SectionItem::Text(TextItem {
            content: content.into(),
        })
    }

    pub fn as_text(&self) -> Option<&TextItem> {
        match self {
            SectionItem::Text(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_timeline(&self) -> Option<&TimelineItem> {
        match self {
            SectionItem::Timeline(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListItem> {
        match self {
            SectionItem::List(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_education(&self) -> Option<&EducationItem> {
        match self {
            SectionItem::Education(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_project(&self) -> Option<&ProjectItem> {
        match self {
            SectionItem::Project(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_certification(&self) -> Option<&CertificationItem> {
        match self {
            SectionItem::Certification(item) => Some(item),
            _ => None,
        }
    }

    /// True when the item has at least one non-blank field a renderer would show.
    pub fn has_content(&self) -> bool {
        fn any(fields: &[Option<&str>]) -> bool {
            fields.iter().any(|f| non_blank(*f).is_some())
        }
        fn any_line(lines: &[String]) -> bool {
            lines.iter().any(|l| !l.trim().is_empty())
        }

        match self {
            SectionItem::Text(t) => !t.content.trim().is_empty(),
            SectionItem::Timeline(t) => {
                any(&[
                    t.role.as_deref(),
                    t.organization.as_deref(),
                    t.start_date.as_deref(),
                    t.end_date.as_deref(),
                    t.location.as_deref(),
                ]) || any_line(&t.bullets)
                    || any_line(&t.tech)
            }
            SectionItem::List(l) => any_line(&l.items),
            SectionItem::Education(e) => any(&[
                e.degree.as_deref(),
                e.school.as_deref(),
                e.start_date.as_deref(),
                e.end_date.as_deref(),
                e.location.as_deref(),
            ]),
            SectionItem::Project(p) => {
                any(&[p.name.as_deref(), p.description.as_deref(), p.link.as_deref()])
                    || any_line(&p.bullets)
                    || any_line(&p.tech)
            }
            SectionItem::Certification(c) => {
                any(&[c.name.as_deref(), c.issuer.as_deref(), c.date.as_deref()])
            }
            SectionItem::Unknown(_) => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Type guards
// ────────────────────────────────────────────────────────────────────────────

pub fn is_text_item(item: &SectionItem) -> bool {
    matches!(item, SectionItem::Text(_))
}

pub fn is_timeline_item(item: &SectionItem) -> bool {
    matches!(item, SectionItem::Timeline(_))
}

pub fn is_list_item(item: &SectionItem) -> bool {
    matches!(item, SectionItem::List(_))
}

pub fn is_education_item(item: &SectionItem) -> bool {
    matches!(item, SectionItem::Education(_))
}

pub fn is_project_item(item: &SectionItem) -> bool {
    matches!(item, SectionItem::Project(_))
}

pub fn is_certification_item(item: &SectionItem) -> bool {
    matches!(item, SectionItem::Certification(_))
}

/// Ordered subsequence of `items` accepted by `predicate`.
pub fn filter_items_by_type<P>(items: &[SectionItem], predicate: P) -> Vec<&SectionItem>
where
    P: Fn(&SectionItem) -> bool,
{
    items.iter().filter(|item| predicate(item)).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Wire codec
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedItem {
    Text(TextItem),
    Timeline(TimelineItem),
    List(ListItem),
    Education(EducationItem),
    Project(ProjectItem),
    Certification(CertificationItem),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedItemRef<'a> {
    Text(&'a TextItem),
    Timeline(&'a TimelineItem),
    List(&'a ListItem),
    Education(&'a EducationItem),
    Project(&'a ProjectItem),
    Certification(&'a CertificationItem),
}

impl From<Value> for SectionItem {
    fn from(raw: Value) -> Self {
        if let Value::String(content) = raw {
            return SectionItem::Text(TextItem { content });
        }
        match serde_json::from_value::<TaggedItem>(raw.clone()) {
            Ok(TaggedItem::Text(i)) => SectionItem::Text(i),
            Ok(TaggedItem::Timeline(i)) => SectionItem::Timeline(i),
            Ok(TaggedItem::List(i)) => SectionItem::List(i),
            Ok(TaggedItem::Education(i)) => SectionItem::Education(i),
            Ok(TaggedItem::Project(i)) => SectionItem::Project(i),
            Ok(TaggedItem::Certification(i)) => SectionItem::Certification(i),
            Err(_) => SectionItem::Unknown(raw),
        }
    }
}

impl Serialize for SectionItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SectionItem::Text(i) => TaggedItemRef::Text(i).serialize(serializer),
            SectionItem::Timeline(i) => TaggedItemRef::Timeline(i).serialize(serializer),
            SectionItem::List(i) => TaggedItemRef::List(i).serialize(serializer),
            SectionItem::Education(i) => TaggedItemRef::Education(i).serialize(serializer),
            SectionItem::Project(i) => TaggedItemRef::Project(i).serialize(serializer),
            SectionItem::Certification(i) => {
                TaggedItemRef::Certification(i).serialize(serializer)
            }
            SectionItem::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SectionItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(SectionItem::from)
    }
}
