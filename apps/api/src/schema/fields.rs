//! Field-level helpers shared by the schema, projection and export layers.

use serde::{Deserialize, Deserializer};

/// Separator used when a date range is flattened to one string.
pub const DATE_RANGE_SEPARATOR: &str = " - ";

/// `deserialize_with` for defaulted fields: an explicit `null` reads as the default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Returns the first candidate that is non-empty after trimming, trimmed.
///
/// Candidates are tried in priority order, so the caller's list *is* the fallback
/// chain: `first_non_empty([section_text, raw_text, basics_summary])`.
pub fn first_non_empty<I, S>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .flatten()
        .map(|c| c.as_ref().trim().to_string())
        .find(|c| !c.is_empty())
}

/// Trimmed view of an optional field; `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Joins the non-blank parts with `separator`, skipping empty parts without leaving gaps.
pub fn join_non_empty<'a, I>(parts: I, separator: &str) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    parts
        .into_iter()
        .filter_map(non_blank)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Flattens a start/end pair into `"start - end"`, dropping whichever side is blank.
pub fn date_range(start: Option<&str>, end: Option<&str>) -> String {
    join_non_empty([start, end], DATE_RANGE_SEPARATOR)
}

/// Turns a section id into a display title: `"open_source"` → `"Open Source"`.
pub fn humanize_id(id: &str) -> String {
    id.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_non_empty_skips_blank_and_missing() {
        let picked = first_non_empty([None, Some("   "), Some(" Hi "), Some("Bye")]);
        assert_eq!(picked.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_first_non_empty_all_blank_is_none() {
        assert_eq!(first_non_empty::<_, &str>([None, Some(""), Some("\n")]), None);
    }

    #[test]
    fn test_join_non_empty_leaves_no_gaps() {
        let line = join_non_empty([Some("Engineer"), Some(""), None, Some("NY")], " | ");
        assert_eq!(line, "Engineer | NY");
    }

    #[test]
    fn test_date_range_variants() {
        assert_eq!(date_range(Some("2020"), Some("2022")), "2020 - 2022");
        assert_eq!(date_range(Some("2020"), None), "2020");
        assert_eq!(date_range(None, Some("Present")), "Present");
        assert_eq!(date_range(Some(" "), None), "");
    }

    #[test]
    fn test_humanize_id() {
        assert_eq!(humanize_id("open_source"), "Open Source");
        assert_eq!(humanize_id("hobbies"), "Hobbies");
        assert_eq!(humanize_id("side-projects"), "Side Projects");
    }
}
