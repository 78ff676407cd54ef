use crate::schema::fields::non_blank;
use crate::schema::record::Basics;

/// Separator for single-line contact rendering.
pub const CONTACT_SEPARATOR: &str = " | ";

/// Contact values in fixed order: email, phone, location, then each link.
/// Blank values are dropped and the rest trimmed.
pub fn contact_items(basics: &Basics) -> Vec<String> {
    [
        basics.email.as_deref(),
        basics.phone.as_deref(),
        basics.location.as_deref(),
    ]
    .into_iter()
    .chain(basics.links.iter().map(|l| Some(l.as_str())))
    .filter_map(non_blank)
    .map(str::to_string)
    .collect()
}

pub fn contact_line(basics: &Basics) -> String {
    contact_items(basics).join(CONTACT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_line_drops_empty_values() {
        let basics = Basics {
            email: Some("a@b.com".into()),
            phone: Some("".into()),
            location: Some("NY".into()),
            links: vec!["x.com".into()],
            ..Default::default()
        };
        assert_eq!(contact_line(&basics), "a@b.com | NY | x.com");
    }

    #[test]
    fn test_contact_items_skip_whitespace_links() {
        let basics = Basics {
            phone: Some(" 555-0100 ".into()),
            links: vec!["  ".into(), "github.com/ada".into()],
            ..Default::default()
        };
        assert_eq!(
            contact_items(&basics),
            vec!["555-0100".to_string(), "github.com/ada".to_string()]
        );
    }

    #[test]
    fn test_contact_line_empty_basics() {
        assert_eq!(contact_line(&Basics::default()), "");
    }
}
