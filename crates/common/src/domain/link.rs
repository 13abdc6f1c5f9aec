use serde::{Deserialize, Serialize};

/// Relation reference from one upstream record to another
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// Identifier of the referenced record, `None` when the href yields nothing usable
    pub fn target_id(&self) -> Option<&str> {
        non_blank(id_from_path(&self.href))
    }
}

/// Upstream identifier wrapper (`{"identifikatorverdi": "..."}`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "identifikatorverdi")]
    pub value: String,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Extract the trailing identifier segment of a URI-like path or message key.
///
/// `https://host/ressurs/enhetstype/systemid/42` → `42`. A value without any
/// `/` is returned unchanged.
pub fn id_from_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Identifier of the first well-formed link, in link order.
pub fn first_linked_id(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find_map(Link::target_id)
        .map(str::to_string)
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_path() {
        assert_eq!(
            id_from_path("https://example.com/ressurs/enhetstype/systemid/type123"),
            "type123"
        );
        assert_eq!(id_from_path("plain-id"), "plain-id");
        assert_eq!(id_from_path("https://example.com/trailing/"), "");
    }

    #[test]
    fn test_target_id_rejects_malformed_href() {
        assert_eq!(Link::new("https://example.com/x/abc").target_id(), Some("abc"));
        assert_eq!(Link::new("https://example.com/x/").target_id(), None);
        assert_eq!(Link::new("").target_id(), None);
    }

    #[test]
    fn test_first_linked_id_skips_malformed() {
        let links = vec![
            Link::new("https://example.com/org/"),
            Link::new("https://example.com/org/owner123"),
            Link::new("https://example.com/org/owner456"),
        ];

        assert_eq!(first_linked_id(&links).as_deref(), Some("owner123"));
        assert_eq!(first_linked_id(&[]), None);
    }

    #[test]
    fn test_identifier_deserializes_upstream_shape() {
        let id: Identifier =
            serde_json::from_str(r#"{"identifikatorverdi":"abc-1"}"#).unwrap();
        assert_eq!(id, Identifier::new("abc-1"));
    }
}
