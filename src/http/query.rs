//! Multi-valued parameter maps for query strings and urlencoded forms.

/// Ordered, multi-valued `key=value` pairs.
///
/// `get` returns the last value for a key, `get_list` every value in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    pairs: Vec<(String, String)>,
}

impl QueryDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `application/x-www-form-urlencoded` bytes.
    pub fn parse(input: &[u8]) -> Self {
        url::form_urlencoded::parse(input).into_owned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for QueryDict {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_lookup() {
        let q = QueryDict::parse(b"a=1&b=2&a=3");
        assert_eq!(q.get("a"), Some("3"));
        assert_eq!(q.get_list("a"), vec!["1", "3"]);
        assert_eq!(q.get("b"), Some("2"));
        assert_eq!(q.get("c"), None);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_percent_decoding() {
        let q = QueryDict::parse(b"name=J%C3%BCrgen+M");
        assert_eq!(q.get("name"), Some("Jürgen M"));
    }

    #[test]
    fn test_equality_ignores_nothing() {
        assert_eq!(QueryDict::parse(b"a=1"), QueryDict::parse(b"a=1"));
        assert_ne!(QueryDict::parse(b"a=1&b=2"), QueryDict::parse(b"b=2&a=1"));
        assert!(QueryDict::parse(b"").is_empty());
    }
}
