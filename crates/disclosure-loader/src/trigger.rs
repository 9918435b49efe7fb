//! Keyword trigger table
//!
//! Matching is a case-insensitive substring test against a fixed keyword
//! set. When several entries match, the one registered first wins.

/// Lowercase a topic signal once so it can be tested against many keywords
#[must_use]
pub fn normalize(signal: &str) -> String {
    signal.to_lowercase()
}

/// Whether any keyword occurs in an already-normalized signal
#[must_use]
pub fn contains_any(keywords: &[String], normalized_signal: &str) -> bool {
    keywords
        .iter()
        .any(|keyword| normalized_signal.contains(keyword.as_str()))
}

/// Normalize keywords: trim, lowercase, drop empties and duplicates
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().trim().to_lowercase();
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

/// Names invoked as `/name` or `@name`, lowercased, in the order they appear
#[must_use]
pub fn explicit_invocations(signal: &str) -> Vec<String> {
    signal
        .split_whitespace()
        .filter_map(|token| {
            let name = token
                .strip_prefix('/')
                .or_else(|| token.strip_prefix('@'))?;
            let name = name.trim_end_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '-'));
            (!name.is_empty()).then(|| name.to_lowercase())
        })
        .collect()
}

/// Ordered table mapping a key to its keyword set
#[derive(Debug, Clone)]
pub struct TriggerTable<K> {
    entries: Vec<(K, Vec<String>)>,
}

impl<K> TriggerTable<K> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry; its keywords are normalized
    pub fn register<I, S>(&mut self, key: K, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries.push((key, normalize_keywords(keywords)));
    }

    /// First-registered key whose keywords occur in the signal
    pub fn first_match(&self, signal: &str) -> Option<&K> {
        self.matches(signal).next()
    }

    /// Every matching key in registration order
    pub fn matches<'a>(&'a self, signal: &str) -> impl Iterator<Item = &'a K> + 'a {
        let signal = normalize(signal);
        self.entries
            .iter()
            .filter(move |(_, keywords)| contains_any(keywords, &signal))
            .map(|(key, _)| key)
    }

    /// Iterate entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[String])> {
        self.entries.iter().map(|(key, kw)| (key, kw.as_slice()))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: PartialEq> TriggerTable<K> {
    /// Keywords registered for a key
    pub fn keywords(&self, key: &K) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, kw)| kw.as_slice())
    }
}

impl<K> Default for TriggerTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TriggerTable<&'static str> {
        let mut table = TriggerTable::new();
        table.register("vue", ["Vue", "composable", "reactivity"]);
        table.register("nextjs", ["next.js", "app router", "composable"]);
        table
    }

    #[test]
    fn test_case_insensitive_substring() {
        let table = table();
        assert_eq!(table.first_match("Fix my REACTIVITY bug"), Some(&"vue"));
        assert_eq!(table.first_match("Using the App Router"), Some(&"nextjs"));
    }

    #[test]
    fn test_first_registered_wins() {
        let table = table();
        assert_eq!(table.first_match("shared composable"), Some(&"vue"));
        let all: Vec<_> = table.matches("shared composable").collect();
        assert_eq!(all, vec![&"vue", &"nextjs"]);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(table().first_match("write a Python data pipeline"), None);
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let mut table = TriggerTable::new();
        table.register("blank", ["", "   "]);
        assert!(table.keywords(&"blank").is_some_and(<[String]>::is_empty));
        assert_eq!(table.first_match("anything at all"), None);
    }

    #[test]
    fn test_explicit_invocations() {
        assert_eq!(
            explicit_invocations("/Vue vs @nextjs, see /usr/bin and me@host"),
            vec!["vue".to_string(), "nextjs".to_string(), "usr/bin".to_string()]
        );
        assert!(explicit_invocations("no invocation here / @").is_empty());
    }

    #[test]
    fn test_normalize_keywords_dedupes() {
        assert_eq!(
            normalize_keywords([" Vue ", "vue", "Pinia"]),
            vec!["vue".to_string(), "pinia".to_string()]
        );
    }
}
