use serde::Deserialize;
use std::fmt;

/// Chapter identifier as it appears in the catalog. The text form is what
/// goes into fetch paths and the location; numeric ids remember that they
/// were numbers so lookups can compare them by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawId")]
pub struct ChapterId {
    text: String,
    numeric: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawId> for ChapterId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => ChapterId { text: number_text(&n), numeric: true },
            RawId::Text(text) => ChapterId { text, numeric: false },
        }
    }
}

/// Integral values print without a fractional part (`1.0` is `1`,
/// `1e2` is `100`).
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

impl ChapterId {
    /// A string id.
    pub fn new(id: impl Into<String>) -> Self {
        ChapterId { text: id.into(), numeric: false }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// Compares against a query parameter. String ids need the exact text;
    /// numeric ids also match any text reading as the same number (`"01"`
    /// matches `1`).
    pub fn matches(&self, raw: &str) -> bool {
        if self.text == raw {
            return true;
        }
        if !self.numeric {
            return false;
        }
        match (self.text.parse::<f64>(), raw.trim().parse::<f64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChapterDescriptor {
    pub id: ChapterId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChapterContent {
    pub content: String,
}

/// Ordered chapter list; order drives both presentation and navigation.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    chapters: Vec<ChapterDescriptor>,
}

impl Catalog {
    pub fn new(chapters: Vec<ChapterDescriptor>) -> Self {
        Self { chapters }
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChapterDescriptor> {
        self.chapters.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChapterDescriptor> {
        self.chapters.iter()
    }

    pub fn position_of(&self, raw_id: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.id.matches(raw_id))
    }

    /// Short label used by the chapter selector.
    pub fn selector_label(&self, index: usize) -> Option<String> {
        self.get(index).map(|c| format!("Ch {}", c.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(json: &str) -> Catalog {
        Catalog::new(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn accepts_numeric_and_string_ids() {
        let c = catalog(r#"[{"id": 1, "title": "A"}, {"id": "prologue", "title": "B"}]"#);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(0).unwrap().id.as_str(), "1");
        assert_eq!(c.get(1).unwrap().id.as_str(), "prologue");
    }

    #[test]
    fn position_of_matches_loosely() {
        let c = catalog(
            r#"[{"id": 1, "title": "A"}, {"id": 2, "title": "B"}, {"id": "x", "title": "C"}]"#,
        );
        assert_eq!(c.position_of("2"), Some(1));
        assert_eq!(c.position_of("02"), Some(1));
        assert_eq!(c.position_of("x"), Some(2));
        assert_eq!(c.position_of("3"), None);
        assert_eq!(c.position_of(""), None);
    }

    #[test]
    fn string_ids_match_exactly() {
        let c = catalog(r#"[{"id": "1", "title": "A"}, {"id": "01", "title": "B"}]"#);
        assert_eq!(c.position_of("01"), Some(1));
        assert_eq!(c.position_of("1"), Some(0));
        assert_eq!(c.position_of("1.0"), None);
        assert!(!c.get(0).unwrap().id.is_numeric());
    }

    #[test]
    fn integral_numbers_print_without_fraction() {
        let c = catalog(
            r#"[{"id": 1.0, "title": "A"}, {"id": 1e2, "title": "B"}, {"id": 2.5, "title": "C"}]"#,
        );
        let ids: Vec<&str> = c.iter().map(|ch| ch.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "100", "2.5"]);
        assert_eq!(crate::library::chapter_path(&c.get(0).unwrap().id), "data/1.json");
        assert_eq!(c.position_of("100"), Some(1));
        assert_eq!(c.position_of("2.50"), Some(2));
    }

    #[test]
    fn selector_label_uses_id() {
        let c = catalog(r#"[{"id": 7, "title": "Seven"}]"#);
        assert_eq!(c.selector_label(0).as_deref(), Some("Ch 7"));
        assert_eq!(c.selector_label(1), None);
    }

    #[test]
    fn content_requires_content_field() {
        let ok: ChapterContent = serde_json::from_str(r#"{"content": "hi"}"#).unwrap();
        assert_eq!(ok.content, "hi");
        assert!(serde_json::from_str::<ChapterContent>(r#"{"body": "hi"}"#).is_err());
    }
}
