use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Suffix the gradebook export appends to real-valued grade columns.
const REAL_SUFFIX: &str = "(Real)";
const NO_BREAK_SPACE: char = '\u{00A0}';

/// Normalized grade title -> short label (`N0`, `N1`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GradeLabelIndex {
    labels: IndexMap<String, String>,
}

impl GradeLabelIndex {
    /// Labels follow the mapping's iteration order. Titles that normalize to
    /// the same string keep the first position but take the later label.
    pub fn build(grades: &Map<String, Value>) -> Self {
        let mut labels = IndexMap::new();
        for (position, title) in grades.keys().enumerate() {
            labels.insert(normalize_title(title), format!("N{position}"));
        }
        Self { labels }
    }

    pub fn from_optional(grades: Option<&Map<String, Value>>) -> Self {
        grades.map(Self::build).unwrap_or_default()
    }

    /// Exact lookup. The key is not normalized: event contexts are matched
    /// as they appear in the interaction log.
    pub fn label_for(&self, event_context: &str) -> Option<&str> {
        self.labels.get(event_context).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub fn normalize_title(title: &str) -> String {
    let base = match title.strip_suffix(REAL_SUFFIX) {
        Some(stripped) => stripped,
        None => title,
    };
    base.replace(NO_BREAK_SPACE, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grade_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn strips_real_suffix() {
        assert_eq!(normalize_title("Prova Final (Real)"), "Prova Final");
    }

    #[test]
    fn replaces_no_break_space() {
        assert_eq!(normalize_title("Prova\u{00A0}1"), "Prova 1");
        assert_eq!(
            normalize_title("Trabalho\u{00A0}Final\u{00A0}(Real)"),
            "Trabalho Final"
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_title("  Seminário \t"), "Seminário");
    }

    #[test]
    fn suffix_only_counts_at_the_end() {
        assert_eq!(normalize_title("(Real) Prova"), "(Real) Prova");
    }

    #[test]
    fn labels_follow_mapping_order() {
        let index = GradeLabelIndex::build(&grade_map(json!({
            "Prova 1 (Real)": 8,
            "Prova 2 (Real)": 7,
            "Trabalho": "9,0"
        })));
        let entries: Vec<(&str, &str)> = index.iter().collect();
        assert_eq!(
            entries,
            vec![("Prova 1", "N0"), ("Prova 2", "N1"), ("Trabalho", "N2")]
        );
    }

    #[test]
    fn colliding_titles_keep_last_label() {
        let index = GradeLabelIndex::build(&grade_map(json!({
            "Prova (Real)": 5,
            "Outra": 6,
            "Prova": 7
        })));
        assert_eq!(index.len(), 2);
        assert_eq!(index.label_for("Prova"), Some("N2"));
        assert_eq!(index.label_for("Outra"), Some("N1"));
    }

    #[test]
    fn lookup_does_not_normalize_context() {
        let index = GradeLabelIndex::build(&grade_map(json!({"Prova 1 (Real)": 8})));
        assert_eq!(index.label_for("Prova 1"), Some("N0"));
        assert_eq!(index.label_for("Prova 1 (Real)"), None);
        assert_eq!(index.label_for(" Prova 1"), None);
    }

    #[test]
    fn absent_grades_give_empty_index() {
        assert!(GradeLabelIndex::from_optional(None).is_empty());
    }
}
