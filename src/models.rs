use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shown wherever a source field is missing.
pub const PLACEHOLDER: &str = "-";

pub const FIELD_HOUR: &str = "Hora";
pub const FIELD_EVENT_CONTEXT: &str = "Contexto do Evento";
pub const FIELD_COMPONENT: &str = "Componente";
pub const FIELD_EVENT_NAME: &str = "Nome do evento";

/// One student export as produced by the LMS extraction job.
///
/// Every key is optional; absent keys render as [`PLACEHOLDER`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StudentRecord {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub final_grade: Option<Value>,
    #[serde(default)]
    pub forum_interactions: Option<Value>,
    #[serde(default, rename = "total_moodle_interactions")]
    pub total_interactions: Option<Value>,
    #[serde(default)]
    pub grades: Option<Map<String, Value>>,
    #[serde(default)]
    pub interactions: Option<Vec<InteractionRecord>>,
}

impl StudentRecord {
    pub fn display_name(&self) -> String {
        display_value(self.name.as_ref())
    }

    pub fn interactions(&self) -> &[InteractionRecord] {
        self.interactions.as_deref().unwrap_or(&[])
    }
}

/// A single row of the interaction log. The field set is open and kept in
/// source order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct InteractionRecord(pub Map<String, Value>);

impl InteractionRecord {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of `key`, or `""` when absent or not a string.
    pub fn text(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

impl From<Map<String, Value>> for InteractionRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// An interaction placed on the trajectory chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryNode {
    pub id: String,
    pub label: String,
    pub parent_ids: Vec<String>,
    pub fields: Map<String, Value>,
}

impl TrajectoryNode {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

/// Node count for one category in a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub active_count: usize,
}

pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_to_none() {
        let student: StudentRecord = serde_json::from_str("{}").unwrap();
        assert!(student.name.is_none());
        assert!(student.grades.is_none());
        assert!(student.interactions().is_empty());
        assert_eq!(student.display_name(), PLACEHOLDER);
    }

    #[test]
    fn grades_keep_source_order() {
        let student: StudentRecord =
            serde_json::from_str(r#"{"grades":{"Zeta":1,"Alfa":2,"Meio":3}}"#).unwrap();
        let keys: Vec<&str> = student
            .grades
            .as_ref()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["Zeta", "Alfa", "Meio"]);
    }

    #[test]
    fn interaction_fields_pass_through() {
        let student: StudentRecord = serde_json::from_str(
            r#"{"interactions":[{"Componente":"Fórum","IP":"10.0.0.1","Extra":{"a":1}}]}"#,
        )
        .unwrap();
        let record = &student.interactions()[0];
        assert_eq!(record.text(FIELD_COMPONENT), "Fórum");
        assert_eq!(record.text("IP"), "10.0.0.1");
        assert_eq!(record.text(FIELD_EVENT_NAME), "");
        assert!(record.field("Extra").unwrap().is_object());
    }

    #[test]
    fn display_value_formats_scalars() {
        assert_eq!(display_value(Some(&Value::from("8,5"))), "8,5");
        assert_eq!(display_value(Some(&Value::from(42))), "42");
        assert_eq!(display_value(Some(&Value::Null)), PLACEHOLDER);
        assert_eq!(display_value(None), PLACEHOLDER);
    }
}
