use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered hierarchy level labels handed to graph generation.
///
/// Settings may hold the labels as a JSON array, a JSON-array-shaped string
/// (`'["H1", "H2"]'`) or a comma-separated string (`"H1, H2"`). All three
/// collapse into this one list at the configuration boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLabels(Vec<String>);

impl LevelLabels {
    pub fn new(labels: Vec<String>) -> Self {
        Self(
            labels
                .into_iter()
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .collect(),
        )
    }

    pub fn parse_str(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            if let Ok(labels) = serde_json::from_str::<Vec<String>>(trimmed) {
                return Self::new(labels);
            }
            // Loosely quoted arrays such as [H1, 'H2'] fall through to comma splitting.
            let inner = &trimmed[1..trimmed.len() - 1];
            return Self::new(
                inner
                    .split(',')
                    .map(|label| {
                        label
                            .trim()
                            .trim_matches(|c: char| c == '"' || c == '\'')
                            .to_string()
                    })
                    .collect(),
            );
        }
        Self::new(trimmed.split(',').map(str::to_string).collect())
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::new(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::String(s) => Self::parse_str(s),
            _ => Self::default(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Splits a comma-separated list, trimming entries and dropping blanks.
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(items: &[&str]) -> LevelLabels {
        LevelLabels::new(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_literal_list() {
        let parsed = LevelLabels::from_json(&json!(["H1", " H2 ", ""]));
        assert_eq!(parsed, labels(&["H1", "H2"]));
    }

    #[test]
    fn test_json_array_string() {
        let parsed = LevelLabels::from_json(&json!("[\"H1\", \"H2\", \"H3\"]"));
        assert_eq!(parsed, labels(&["H1", "H2", "H3"]));
    }

    #[test]
    fn test_loosely_quoted_array_string() {
        let parsed = LevelLabels::parse_str("['H1', H2]");
        assert_eq!(parsed, labels(&["H1", "H2"]));
    }

    #[test]
    fn test_comma_separated_string() {
        let parsed = LevelLabels::from_json(&json!("H1, H2,,H3 "));
        assert_eq!(parsed, labels(&["H1", "H2", "H3"]));
    }

    #[test]
    fn test_non_list_values_are_empty() {
        assert!(LevelLabels::from_json(&json!(42)).is_empty());
        assert!(LevelLabels::from_json(&Value::Null).is_empty());
    }

    #[test]
    fn test_split_comma_list() {
        assert_eq!(
            split_comma_list(" Person, Organization ,,Place"),
            vec!["Person", "Organization", "Place"]
        );
        assert!(split_comma_list("  ").is_empty());
    }
}
