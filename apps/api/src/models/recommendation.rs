use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Ordered property-name → value pairs for a single material.
///
/// Keeps the model's emission order for display and serializes as a JSON object.
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap(Vec<(String, String)>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One `key: value` line per property, in insertion order.
    pub fn flatten(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// One recommended material. Every field is always populated (possibly empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterialEntry {
    pub name: String,
    pub properties: PropertyMap,
    pub application: String,
    pub rationale: String,
}

/// The normalized representation of one recommendation response.
///
/// Optional sections are `None` when the model left them out or sent only whitespace;
/// `None` sections are skipped both in the JSON form and in the rendered report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendationRecord {
    pub materials: Vec<MaterialEntry>,
    pub general_recommendations: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_materials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_considerations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_considerations: Option<String>,
}

impl RecommendationRecord {
    /// Optional sections that carry text, paired with their report heading, in report order.
    pub fn optional_sections(&self) -> Vec<(&'static str, &str)> {
        [
            ("Alternative Materials", &self.alt_materials),
            ("Manufacturing Considerations", &self.manufacturing_considerations),
            ("Cost Considerations", &self.cost_considerations),
        ]
        .into_iter()
        .filter_map(|(heading, text)| text.as_deref().map(|t| (heading, t)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_map_keeps_insertion_order_in_json() {
        let props: PropertyMap = vec![
            ("tensile_strength", "310 MPa"),
            ("density", "2.70 g/cm3"),
            ("alpha", "23.6 um/m-K"),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&props).unwrap();
        assert_eq!(
            json,
            r#"{"tensile_strength":"310 MPa","density":"2.70 g/cm3","alpha":"23.6 um/m-K"}"#
        );
    }

    #[test]
    fn test_property_map_insert_replaces_in_place() {
        let mut props = PropertyMap::new();
        props.insert("a", "1");
        props.insert("b", "2");
        props.insert("a", "3");
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("a"), Some("3"));
        assert_eq!(props.flatten(), "a: 3\nb: 2");
    }

    #[test]
    fn test_flatten_empty_is_empty_string() {
        assert_eq!(PropertyMap::new().flatten(), "");
    }

    #[test]
    fn test_record_skips_missing_optional_sections() {
        let record = RecommendationRecord {
            general_recommendations: "Use aluminium".to_string(),
            cost_considerations: Some("Cast parts are cheaper".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("alt_materials").is_none());
        assert!(value.get("manufacturing_considerations").is_none());
        assert_eq!(value["cost_considerations"], "Cast parts are cheaper");
        assert_eq!(value["materials"], serde_json::json!([]));
    }

    #[test]
    fn test_optional_sections_in_report_order() {
        let record = RecommendationRecord {
            alt_materials: Some("Magnesium".to_string()),
            cost_considerations: Some("INR 4000".to_string()),
            ..Default::default()
        };
        let sections = record.optional_sections();
        assert_eq!(
            sections,
            vec![
                ("Alternative Materials", "Magnesium"),
                ("Cost Considerations", "INR 4000")
            ]
        );
    }
}
