//! Response Normalizer — coerces raw model output into a well-formed `RecommendationRecord`.
//!
//! # Recovery tiers
//! 1. The whole reply parses as a JSON object → `NormalizedReply::Parsed`.
//! 2. A ```` ```json ```` fenced block inside the reply parses as a JSON object →
//!    `NormalizedReply::ExtractedFromBlock`.
//! 3. Nothing parses → `NormalizedReply::Degenerate`: one placeholder material and the
//!    full reply kept verbatim as the general recommendations.
//!
//! `normalize` never fails. Field extraction is presence-or-default: every field of the
//! record is populated no matter what shape the model chose to send.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::recommendation::{MaterialEntry, PropertyMap, RecommendationRecord};

/// Material name used by the degenerate record.
pub const PLACEHOLDER_NAME: &str = "See recommendations";
/// Text used for every other field of the degenerate material.
pub const PLACEHOLDER_TEXT: &str = "See full text";

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Recognized top-level text sections (besides `materials`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    GeneralRecommendations,
    AltMaterials,
    ManufacturingConsiderations,
    CostConsiderations,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::GeneralRecommendations,
        Section::AltMaterials,
        Section::ManufacturingConsiderations,
        Section::CostConsiderations,
    ];

    /// The JSON key the model is asked to emit for this section.
    pub fn key(self) -> &'static str {
        match self {
            Section::GeneralRecommendations => "general_recommendations",
            Section::AltMaterials => "alt_materials",
            Section::ManufacturingConsiderations => "manufacturing_considerations",
            Section::CostConsiderations => "cost_considerations",
        }
    }
}

/// Which recovery tier produced the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Parsed,
    ExtractedFromBlock,
    Degenerate,
}

/// Tagged normalization result. Every variant carries a fully populated record.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedReply {
    Parsed(RecommendationRecord),
    ExtractedFromBlock(RecommendationRecord),
    Degenerate(RecommendationRecord),
}

impl NormalizedReply {
    pub fn source(&self) -> ReplySource {
        match self {
            NormalizedReply::Parsed(_) => ReplySource::Parsed,
            NormalizedReply::ExtractedFromBlock(_) => ReplySource::ExtractedFromBlock,
            NormalizedReply::Degenerate(_) => ReplySource::Degenerate,
        }
    }

    pub fn record(&self) -> &RecommendationRecord {
        match self {
            NormalizedReply::Parsed(r)
            | NormalizedReply::ExtractedFromBlock(r)
            | NormalizedReply::Degenerate(r) => r,
        }
    }

    pub fn into_record(self) -> RecommendationRecord {
        match self {
            NormalizedReply::Parsed(r)
            | NormalizedReply::ExtractedFromBlock(r)
            | NormalizedReply::Degenerate(r) => r,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a raw model reply. Sections absent from `expected_sections` are not read.
pub fn normalize(raw_text: &str, expected_sections: &[Section]) -> NormalizedReply {
    if let Some(object) = parse_object(raw_text) {
        debug!("Model reply parsed as JSON");
        return NormalizedReply::Parsed(extract_record(&object, expected_sections));
    }

    if let Some(object) = fenced_json_blocks(raw_text).find_map(parse_object) {
        debug!("Model reply recovered from fenced JSON block");
        return NormalizedReply::ExtractedFromBlock(extract_record(&object, expected_sections));
    }

    warn!(
        "Could not parse JSON from model reply ({} chars), using text fallback",
        raw_text.len()
    );
    NormalizedReply::Degenerate(degenerate_record(raw_text))
}

/// The fallback record: one placeholder material, the raw reply kept verbatim.
pub fn degenerate_record(raw_text: &str) -> RecommendationRecord {
    let mut properties = PropertyMap::new();
    properties.insert("info", PLACEHOLDER_TEXT);

    RecommendationRecord {
        materials: vec![MaterialEntry {
            name: PLACEHOLDER_NAME.to_string(),
            properties,
            application: PLACEHOLDER_TEXT.to_string(),
            rationale: PLACEHOLDER_TEXT.to_string(),
        }],
        general_recommendations: raw_text.to_string(),
        ..Default::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ────────────────────────────────────────────────────────────────────────────

/// Strict parse: only a top-level JSON object is accepted.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn json_fence() -> &'static Regex {
    static JSON_FENCE_RE: OnceLock<Regex> = OnceLock::new();
    JSON_FENCE_RE.get_or_init(|| {
        Regex::new(r"(?is)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("fence pattern is valid")
    })
}

/// Inner contents of every ```` ```json ```` block, in document order.
fn fenced_json_blocks(text: &str) -> impl Iterator<Item = &str> {
    json_fence()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

// ────────────────────────────────────────────────────────────────────────────
// Field extraction
// ────────────────────────────────────────────────────────────────────────────

fn extract_record(object: &Map<String, Value>, expected: &[Section]) -> RecommendationRecord {
    let materials = match object.get("materials") {
        Some(Value::Array(items)) => items.iter().map(extract_entry).collect(),
        // A single material sent without the surrounding array.
        Some(item @ Value::Object(_)) => vec![extract_entry(item)],
        _ => Vec::new(),
    };

    let section_text = |s: Section| -> Option<String> {
        if !expected.contains(&s) {
            return None;
        }
        object.get(s.key()).and_then(|v| flatten_text(v, "\n"))
    };
    // Only the optional sections collapse blank text to `None`.
    let optional = |s: Section| section_text(s).filter(|t| !t.trim().is_empty());

    RecommendationRecord {
        materials,
        general_recommendations: section_text(Section::GeneralRecommendations)
            .unwrap_or_default(),
        alt_materials: optional(Section::AltMaterials),
        manufacturing_considerations: optional(Section::ManufacturingConsiderations),
        cost_considerations: optional(Section::CostConsiderations),
    }
}

fn extract_entry(item: &Value) -> MaterialEntry {
    let fields = match item {
        Value::Object(fields) => fields,
        Value::String(name) => {
            return MaterialEntry {
                name: name.clone(),
                ..Default::default()
            }
        }
        _ => return MaterialEntry::default(),
    };

    let text = |key: &str| {
        fields
            .get(key)
            .and_then(|v| flatten_text(v, "\n"))
            .unwrap_or_default()
    };

    MaterialEntry {
        name: text("name"),
        properties: extract_properties(fields.get("properties")),
        application: text("application"),
        rationale: text("rationale"),
    }
}

fn extract_properties(value: Option<&Value>) -> PropertyMap {
    match value {
        Some(Value::Object(props)) => props
            .iter()
            .map(|(k, v)| (k.clone(), flatten_text(v, ", ").unwrap_or_default()))
            .collect(),
        None | Some(Value::Null) => PropertyMap::new(),
        Some(other) => {
            let mut props = PropertyMap::new();
            if let Some(text) = flatten_text(other, ", ") {
                props.insert("info", text);
            }
            props
        }
    }
}

/// Renders any JSON value as display text. `null` yields `None`.
///
/// Arrays join their items with `separator`; objects become `key: value` pairs joined the
/// same way. Numbers and booleans keep their JSON spelling.
fn flatten_text(value: &Value, separator: &str) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| flatten_text(v, ", "))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(separator),
        ),
        Value::Object(map) => Some(
            map.iter()
                .filter_map(|(k, v)| flatten_text(v, ", ").map(|t| format!("{k}: {t}")))
                .collect::<Vec<_>>()
                .join(separator),
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MATERIALS: &str = r#"{
        "materials": [
            {
                "name": "Aluminium alloy A356-T6 (cast aluminium)",
                "properties": {
                    "density": "2.68 g/cm3",
                    "tensile_strength": "262 MPa",
                    "thermal_conductivity": "151 W/m-K"
                },
                "application": "Main gearbox housing shell",
                "rationale": "Light, castable, good heat rejection"
            },
            {
                "name": "Magnesium alloy AZ91D",
                "properties": {"density": "1.81 g/cm3"},
                "application": "Cover plates",
                "rationale": "Lowest density structural metal"
            }
        ],
        "general_recommendations": "Prefer cast aluminium for the housing.",
        "alt_materials": "Glass-filled PA66 for covers: cheap, but creeps when hot.",
        "manufacturing_considerations": "High-pressure die casting at volume.",
        "cost_considerations": "A356 housing approx. INR 6500 per unit."
    }"#;

    #[test]
    fn test_strict_json_is_parsed() {
        let reply = normalize(TWO_MATERIALS, &Section::ALL);
        assert_eq!(reply.source(), ReplySource::Parsed);

        let record = reply.record();
        assert_eq!(record.materials.len(), 2);
        assert_eq!(record.materials[1].name, "Magnesium alloy AZ91D");
        assert_eq!(
            record.general_recommendations,
            "Prefer cast aluminium for the housing."
        );
        assert!(record.alt_materials.is_some());
        assert!(record.manufacturing_considerations.is_some());
        assert!(record.cost_considerations.is_some());
    }

    #[test]
    fn test_property_order_is_emission_order() {
        let record = normalize(TWO_MATERIALS, &Section::ALL).into_record();
        let keys: Vec<&str> = record.materials[0].properties.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["density", "tensile_strength", "thermal_conductivity"]);
    }

    #[test]
    fn test_fenced_block_inside_prose_is_recovered() {
        let raw = format!(
            "Here are my recommendations for your product:\n```json\n{TWO_MATERIALS}\n```\nLet me know if you need more."
        );
        let reply = normalize(&raw, &Section::ALL);
        assert_eq!(reply.source(), ReplySource::ExtractedFromBlock);
        assert_eq!(reply.record().materials.len(), 2);
    }

    #[test]
    fn test_fenced_block_with_crlf_and_uppercase_tag() {
        let raw = "Result:\r\n```JSON  \r\n{\"materials\": [], \"general_recommendations\": \"ok\"}\r\n```\r\n";
        let reply = normalize(raw, &Section::ALL);
        assert_eq!(reply.source(), ReplySource::ExtractedFromBlock);
        assert_eq!(reply.record().general_recommendations, "ok");
        assert!(reply.record().materials.is_empty());
    }

    #[test]
    fn test_first_valid_fenced_block_wins() {
        let raw = "```json\n{not json at all\n```\nthen\n```json\n{\"general_recommendations\": \"second\"}\n```";
        let reply = normalize(raw, &Section::ALL);
        assert_eq!(reply.source(), ReplySource::ExtractedFromBlock);
        assert_eq!(reply.record().general_recommendations, "second");
    }

    #[test]
    fn test_untagged_fence_is_not_recovered() {
        let raw = "Sure!\n```\n{\"general_recommendations\": \"x\"}\n```";
        let reply = normalize(raw, &Section::ALL);
        assert_eq!(reply.source(), ReplySource::Degenerate);
    }

    #[test]
    fn test_prose_yields_degenerate_record_verbatim() {
        let prose = "  Use 6061-T6 aluminium for the frame.\nSteel for the axle.  ";
        let reply = normalize(prose, &Section::ALL);
        assert_eq!(reply.source(), ReplySource::Degenerate);

        let record = reply.into_record();
        assert_eq!(record.materials.len(), 1);
        let entry = &record.materials[0];
        assert_eq!(entry.name, PLACEHOLDER_NAME);
        assert_eq!(entry.properties.get("info"), Some(PLACEHOLDER_TEXT));
        assert_eq!(entry.application, PLACEHOLDER_TEXT);
        assert_eq!(entry.rationale, PLACEHOLDER_TEXT);
        assert_eq!(record.general_recommendations, prose);
        assert!(record.alt_materials.is_none());
    }

    #[test]
    fn test_empty_reply_is_degenerate() {
        let reply = normalize("", &Section::ALL);
        assert_eq!(reply.source(), ReplySource::Degenerate);
        assert_eq!(reply.record().general_recommendations, "");
        assert_eq!(reply.record().materials.len(), 1);
    }

    #[test]
    fn test_top_level_array_is_not_a_record() {
        let reply = normalize(r#"[{"name": "Steel"}]"#, &Section::ALL);
        assert_eq!(reply.source(), ReplySource::Degenerate);
    }

    #[test]
    fn test_missing_fields_default() {
        let raw = r#"{"materials": [{"name": "PEEK"}, {}]}"#;
        let record = normalize(raw, &Section::ALL).into_record();
        assert_eq!(record.materials.len(), 2);
        assert_eq!(record.materials[0].name, "PEEK");
        assert_eq!(record.materials[0].application, "");
        assert!(record.materials[0].properties.is_empty());
        assert_eq!(record.materials[1], MaterialEntry::default());
        assert_eq!(record.general_recommendations, "");
        assert!(record.cost_considerations.is_none());
    }

    #[test]
    fn test_zero_materials_is_valid() {
        let raw = r#"{"materials": [], "general_recommendations": "Nothing suitable."}"#;
        let reply = normalize(raw, &Section::ALL);
        assert_eq!(reply.source(), ReplySource::Parsed);
        assert!(reply.record().materials.is_empty());
    }

    #[test]
    fn test_non_array_materials_defaults_to_empty() {
        let raw = r#"{"materials": "aluminium", "general_recommendations": "g"}"#;
        let record = normalize(raw, &Section::ALL).into_record();
        assert!(record.materials.is_empty());
    }

    #[test]
    fn test_single_material_object_is_accepted() {
        let raw = r#"{"materials": {"name": "Ti-6Al-4V", "rationale": "strength"}}"#;
        let record = normalize(raw, &Section::ALL).into_record();
        assert_eq!(record.materials.len(), 1);
        assert_eq!(record.materials[0].name, "Ti-6Al-4V");
    }

    #[test]
    fn test_bare_string_material_becomes_name() {
        let raw = r#"{"materials": ["Nylon 6/6", 42]}"#;
        let record = normalize(raw, &Section::ALL).into_record();
        assert_eq!(record.materials[0].name, "Nylon 6/6");
        assert_eq!(record.materials[1], MaterialEntry::default());
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let raw = r#"{"materials": [{
            "name": "Steel",
            "properties": {"density": 7.85, "magnetic": true, "grades": ["S275", "S355"], "note": null},
            "application": ["frame", "axle"],
            "rationale": null
        }]}"#;
        let record = normalize(raw, &Section::ALL).into_record();
        let entry = &record.materials[0];
        assert_eq!(entry.properties.get("density"), Some("7.85"));
        assert_eq!(entry.properties.get("magnetic"), Some("true"));
        assert_eq!(entry.properties.get("grades"), Some("S275, S355"));
        assert_eq!(entry.properties.get("note"), Some(""));
        assert_eq!(entry.application, "frame\naxle");
        assert_eq!(entry.rationale, "");
    }

    #[test]
    fn test_string_properties_kept_as_info() {
        let raw = r#"{"materials": [{"name": "Brass", "properties": "machinable, 8.5 g/cm3"}]}"#;
        let record = normalize(raw, &Section::ALL).into_record();
        assert_eq!(
            record.materials[0].properties.get("info"),
            Some("machinable, 8.5 g/cm3")
        );
    }

    #[test]
    fn test_structured_sections_are_flattened() {
        let raw = r#"{
            "general_recommendations": "g",
            "alt_materials": [
                {"material": "CFRP", "pros": "stiff", "cons": "expensive"},
                "Magnesium"
            ]
        }"#;
        let record = normalize(raw, &Section::ALL).into_record();
        assert_eq!(
            record.alt_materials.as_deref(),
            Some("material: CFRP, pros: stiff, cons: expensive\nMagnesium")
        );
    }

    #[test]
    fn test_blank_optional_sections_become_none() {
        let raw = r#"{"general_recommendations": "g", "alt_materials": "   ", "cost_considerations": ""}"#;
        let record = normalize(raw, &Section::ALL).into_record();
        assert!(record.alt_materials.is_none());
        assert!(record.cost_considerations.is_none());
    }

    #[test]
    fn test_whitespace_general_recommendations_read_verbatim() {
        let raw = r#"{"materials": [], "general_recommendations": "  \n "}"#;
        let record = normalize(raw, &Section::ALL).into_record();
        assert_eq!(record.general_recommendations, "  \n ");

        let degenerate = normalize("  \n ", &Section::ALL);
        assert_eq!(degenerate.source(), ReplySource::Degenerate);
        assert_eq!(degenerate.record().general_recommendations, "  \n ");
    }

    #[test]
    fn test_unexpected_sections_are_not_read() {
        let record = normalize(TWO_MATERIALS, &[Section::GeneralRecommendations]).into_record();
        assert!(!record.general_recommendations.is_empty());
        assert!(record.alt_materials.is_none());
        assert!(record.manufacturing_considerations.is_none());
        assert!(record.cost_considerations.is_none());
        assert_eq!(record.materials.len(), 2);
    }

    #[test]
    fn test_normalizing_serialized_record_is_idempotent() {
        let inputs = [
            TWO_MATERIALS.to_string(),
            "plain prose, no JSON here".to_string(),
            "  \n ".to_string(),
            r#"{"materials": [{"name": "PEEK", "properties": {"b": "2", "a": "1"}}]}"#.to_string(),
            r#"{"materials": [], "general_recommendations": " \t "}"#.to_string(),
        ];
        for raw in inputs {
            let first = normalize(&raw, &Section::ALL).into_record();
            let canonical = serde_json::to_string(&first).unwrap();
            let second = normalize(&canonical, &Section::ALL);
            assert_eq!(second.source(), ReplySource::Parsed);
            assert_eq!(second.into_record(), first, "round trip changed record for {raw}");
        }
    }

    #[test]
    fn test_every_input_shape_yields_a_sequence_of_entries() {
        let cases = [
            (TWO_MATERIALS, 2),
            ("```json\n{\"materials\": [{\"name\": \"x\"}]}\n```", 1),
            ("no structure at all", 1),
            ("{\"materials\": null}", 0),
            ("{broken json", 1),
        ];
        for (raw, expected) in cases {
            let record = normalize(raw, &Section::ALL).into_record();
            assert_eq!(record.materials.len(), expected, "input: {raw}");
            for entry in &record.materials {
                let json = serde_json::to_value(entry).unwrap();
                for field in ["name", "properties", "application", "rationale"] {
                    assert!(!json[field].is_null(), "{field} missing for input: {raw}");
                }
            }
        }
    }
}
