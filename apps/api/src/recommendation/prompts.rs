// All LLM prompt constants for the Recommendation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, SCOPE_INSTRUCTION};

/// Role and task description for material selection.
const ADVISOR_ROLE: &str = "\
You are MaterialMind, a material selection advisor for mechanical engineers.
Given a product description, recommend materials for the product and explain the choice:

1. Identify the components of the product that need distinct materials.
2. For each material give:
   - the full technical name and the common name
   - key properties with numerical values and units (density, tensile strength, \
thermal conductivity, fatigue strength, endurance limit, as relevant)
   - where in the product it is used
   - why it suits that component
   - an approximate cost for the part, in INR (write INR, not the currency symbol)
3. Material alternatives, with pros and cons.
4. Manufacturing considerations that follow from the material choices.
5. Cost considerations and trade-offs.";

/// The reply shape the normalizer reads.
const REPLY_SCHEMA: &str = r#"Respond with a JSON object of exactly this shape:
{
  "materials": [
    {
      "name": "Material name",
      "properties": {
        "property1": "value1",
        "property2": "value2"
      },
      "application": "Where to use this material",
      "rationale": "Why this material is suitable"
    }
  ],
  "general_recommendations": "Overall advice about material selection",
  "alt_materials": "Material alternatives with pros and cons",
  "manufacturing_considerations": "Manufacturing considerations related to material choices",
  "cost_considerations": "Cost considerations and trade-offs"
}"#;

/// Closing instruction appended to every user prompt.
const REQUEST_INSTRUCTION: &str = "Please provide detailed material recommendations for this \
product, including specific materials for each component, their properties, applications, \
and rationale.";

/// Full system prompt for recommendation calls.
pub fn system_prompt() -> String {
    format!("{ADVISOR_ROLE}\n\n{REPLY_SCHEMA}\n\n{JSON_ONLY_INSTRUCTION}\n\n{SCOPE_INSTRUCTION}")
}

/// User prompt: the description, the optional extra requirements, then the closing instruction.
/// Blank requirements are left out.
pub fn build_prompt(description: &str, additional_requirements: Option<&str>) -> String {
    let mut prompt = format!("Product description: {description}");
    if let Some(extra) = additional_requirements.filter(|r| !r.trim().is_empty()) {
        prompt.push_str("\nAdditional requirements: ");
        prompt.push_str(extra);
    }
    prompt.push_str("\n\n");
    prompt.push_str(REQUEST_INSTRUCTION);
    prompt
}
