// Material recommendation service.
// Implements: prompt building, the single model call, reply normalization, HTTP handler.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod handlers;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
