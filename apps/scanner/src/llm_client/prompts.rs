// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to all extraction prompts.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Only report facts that appear verbatim in the supplied text. \
    Do NOT infer, interpolate, or invent details. \
    If a field is not present, return an empty string or an empty array for it.";
