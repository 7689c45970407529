// Prompt fragments shared by every caller of the LLM client.
// Feature-specific prompts live next to the feature (see generation/prompts.rs).

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to prose prompts so the model returns only the requested text.
pub const PLAIN_TEXT_INSTRUCTION: &str = "Return only the requested text. \
    Do NOT add headings, quotation marks, or commentary.";
