// Shared prompt fragments. Each service that calls the LLM keeps its own
// prompts.rs alongside it; this file only holds cross-cutting pieces.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for free-form professional review output.
pub const HR_REVIEWER_SYSTEM: &str = "You are an experienced HR professional with technical \
    expertise across Data Science, Software Engineering, DevOps, Machine Learning, AI, \
    Full Stack Development, Marketing, and more. Respond in well-structured Markdown.";
