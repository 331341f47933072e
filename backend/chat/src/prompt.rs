//! System prompt composition.

/// Intent used when nothing has been promoted yet.
pub const DEFAULT_INTENT: &str = "general_query";

pub const BASE_INSTRUCTIONS: &str = "You are Docent, an assistant that answers questions about \
the organization's own documents. Be accurate and concise. If the knowledge below does not \
cover the question, say so instead of guessing.";

pub const KNOWLEDGE_HEADER: &str = "Answer using only the following knowledge:\n";

const INTENT_FRAGMENTS: &[(&str, &str)] = &[
    (
        DEFAULT_INTENT,
        "Give a direct answer first, then any supporting detail.",
    ),
    (
        "find_fee_policy",
        "Users here usually ask about fees. Quote amounts and conditions exactly as written and name the document they come from.",
    ),
    (
        "compare_interest_rates",
        "Users here usually compare rates. Present figures side by side and state the effective date of each.",
    ),
    (
        "print_check_procedure",
        "Users here usually need a procedure. Answer as numbered steps in the documented order.",
    ),
    (
        "account_opening_requirements",
        "Users here usually ask what is required. List each required document or condition on its own line.",
    ),
];

/// Guidance for `intent`; unknown intents get the default fragment.
pub fn intent_fragment(intent: &str) -> &'static str {
    INTENT_FRAGMENTS
        .iter()
        .find(|(name, _)| *name == intent)
        .or_else(|| INTENT_FRAGMENTS.iter().find(|(name, _)| *name == DEFAULT_INTENT))
        .map(|(_, fragment)| *fragment)
        .unwrap_or("")
}

/// Base instructions, intent guidance, then the retrieved knowledge.
pub fn compose_system_prompt(intent: &str, context: &[String]) -> String {
    format!(
        "{}\n\n{}\n\n{}{}",
        BASE_INSTRUCTIONS,
        intent_fragment(intent),
        KNOWLEDGE_HEADER,
        context.join("\n\n")
    )
}
