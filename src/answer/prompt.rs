use crate::retrieval::RerankedMatch;

pub const SYSTEM_PROMPT: &str = "You are a careful government-document assistant.
- Answer using ONLY the provided context chunks.
- If the context is insufficient, say you don't have enough information.
- Always include inline citations like [doc_id:PAGE].
- Prefer clear, concise language suitable for public sector readers.
";

/// Renders retrieved contexts as `[doc_id:page] text` lines followed by the question.
pub fn build_user_prompt(question: &str, contexts: &[RerankedMatch]) -> String {
    let mut lines = Vec::with_capacity(contexts.len() + 4);
    lines.push("Context:".to_string());
    for context in contexts {
        let metadata = context.metadata();
        lines.push(format!(
            "[{}:{}] {}",
            metadata.doc_id,
            metadata.page,
            metadata.text.trim()
        ));
    }
    lines.push(String::new());
    lines.push("User question:".to_string());
    lines.push(question.trim().to_string());
    lines.join("\n")
}
