use crate::retrieval::RetrievedFragment;

pub const FRAGMENT_SEPARATOR: &str = "\n\n---\n\n";

pub fn join_context(fragments: &[RetrievedFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(FRAGMENT_SEPARATOR)
}

/// System instruction for the site assistant.
///
/// With context the model is told to answer from it alone; without context it
/// may fall back to general knowledge.
pub fn chat_system_prompt(fragments: &[RetrievedFragment]) -> String {
    let context = join_context(fragments);
    if context.is_empty() {
        return [
            "You are Kirboreo AI, a helpful assistant for the Kirboreo website.",
            "No site-specific context was found for this question.",
            "Answer from your general knowledge, be concise, and say so when you are unsure.",
            "Do not invent facts about Kirboreo, its research or its stock analyses.",
        ]
        .join("\n");
    }

    format!(
        "You are Kirboreo AI, a helpful assistant for the Kirboreo website.\n\n\
Answer the user's question using ONLY the following context. \
If the answer is not in the context, politely say you don't know.\n\n\
Context:\n{context}\n"
    )
}
