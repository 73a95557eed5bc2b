//! Prompt text for grounded question answering.

/// Reply the model is told to give when the context lacks the answer.
pub const INSUFFICIENT_CONTEXT_REPLY: &str =
    "The provided documents do not contain enough information to answer this question.";

/// Build the user prompt asking a model to answer `question` from `context` only.
pub fn rag_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an assistant that analyzes and explains technical or organizational documents.\n\
         Answer the user's question using only the information in the context below.\n\
         \n\
         ---\n\
         Context:\n\
         {context}\n\
         ---\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         ---\n\
         Guidelines:\n\
         - Use only the information from the context above; do not invent facts.\n\
         - Give a detailed, well-structured answer formatted as Markdown.\n\
         - Group related ideas into sections or bullet points.\n\
         - If the information is missing, reply exactly with:\n  \
           \"{INSUFFICIENT_CONTEXT_REPLY}\"\n\
         - Keep a professional, factual tone.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_and_question() {
        let prompt = rag_prompt("Refunds take 5 days.", "How long do refunds take?");
        let context_at = prompt.find("Refunds take 5 days.").unwrap();
        let question_at = prompt.find("How long do refunds take?").unwrap();
        assert!(context_at < question_at);
        assert!(prompt.contains(INSUFFICIENT_CONTEXT_REPLY));
    }
}
