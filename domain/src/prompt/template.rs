//! Prompt templates for completion-backed endpoints

/// Templates for the prompts sent to the completion API
pub struct PromptTemplate;

impl PromptTemplate {
    /// Default system prompt for plain chat
    pub fn chat_system() -> &'static str {
        r#"You are a helpful assistant. Answer clearly and concisely.
If you are unsure about something, say so instead of guessing."#
    }

    /// System prompt when local tools are offered
    pub fn tool_chat_system() -> &'static str {
        r#"You are a helpful assistant with access to tools.
Call a tool when it is needed to answer accurately, and prefer one call per distinct piece of information.
When a tool returns an error, explain the problem to the user or try a different approach.
Once you have what you need, answer directly without calling more tools."#
    }

    /// System prompt for answering from web search hits
    pub fn search_answer_system() -> &'static str {
        r#"You answer questions using the provided web search results.
Only rely on the results. Cite sources by their number in square brackets, like [1].
If the results do not contain the answer, say that they do not."#
    }

    /// User prompt for answering from web search hits
    ///
    /// `results` holds `(title, url, content)` triples in rank order.
    pub fn search_answer_prompt(query: &str, results: &[(String, String, String)]) -> String {
        let mut prompt = format!("Question: {}\n\nSearch results:\n", query);

        for (i, (title, url, content)) in results.iter().enumerate() {
            prompt.push_str(&format!(
                "\n[{}] {}\n{}\n{}\n",
                i + 1,
                title,
                url,
                content
            ));
        }

        prompt.push_str("\nAnswer the question based on the search results above.");
        prompt
    }

    /// System prompt for answering from indexed documents
    pub fn document_answer_system() -> &'static str {
        r#"You answer questions using excerpts from the user's documents.
Base the answer only on the excerpts and mention which document each fact comes from.
If the excerpts do not contain the answer, say so plainly."#
    }

    /// User prompt for answering from indexed documents
    ///
    /// `passages` holds `(filename, text)` pairs, best match first.
    pub fn document_answer_prompt(question: &str, passages: &[(String, String)]) -> String {
        let mut prompt = format!("Question: {}\n\nDocument excerpts:\n", question);

        for (filename, text) in passages {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", filename, text));
        }

        prompt.push_str("\nAnswer the question using only these excerpts.");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_answer_prompt_numbers_results() {
        let results = vec![
            (
                "Rust".to_string(),
                "https://rust-lang.org".to_string(),
                "A language".to_string(),
            ),
            (
                "Tokio".to_string(),
                "https://tokio.rs".to_string(),
                "A runtime".to_string(),
            ),
        ];
        let prompt = PromptTemplate::search_answer_prompt("what is rust?", &results);
        assert!(prompt.contains("Question: what is rust?"));
        assert!(prompt.contains("[1] Rust"));
        assert!(prompt.contains("[2] Tokio"));
        assert!(prompt.contains("https://tokio.rs"));
    }

    #[test]
    fn test_document_answer_prompt_lists_sources() {
        let passages = vec![("handbook.md".to_string(), "Leave is 25 days.".to_string())];
        let prompt = PromptTemplate::document_answer_prompt("How much leave?", &passages);
        assert!(prompt.contains("--- handbook.md ---"));
        assert!(prompt.contains("Leave is 25 days."));
    }

    #[test]
    fn test_system_prompts_not_empty() {
        assert!(!PromptTemplate::chat_system().is_empty());
        assert!(!PromptTemplate::tool_chat_system().is_empty());
        assert!(!PromptTemplate::search_answer_system().is_empty());
        assert!(!PromptTemplate::document_answer_system().is_empty());
    }
}
