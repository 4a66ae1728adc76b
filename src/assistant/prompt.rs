//! Summarization prompt and user-facing messages.

use crate::error::{LlmError, MyVoteError};

use super::AnswerContext;

/// Shown when the data needed for an answer is not available.
pub const UNAVAILABLE_MESSAGE: &str = "ക്ഷമിക്കണം, എനിക്ക് ആ വിവരം ലഭ്യമല്ല";

/// Shown when the language-model quota is exhausted.
pub const QUOTA_MESSAGE: &str =
    "ക്ഷമിക്കണം, AI സേവനത്തിന്റെ പരിധി കഴിഞ്ഞിരിക്കുന്നു (Quota Exceeded). അഡ്മിനുമായി ബന്ധപ്പെടുക.";

/// Shown when no API key could be resolved.
pub const MISSING_KEY_MESSAGE: &str =
    "Error: OpenAI API Key is not configured. Please set it in Admin Settings.";

/// First transcript message.
pub const GREETING: &str =
    "നമസ്കാരം! വോട്ടർ പട്ടികയെക്കുറിച്ചോ ആപ്ലിക്കേഷനെക്കുറിച്ചോ നിങ്ങൾക്ക് എന്തും ചോദിക്കാം.";

/// The message a user sees for a failed answer.
pub fn user_message(err: &MyVoteError) -> String {
    match err {
        MyVoteError::Llm(LlmError::MissingApiKey) => MISSING_KEY_MESSAGE.to_string(),
        MyVoteError::Llm(LlmError::RateLimited) => QUOTA_MESSAGE.to_string(),
        other => format!("ക്ഷമിക്കണം, ഒരു തകരാർ സംഭവിച്ചു: {}", other),
    }
}

/// Render the summarization prompt for a question and its context.
pub fn render_summary_prompt(question: &str, context: &AnswerContext) -> String {
    let context_json = serde_json::to_string(context).unwrap_or_else(|_| "{}".to_string());

    format!(
        "You are a helpful and intelligent AI assistant for a Voter Management System in Kerala.\n\
         Your goal is to provide accurate, natural, and easy-to-understand answers to the user's questions.\n\n\
         Important Instructions:\n\
         1. Language: ALWAYS answer in clear, natural Malayalam (മലയാളം).\n\
         2. Data Transliteration: The Context Data contains names and addresses in English. \
         You MUST transliterate these into Malayalam when presenting them.\n   \
         Example: if the context has \"Name: Jithu, House: Vadakkethil\", say \"പേര്: ജിത്തു, വീട്ടുപേര്: വടക്കേതിൽ\".\n\
         3. Data Presentation: use bullet points for lists, formatted as \"• [Malayalam Label]: [Malayalam Value]\".\n\
         4. Input Analysis: understand Malayalam, Manglish, and English inputs.\n\
         5. Tone: polite, helpful, and respectful.\n\
         6. Context: use the Context Data to answer. If the answer is NOT in the context, say \"{unavailable}\".\n\n\
         User Question: \"{question}\"\n\
         Context Data: {context_json}",
        unavailable = UNAVAILABLE_MESSAGE,
    )
}
