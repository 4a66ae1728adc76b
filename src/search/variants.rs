//! Model-suggested spelling variants for a typed name.

use crate::llm::TextGenerator;

/// Render the variant prompt for a typed name.
pub fn render_variants_prompt(text: &str) -> String {
    format!(
        "You are a smart search assistant for a Kerala Voter Database.\n\
         The user has typed: \"{text}\"\n\n\
         Your task:\n\
         1. Identify the likely intended name(s), correcting any spelling errors (e.g., \"Surshe\" -> \"Suresh\").\n\
         2. Convert these intended names into Malayalam script.\n\
         3. Provide multiple variations for Malayalam (Chillaksharam, long/short vowels).\n\
         4. Return a comma-separated list containing BOTH the corrected English names and the Malayalam variations.\n\n\
         Return ONLY the comma-separated list. No explanations.\n\n\
         Example Input: \"Surshe\"\n\
         Example Output: Suresh, സുരേഷ്, സുരേഷ, സുരേഷൻ\n\n\
         Example Input: \"Jithu\"\n\
         Example Output: Jithu, ജിത്തു, ജിതു, ജിതൂ\n\n\
         Example Input: \"Gokul\"\n\
         Example Output: Gokul, ഗോകുൽ, ഗോകുല്\u{200D}, ഗോകുല്"
    )
}

/// Split a comma-separated answer into distinct, non-empty variants.
///
/// Falls back to `input` alone when nothing usable remains.
pub fn parse_variants(response: &str, input: &str) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();
    for part in response.split([',', '\n']) {
        let part = part.trim().trim_matches('"').trim();
        if !part.is_empty() && !variants.iter().any(|v| v == part) {
            variants.push(part.to_string());
        }
    }
    if variants.is_empty() {
        variants.push(input.to_string());
    }
    variants
}

/// Ask the model for spelling variants of `text`. Never fails; on any error
/// the input itself is the only variant.
pub async fn suggest_name_variants(generator: &dyn TextGenerator, text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return vec![String::new()];
    }

    match generator.generate(&render_variants_prompt(text)).await {
        Ok(response) => parse_variants(&response, text),
        Err(e) => {
            tracing::warn!(error = %e, "Variant suggestion failed, using input as-is");
            vec![text.to_string()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, Result};
    use async_trait::async_trait;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| LlmError::MissingApiKey.into())
        }
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(
            parse_variants("Suresh, സുരേഷ്, സുരേഷ് ,\"Suresh\"", "Surshe"),
            vec!["Suresh", "സുരേഷ്"]
        );
        assert_eq!(parse_variants(" , ", "Arun"), vec!["Arun"]);
    }

    #[test]
    fn test_prompt_mentions_input() {
        assert!(render_variants_prompt("Surshe").contains("The user has typed: \"Surshe\""));
    }

    #[tokio::test]
    async fn test_suggest_uses_model_answer() {
        let variants = suggest_name_variants(&Fixed(Some("Jithu, ജിത്തു")), "jithu").await;
        assert_eq!(variants, vec!["Jithu", "ജിത്തു"]);
    }

    #[tokio::test]
    async fn test_suggest_falls_back_to_input() {
        let variants = suggest_name_variants(&Fixed(None), " Gokul ").await;
        assert_eq!(variants, vec!["Gokul"]);
    }
}
