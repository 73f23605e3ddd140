//! Wire types of the bot function endpoint (`POST /functions/v1/openai-bot`).

use serde::{Deserialize, Serialize};

/// Request body: the raw user text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotPrompt {
    pub prompt: String,
}

/// Success body. A missing `generatedText` means the bot produced no text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotReply {
    #[serde(rename = "generatedText", default)]
    pub generated_text: Option<String>,
}

impl BotReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            generated_text: Some(text.into()),
        }
    }

    /// The generated text, treating blank output as absent.
    pub fn non_blank(&self) -> Option<&str> {
        self.generated_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Failure body returned with HTTP 500.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotFailure {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_uses_camel_case_field() {
        let json = serde_json::to_string(&BotReply::text("Tente 1984.")).unwrap();
        assert_eq!(json, r#"{"generatedText":"Tente 1984."}"#);
    }

    #[test]
    fn reply_without_text_parses() {
        let reply: BotReply = serde_json::from_str("{}").unwrap();
        assert!(reply.generated_text.is_none());
        assert!(reply.non_blank().is_none());
    }

    #[test]
    fn blank_text_counts_as_absent() {
        assert!(BotReply::text("   ").non_blank().is_none());
        assert_eq!(BotReply::text("oi").non_blank(), Some("oi"));
    }
}
