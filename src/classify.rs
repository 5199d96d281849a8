//! Constrained classifier: the external model restricted to a closed grammar.
//!
//! The system instruction is the authoritative contract: exactly one line,
//! drawn from the fixed tag set, `|`-separated payload fields, no surrounding
//! prose. Few-shot examples in the user prompt bias the model toward the
//! grammar rather than free text.
//!
//! Nothing actually prevents the model from emitting malformed output, so
//! the dispatcher treats every line returned here as untrusted input — this
//! module only transports it.

use crate::llm::{LanguageModel, LlmError};

/// The closed output grammar, one permitted form per line.
const GRAMMAR: &str = "Output only one of the following:\n\
    - CODEGEN:<query>\n\
    - SOLVE:<query>\n\
    - WEATHER\n\
    - SCREENSHOT\n\
    - WHATSAPP:<contact>|<message>\n\
    - WHATSAPP_CALL:<contact_name>\n\
    - WHATSAPP_VIDEO_CALL:<contact_name>\n\
    - EMAIL:<to_email>|<subject>|<body>\n\
    - GOOGLE:<query>\n\
    - YOUTUBE:<query>\n\
    - YTPLAY:<query>\n\
    - MAPS_FIND_ME\n\
    - MUTE_SOUND\n\
    - UNMUTE_SOUND\n\
    - SET_VOLUME:<percent>\n\
    - or a raw shell command.";

/// Maps natural phrasing onto the grammar.
pub struct Classifier<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> Classifier<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    /// Classify an utterance into one grammar line.
    ///
    /// Always returns a non-empty string on success: the model's first
    /// non-blank line, trimmed. Transport and model errors propagate as
    /// [`LlmError`]; they are not retried at this layer.
    pub fn classify(&self, text: &str) -> Result<String, LlmError> {
        let prompt = build_prompt(text);
        let response = self.model.complete(GRAMMAR, &prompt)?;

        let line = response
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("")
            .to_string();

        if line.is_empty() {
            return Err(LlmError::ParseError {
                message: "classifier returned an empty response".into(),
            });
        }
        Ok(line)
    }
}

/// The rules-plus-examples prompt wrapped around the utterance.
fn build_prompt(user_input: &str) -> String {
    format!(
        "You are a desktop automation agent.\n\
         Rules:\n\
         - If user wants to generate or write code, build a website, or create a program -> return: CODEGEN:<query>\n\
         - If user asks a mathematical, aptitude, or logical reasoning question -> return: SOLVE:<query>\n\
         - If user asks for weather -> return: WEATHER\n\
         - If user wants a screenshot -> return: SCREENSHOT\n\
         - If user wants to send a WhatsApp message -> return: WHATSAPP:<contact>|<message>\n\
         - If user wants to make a WhatsApp audio call -> return: WHATSAPP_CALL:<contact_name>\n\
         - If user wants to make a WhatsApp video call -> return: WHATSAPP_VIDEO_CALL:<contact_name>\n\
         - If user wants to send email -> return: EMAIL:<to_email>|<subject>|<body>\n\
         - If user wants Google search -> return: GOOGLE:<query>\n\
         - If user wants YouTube search -> return: YOUTUBE:<query>\n\
         - If user wants to play on YouTube -> return: YTPLAY:<query>\n\
         - If user wants location in Maps -> return: MAPS_FIND_ME\n\
         - If user wants to mute sound -> return: MUTE_SOUND\n\
         - If user wants to unmute sound -> return: UNMUTE_SOUND\n\
         - If user wants to set volume -> return: SET_VOLUME:<percent>\n\
         - Otherwise return a raw shell command.\n\
         ----\n\
         Examples:\n\
         - \"call Ankit\" -> WHATSAPP_CALL:Ankit\n\
         - \"video call Riya\" -> WHATSAPP_VIDEO_CALL:Riya\n\
         - \"send message to Sneha hello how are you\" -> WHATSAPP:Sneha|hello how are you\n\
         - \"send email to test@example.com subject Hello body This is a test\" -> EMAIL:test@example.com|Hello|This is a test\n\
         - \"mute sound\" -> MUTE_SOUND\n\
         - \"what's the weather\" -> WEATHER\n\
         - \"create python calculator\" -> CODEGEN:create python calculator\n\
         ----\n\
         User: \"{user_input}\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedModel {
        response: String,
    }
    impl LanguageModel for CannedModel {
        fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
            assert!(system.contains("MAPS_FIND_ME"));
            assert!(user.contains("Examples:"));
            Ok(self.response.clone())
        }
    }

    #[test]
    fn returns_first_trimmed_line() {
        let model = CannedModel {
            response: "  MUTE_SOUND  \nextra prose".into(),
        };
        let line = Classifier::new(&model).classify("mute sound").unwrap();
        assert_eq!(line, "MUTE_SOUND");
    }

    #[test]
    fn skips_leading_blank_lines() {
        let model = CannedModel {
            response: "\n\nGOOGLE:rust tutorials".into(),
        };
        let line = Classifier::new(&model).classify("search rust tutorials").unwrap();
        assert_eq!(line, "GOOGLE:rust tutorials");
    }

    #[test]
    fn empty_response_is_an_error() {
        let model = CannedModel { response: "   \n ".into() };
        let result = Classifier::new(&model).classify("anything");
        assert!(matches!(result, Err(LlmError::ParseError { .. })));
    }

    #[test]
    fn prompt_embeds_the_utterance() {
        let prompt = build_prompt("take a screenshot");
        assert!(prompt.contains("User: \"take a screenshot\""));
    }
}
