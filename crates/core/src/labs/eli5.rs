use crate::domain::message::Message;
use crate::llm::CompletionRequest;
use std::fmt;

pub const MAX_INPUT_LENGTH: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eli5InputError {
    Missing,
    TooLong,
}

impl fmt::Display for Eli5InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eli5InputError::Missing => f.write_str("Text input is required"),
            Eli5InputError::TooLong => write!(
                f,
                "Text is too long. Maximum {MAX_INPUT_LENGTH} characters allowed."
            ),
        }
    }
}

impl std::error::Error for Eli5InputError {}

/// Length is counted in UTF-16 code units, so characters outside the Basic
/// Multilingual Plane (most emoji) count twice.
pub fn validate_input(text: Option<&str>) -> Result<&str, Eli5InputError> {
    match text {
        None | Some("") => Err(Eli5InputError::Missing),
        Some(t) if t.encode_utf16().count() > MAX_INPUT_LENGTH => Err(Eli5InputError::TooLong),
        Some(t) => Ok(t),
    }
}

pub const SYSTEM_PROMPT: &str = "You are an expert at explaining complex topics to 5-year-olds using only emojis and simple words.

Rules:
1. Use LOTS of emojis (🍎📱💰🏠🚗) to make it fun and visual
2. Use only simple words a 5-year-old would understand
3. Break complex ideas into tiny, digestible steps
4. Use analogies with everyday things (toys, food, games, family)
5. Make it a story or narrative when possible
6. Keep sentences short and punchy (max 15 words per sentence)
7. Add \"But if...\" scenarios to show edge cases or risks
8. Use \"Imagine...\" to help visualize concepts
9. End with a simple summary using the 🎯 emoji

Write a flowing narrative, not bullet points. Make it engaging and fun to read!

Example style:
\"Imagine you have 10 cookies 🍪. Your friend wants to borrow 5 cookies and promises to give you back 6 cookies tomorrow. That's like lending! 💰 You give something now, and get back MORE later. But if your friend eats all the cookies and can't give them back, you lose your cookies! 😢 That's the risk of lending.\"";

pub fn user_message(text: &str) -> Message {
    Message::user(format!("Explain this like I'm 5 years old: {text}"))
}

pub fn completion_request(text: &str) -> CompletionRequest {
    CompletionRequest::new(SYSTEM_PROMPT, vec![user_message(text)])
}
