use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const NAME_MAX: usize = 100;
pub const SUBJECT_MAX: usize = 200;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 5000;

/// A contact-form submission as posted by the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    /// Locale of the page the form was posted from; picks the acknowledgment language.
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl ContactRequest {
    /// Collects every field problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
        });

        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "required"));
        } else if name.chars().count() > NAME_MAX {
            errors.push(FieldError::new("name", format!("at most {NAME_MAX} characters")));
        }

        if !EMAIL.is_match(self.email.trim()) {
            errors.push(FieldError::new("email", "invalid email address"));
        }

        if let Some(subject) = &self.subject {
            if subject.trim().chars().count() > SUBJECT_MAX {
                errors.push(FieldError::new(
                    "subject",
                    format!("at most {SUBJECT_MAX} characters"),
                ));
            }
        }

        let len = self.message.trim().chars().count();
        if len < MESSAGE_MIN {
            errors.push(FieldError::new(
                "message",
                format!("at least {MESSAGE_MIN} characters"),
            ));
        } else if len > MESSAGE_MAX {
            errors.push(FieldError::new(
                "message",
                format!("at most {MESSAGE_MAX} characters"),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload accepted by the email-sending collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}
