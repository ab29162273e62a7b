//! Error types for synchro-model

/// A single entry failed validation.
///
/// `field` is a dotted path relative to the entry (`args[2]`, `env.API_KEY`);
/// it is empty when the problem concerns the entry as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}{reason}", field_prefix(.field))]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Error about the entry as a whole rather than one field.
    pub fn entry(reason: impl Into<String>) -> Self {
        Self::new(String::new(), reason)
    }

    /// Prefix the field path, used when an entry is nested under a name.
    pub fn within(mut self, parent: &str) -> Self {
        self.field = if self.field.is_empty() {
            parent.to_string()
        } else if self.field.starts_with('[') {
            format!("{parent}{}", self.field)
        } else {
            format!("{parent}.{}", self.field)
        };
        self
    }
}

fn field_prefix(field: &str) -> String {
    if field.is_empty() {
        String::new()
    } else {
        format!("{field}: ")
    }
}
