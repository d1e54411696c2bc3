use bon::Builder;

/// Prefix put in front of a stringified non-error payload.
pub const DEFAULT_MESSAGE_PREFIX: &str = "stringified error to: ";

/// Message used when a non-error payload has no usable string form.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "could not stringify error";

/// Configuration shared by [`TrySync`](crate::TrySync) and [`TryAsync`](crate::TryAsync).
#[derive(Debug, Clone, Builder)]
pub struct TryConfig {
    /// Optional name for the wrapped operation (e.g., "parse-manifest").
    /// If set, it is attached to every log event emitted for a failed call.
    pub label: Option<String>,

    /// Prefix for messages built from stringified non-error payloads.
    #[builder(default = DEFAULT_MESSAGE_PREFIX.to_string())]
    pub message_prefix: String,

    /// Message for non-error payloads that cannot be stringified.
    #[builder(default = DEFAULT_FALLBACK_MESSAGE.to_string())]
    pub fallback_message: String,
}

impl TryConfig {
    /// Get the label, defaulting to "anonymous".
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("anonymous")
    }
}

impl Default for TryConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
