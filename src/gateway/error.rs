//! Closed set of gateway failure kinds.
//!
//! Provider payloads are classified here, at the boundary. Nothing downstream inspects raw error
//! text.

/// Why a gateway operation failed.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// The provider refused the request on safety grounds. The reason is shown verbatim.
    #[error("request blocked by provider: {0}")]
    Blocked(String),
    /// The provider answered but without the expected payload.
    #[error("provider returned no {0}")]
    EmptyResponse(String),
    /// The provider answered with something that could not be understood.
    #[error("malformed provider response: {0}")]
    Malformed(String),
    /// Quota or capacity exhausted; recoverable through the manual fallback path.
    #[error("provider resources exhausted: {0}")]
    ResourceExhausted(String),
    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Provider message.
        message: String,
    },
    /// The request never completed (DNS, TLS, timeout, connection reset).
    #[error("transport failure: {0}")]
    Transport(String),
    /// A long-running operation finished with an error.
    #[error("operation failed: {0}")]
    Operation(String),
    /// A long-running operation did not finish within the poll budget.
    #[error("operation still running after {attempts} polls")]
    PollTimeout {
        /// Polls performed.
        attempts: u32,
    },
    /// No API key is configured.
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}

impl GatewayErrorKind {
    /// `true` for the recoverable quota/capacity condition.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }

    /// `true` for a provider safety refusal.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Classify a non-success HTTP response.
pub fn classify_http_failure(status: u16, body: &str) -> GatewayErrorKind {
    let (message, rpc_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (env.error.message, env.error.status),
        Err(_) => (body.trim().to_string(), String::new()),
    };
    if status == 429 || rpc_status == "RESOURCE_EXHAUSTED" || mentions_quota(&message) {
        return GatewayErrorKind::ResourceExhausted(message);
    }
    GatewayErrorKind::Http { status, message }
}

/// Classify the `error` object of a finished long-running operation.
///
/// `code` is the google.rpc status code (8 is `RESOURCE_EXHAUSTED`).
pub fn classify_operation_error(code: Option<i64>, message: &str) -> GatewayErrorKind {
    if code == Some(8) || mentions_quota(message) {
        return GatewayErrorKind::ResourceExhausted(message.to_string());
    }
    let lower = message.to_ascii_lowercase();
    if lower.contains("safety") || lower.contains("responsible ai") || lower.contains("blocked") {
        return GatewayErrorKind::Blocked(message.to_string());
    }
    GatewayErrorKind::Operation(message.to_string())
}

/// Classify a candidate finish reason; `None` when the reason is not a refusal.
pub fn classify_finish_reason(reason: &str) -> Option<GatewayErrorKind> {
    match reason {
        "SAFETY" | "PROHIBITED_CONTENT" | "IMAGE_SAFETY" | "BLOCKLIST" | "SPII" | "RECITATION" => {
            Some(GatewayErrorKind::Blocked(reason.to_string()))
        }
        _ => None,
    }
}

fn mentions_quota(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("resource_exhausted")
        || lower.contains("resource has been exhausted")
        || lower.contains("quota")
}

impl From<reqwest::Error> for GatewayErrorKind {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Malformed(e.to_string());
        }
        match e.status() {
            Some(status) => classify_http_failure(status.as_u16(), &e.to_string()),
            None => Self::Transport(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/error.rs"]
mod tests;
