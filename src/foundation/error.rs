use crate::compose::state::ComposeFailure;
use crate::gateway::error::GatewayErrorKind;

/// Convenience result type used across adreel.
pub type AdreelResult<T> = Result<T, AdreelError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum AdreelError {
    /// Invalid user-provided input, configuration values or state transitions.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while probing, decoding or encoding media through the ffmpeg toolchain.
    #[error("media error: {0}")]
    Media(String),

    /// Composition aborted. No output was produced.
    #[error("composition error: {0}")]
    Compose(ComposeFailure),

    /// Classified failure at the generative-media gateway boundary.
    #[error("gateway error: {0}")]
    Gateway(GatewayErrorKind),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdreelError {
    /// Build a [`AdreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`AdreelError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`AdreelError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Return the gateway error kind, if this is a gateway failure.
    pub fn gateway_kind(&self) -> Option<&GatewayErrorKind> {
        match self {
            Self::Gateway(kind) => Some(kind),
            _ => None,
        }
    }

    /// Return the compositor failure, if this is a composition failure.
    pub fn compose_failure(&self) -> Option<&ComposeFailure> {
        match self {
            Self::Compose(f) => Some(f),
            _ => None,
        }
    }
}

impl From<ComposeFailure> for AdreelError {
    fn from(f: ComposeFailure) -> Self {
        Self::Compose(f)
    }
}

impl From<GatewayErrorKind> for AdreelError {
    fn from(kind: GatewayErrorKind) -> Self {
        Self::Gateway(kind)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
