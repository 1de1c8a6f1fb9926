//! Error types for Harmonic.

use std::fmt;

use thiserror::Error;

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Track,
    Version,
    Checkpoint,
    Comment,
    Collaborator,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Project => "project",
            EntityKind::Track => "track",
            EntityKind::Version => "version",
            EntityKind::Checkpoint => "checkpoint",
            EntityKind::Comment => "comment",
            EntityKind::Collaborator => "collaborator",
        };
        f.write_str(name)
    }
}

/// Main error type for Harmonic operations.
#[derive(Error, Debug)]
pub enum HarmonicError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HarmonicError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable reason code.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::NotFound { kind, .. } => match kind {
                EntityKind::Project => "project_not_found",
                EntityKind::Track => "track_not_found",
                EntityKind::Version => "version_not_found",
                EntityKind::Checkpoint => "checkpoint_not_found",
                EntityKind::Comment => "comment_not_found",
                EntityKind::Collaborator => "collaborator_not_found",
            },
            Self::Validation(_) => "invalid_input",
            Self::Invariant(_) => "invariant_violated",
            Self::Audio(_) => "audio_failure",
            Self::Decode(_) => "decode_failure",
            Self::Serialization(_) => "serialization_failure",
            Self::Config(_) => "invalid_config",
        }
    }

    /// Whether this is a lookup miss rather than a real failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for Harmonic operations.
pub type Result<T> = std::result::Result<T, HarmonicError>;
