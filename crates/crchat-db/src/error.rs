use thiserror::Error;

/// Failures while loading or persisting a document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {resource}: {source}")]
    Json {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted document breaks a structural invariant. Not recoverable
    /// within a request; the document is left untouched.
    #[error("corrupted document {resource}: {reason}")]
    Corrupt { resource: String, reason: String },

    #[error("lock poisoned on {0}")]
    LockPoisoned(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
