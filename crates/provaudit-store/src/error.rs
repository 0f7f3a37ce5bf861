use camino::Utf8PathBuf;

/// Fatal load failures: the document is unreadable or not the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while recording an audit decision.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The selected path has no `file`/`snippet` match; nothing was changed.
    #[error("no auditable match for '{path}'")]
    NoAuditableMatch { path: String },

    /// The decision is applied in memory but the document on disk is stale.
    #[error("decision recorded but not saved: {source}")]
    Persist {
        #[source]
        source: PersistError,
    },
}

/// Failures writing the result document back to its source path.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("serialize scan result: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
