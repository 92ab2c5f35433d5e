//! Persistence error types

/// Errors raised by the view-state store and its backends.
///
/// The controller never propagates these: a failing store degrades the grid
/// to session-only state.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// SQLite backend failure.
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend is not reachable at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
