#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Document(#[from] mindweave_core::Error),
    #[error("store backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] mindweave_core::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no document is loaded")]
    NoDocument,
    #[error("module `{id}` was not found in the store")]
    ModuleNotFound { id: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;
