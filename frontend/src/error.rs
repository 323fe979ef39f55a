use crate::entities::Id;

/// Failures surfaced by the dashboard core.
///
/// Errors are `Clone` because a single in-flight load hands its outcome to
/// every caller that awaited it.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum DashboardError {
    #[error("could not load {resource}: {cause}")]
    FetchFailed { resource: String, cause: String },

    #[error("stored value under {key:?} is unreadable")]
    StorageCorrupt { key: String },

    #[error("could not save {key:?}: {cause}")]
    StorageWriteFailed { key: String, cause: String },

    #[error("no entity with id {0}")]
    NotFound(Id),
}

/// Transport level failure reported by a [`crate::connection::FetchCollection`].
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Decode(String),
}

impl DashboardError {
    pub fn fetch_failed(resource: &str, cause: impl ToString) -> Self {
        DashboardError::FetchFailed {
            resource: resource.to_owned(),
            cause: cause.to_string(),
        }
    }
}
