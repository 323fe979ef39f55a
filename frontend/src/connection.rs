use futures_util::future::LocalBoxFuture;
use serde_json::Value;

use crate::entities::{Entity, Id};
use crate::error::{DashboardError, FetchError};

pub const DEFAULT_API_BASE: &str = "https://jsonplaceholder.typicode.com";

/// Restricts a collection request to the dependents of one parent entity.
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentFilter {
    pub field: &'static str,
    pub id: Id,
}

impl ParentFilter {
    pub fn post(id: Id) -> Self {
        ParentFilter { field: "postId", id }
    }
}

pub type FetchFuture = LocalBoxFuture<'static, Result<Value, FetchError>>;

/// Read-only access to the remote collections.
///
/// Each call is one network request. The returned future owns everything it
/// needs so it can be parked in a shared pending load.
pub trait FetchCollection {
    fn fetch_collection(&self, resource: &str, filter: Option<ParentFilter>) -> FetchFuture;
}

pub fn collection_url(base: &str, resource: &str, filter: Option<ParentFilter>) -> String {
    let base = base.trim().trim_end_matches('/');
    match filter {
        Some(ParentFilter { field, id }) => format!("{}/{}?{}={}", base, resource, field, id),
        None => format!("{}/{}", base, resource),
    }
}

/// Decodes a fetched JSON array into entities of `T`.
pub fn decode_entities<T: Entity>(resource: &str, payload: Value) -> Result<Vec<T>, DashboardError> {
    serde_json::from_value(payload)
        .map_err(|err| DashboardError::fetch_failed(resource, FetchError::Decode(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Post;

    #[test]
    fn urls_are_built_from_the_base() {
        assert_eq!(
            collection_url("https://api.example.com/", "posts", None),
            "https://api.example.com/posts"
        );
        assert_eq!(
            collection_url(DEFAULT_API_BASE, "comments", Some(ParentFilter::post(4))),
            "https://jsonplaceholder.typicode.com/comments?postId=4"
        );
    }

    #[test]
    fn payload_that_is_not_a_list_is_a_fetch_failure() {
        let err = decode_entities::<Post>("posts", serde_json::json!({"id": 1})).unwrap_err();
        match err {
            DashboardError::FetchFailed { resource, .. } => assert_eq!(resource, "posts"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
