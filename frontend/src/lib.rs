// #SPC-dashboard
extern crate serde;
#[macro_use]
extern crate serde_derive;

pub mod collection_cache;
pub mod connection;
pub mod entities;
pub mod error;
pub mod favorites;
pub mod load_slot;
pub mod markup;
pub mod overlay;
pub mod persisted;
pub mod render;
pub mod router;
pub mod session;
pub mod sub_resource;
pub mod theme;
pub mod view_filter;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::connection::{FetchCollection, ParentFilter, DEFAULT_API_BASE};
pub use crate::entities::{Comment, Id, Post, PostDraft, PostPatch, User, UserPatch};
pub use crate::error::{DashboardError, FetchError};
pub use crate::persisted::{KeyValue, MemoryStore};
pub use crate::render::{Notify, Render, Severity, UiEvent};
pub use crate::router::View;
pub use crate::session::{Capabilities, LoadLimits, Session, SessionConfig};
