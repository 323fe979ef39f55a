//! Test doubles, compiled for this crate's tests and behind the
//! `test-support` feature for dependents.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use futures_channel::oneshot;
use futures_util::FutureExt;
use serde_json::Value;

use crate::connection::{FetchCollection, FetchFuture, ParentFilter};
use crate::error::FetchError;

/// Serves canned payloads and records every request. When gated, responses
/// are held back until [`FakeFetch::release`]. Unknown keys answer 404.
#[derive(Default)]
pub struct FakeFetch {
    responses: RefCell<HashMap<String, Result<Value, FetchError>>>,
    calls: RefCell<Vec<String>>,
    gated: Cell<bool>,
    gates: RefCell<Vec<oneshot::Sender<()>>>,
}

impl FakeFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(self) -> Self {
        self.gated.set(true);
        self
    }

    pub fn respond(&self, key: &str, payload: Value) {
        self.responses.borrow_mut().insert(key.to_owned(), Ok(payload));
    }

    pub fn fail(&self, key: &str, err: FetchError) {
        self.responses.borrow_mut().insert(key.to_owned(), Err(err));
    }

    /// Request keys in order, `resource` or `resource?field=id`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Lets every held response through.
    pub fn release(&self) {
        for gate in self.gates.borrow_mut().drain(..) {
            let _ = gate.send(());
        }
    }
}

impl FetchCollection for FakeFetch {
    fn fetch_collection(&self, resource: &str, filter: Option<ParentFilter>) -> FetchFuture {
        let key = match filter {
            Some(ParentFilter { field, id }) => format!("{}?{}={}", resource, field, id),
            None => resource.to_owned(),
        };
        self.calls.borrow_mut().push(key.clone());

        let response = self
            .responses
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)));

        let gate = if self.gated.get() {
            let (sender, receiver) = oneshot::channel();
            self.gates.borrow_mut().push(sender);
            Some(receiver)
        } else {
            None
        };

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            response
        }
        .boxed_local()
    }
}
