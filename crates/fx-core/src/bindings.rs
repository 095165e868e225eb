use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fnv::FnvHashSet;

use crate::error::FxError;

type LiveSet = RefCell<FnvHashSet<String>>;

/// Tracks which canvases have a live effect. Owned by the host-side factory;
/// clones share the same set.
#[derive(Clone, Debug, Default)]
pub struct BindingRegistry {
    live: Rc<LiveSet>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key` until the returned guard is dropped.
    pub fn claim(&self, key: &str) -> Result<BindingGuard, FxError> {
        if !self.live.borrow_mut().insert(key.to_string()) {
            return Err(FxError::AlreadyBound(key.to_string()));
        }
        log::debug!("canvas `{key}` bound");
        Ok(BindingGuard {
            key: key.to_string(),
            live: Rc::downgrade(&self.live),
        })
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.live.borrow().contains(key)
    }

    pub fn len(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.borrow().is_empty()
    }
}

#[derive(Debug)]
pub struct BindingGuard {
    key: String,
    live: Weak<LiveSet>,
}

impl BindingGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for BindingGuard {
    fn drop(&mut self) {
        if let Some(live) = self.live.upgrade() {
            live.borrow_mut().remove(&self.key);
            log::debug!("canvas `{}` released", self.key);
        }
    }
}
