/*!
 * Listener Set
 * Ordered, identity-based listener registry for the dispatch loop
 */

use crate::ipc::core::traits::MessageListener;
use crate::ipc::core::types::{IpcError, IpcResult};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared listener handle; identity is the allocation, not the value
pub type ListenerRef = Arc<dyn MessageListener>;

#[inline]
fn same_listener(a: &ListenerRef, b: &ListenerRef) -> bool {
    // Compare data pointers only; vtable pointers may differ across codegen units
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Listeners in registration order
#[derive(Default)]
pub struct ListenerSet {
    inner: RwLock<Vec<ListenerRef>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `listener`; false if it is already registered
    pub fn add(&self, listener: ListenerRef) -> bool {
        let mut listeners = self.inner.write();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Remove `listener`, keeping the order of the rest
    pub fn remove(&self, listener: &ListenerRef) -> IpcResult<()> {
        let mut listeners = self.inner.write();
        let index = listeners
            .iter()
            .position(|l| same_listener(l, listener))
            .ok_or(IpcError::ListenerNotRegistered)?;
        listeners.remove(index);
        Ok(())
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn contains(&self, listener: &ListenerRef) -> bool {
        self.inner.read().iter().any(|l| same_listener(l, listener))
    }

    /// Copy of the current listeners
    ///
    /// Dispatch iterates the copy, so callbacks may mutate the set.
    pub fn snapshot(&self) -> Vec<ListenerRef> {
        self.inner.read().clone()
    }
}
