// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered stack of active dismissable layers.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

/// Identity of a layer within a [`LayerRegistry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// Active layers in activation order; the last one is the top.
///
/// A layer's index is always its position in the stack, so removing a layer
/// shifts the ones above it down.
#[derive(Clone, Debug, Default)]
pub struct LayerRegistry {
    next_id: u64,
    layers: Vec<LayerId>,
}

impl LayerRegistry {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            layers: Vec::new(),
        }
    }

    /// Mint a fresh identity. Not pushed.
    pub fn allocate(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Push `id` on top, moving it there if it is already present.
    pub fn push(&mut self, id: LayerId) {
        self.remove(id);
        self.layers.push(id);
    }

    /// Remove `id`. Returns `false` if it was not present.
    pub fn remove(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.layers.remove(i);
                true
            }
            None => false,
        }
    }

    /// The topmost layer.
    pub fn top(&self) -> Option<LayerId> {
        self.layers.last().copied()
    }

    /// Whether `id` is the topmost layer.
    pub fn is_top(&self, id: LayerId) -> bool {
        self.top() == Some(id)
    }

    /// Stack position of `id`, 0 being the bottom.
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|&l| l == id)
    }

    /// Number of active layers.
    pub fn count(&self) -> usize {
        self.layers.len()
    }

    /// Drop every layer. Identities stay unique.
    pub fn reset_all(&mut self) {
        self.layers.clear();
    }
}

/// Shared, single-threaded handle to a [`LayerRegistry`].
///
/// Every method borrows the registry only for its own duration, so callbacks
/// run by dismissable layers may freely call back into the registry.
#[derive(Clone, Debug, Default)]
pub struct LayerRegistryHandle(Rc<RefCell<LayerRegistry>>);

/// A fresh, empty registry, independent of [`LayerRegistryHandle::global`].
pub fn create_layer_registry() -> LayerRegistryHandle {
    LayerRegistryHandle::default()
}

#[cfg(feature = "std")]
std::thread_local! {
    static GLOBAL: LayerRegistryHandle = LayerRegistryHandle::default();
}

impl LayerRegistryHandle {
    /// The process-wide default registry (one per thread).
    #[cfg(feature = "std")]
    pub fn global() -> Self {
        GLOBAL.with(Clone::clone)
    }

    /// Whether both handles refer to the same registry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// See [`LayerRegistry::allocate`].
    pub fn allocate(&self) -> LayerId {
        self.0.borrow_mut().allocate()
    }

    /// See [`LayerRegistry::push`].
    pub fn push(&self, id: LayerId) {
        self.0.borrow_mut().push(id);
    }

    /// See [`LayerRegistry::remove`].
    pub fn remove(&self, id: LayerId) -> bool {
        self.0.borrow_mut().remove(id)
    }

    /// Like [`LayerRegistryHandle::remove`], but a no-op while the registry is
    /// borrowed elsewhere.
    pub(crate) fn try_remove(&self, id: LayerId) {
        if let Ok(mut registry) = self.0.try_borrow_mut() {
            registry.remove(id);
        }
    }

    /// See [`LayerRegistry::top`].
    pub fn top(&self) -> Option<LayerId> {
        self.0.borrow().top()
    }

    /// See [`LayerRegistry::is_top`].
    pub fn is_top(&self, id: LayerId) -> bool {
        self.0.borrow().is_top(id)
    }

    /// See [`LayerRegistry::index_of`].
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.0.borrow().index_of(id)
    }

    /// See [`LayerRegistry::count`].
    pub fn count(&self) -> usize {
        self.0.borrow().count()
    }

    /// See [`LayerRegistry::reset_all`].
    pub fn reset_all(&self) {
        self.0.borrow_mut().reset_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_order_and_removal() {
        let mut reg = LayerRegistry::new();
        let a = reg.allocate();
        let b = reg.allocate();
        let c = reg.allocate();
        reg.push(a);
        reg.push(b);
        reg.push(c);
        assert_eq!(reg.top(), Some(c));
        assert_eq!(reg.index_of(b), Some(1));

        assert!(reg.remove(b));
        assert!(!reg.remove(b));
        assert_eq!(reg.index_of(c), Some(1));
        assert!(reg.is_top(c));

        // Pushing again moves to the top.
        reg.push(a);
        assert_eq!(reg.top(), Some(a));
        assert_eq!(reg.count(), 2);

        reg.reset_all();
        assert_eq!(reg.count(), 0);
        assert_eq!(reg.top(), None);
        assert_ne!(reg.allocate(), c);
    }

    #[test]
    fn handles_share_state() {
        let reg = create_layer_registry();
        let other = reg.clone();
        let id = reg.allocate();
        reg.push(id);
        assert!(other.is_top(id));
        assert!(reg.ptr_eq(&other));
        assert!(!reg.ptr_eq(&create_layer_registry()));
    }

    #[cfg(feature = "std")]
    #[test]
    fn global_is_shared_per_thread() {
        let a = LayerRegistryHandle::global();
        let b = LayerRegistryHandle::global();
        assert!(a.ptr_eq(&b));
    }
}
