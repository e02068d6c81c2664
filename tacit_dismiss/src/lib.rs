// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=tacit_dismiss --heading-base-level=0

//! Tacit Dismiss: close the right overlay when the user presses Escape or
//! clicks away.
//!
//! Overlays nest: a submenu inside a menu inside a dialog. Each
//! [`Dismissable`] joins a shared [`LayerRegistryHandle`] when activated, and
//! only the most recently activated layer reacts to Escape, click-outside,
//! scroll, resize, and focus-outside triggers. Closing the submenu with Escape
//! leaves the menu and the dialog open; the next Escape closes the menu.
//!
//! ## Registries
//!
//! With the `std` feature, [`Dismissable::new`] uses
//! [`LayerRegistryHandle::global`], one registry per thread shared by every
//! layer. Independent stacks (tests, separate roots) come from
//! [`create_layer_registry`].
//!
//! ## Minimal example
//!
//! ```rust
//! use tacit_dismiss::{DismissConfig, DismissReason, Dismissable, create_layer_registry};
//! use tacit_dom::memory::MemoryDom;
//! use tacit_dom::{Dom, Event, Key};
//!
//! let mut dom = MemoryDom::new();
//! let menu = dom.append(dom.body(), "div");
//! let submenu = dom.append(menu, "div");
//!
//! let registry = create_layer_registry();
//! let mut outer = Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), registry.clone());
//! let mut inner = Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), registry.clone());
//! outer.activate(menu, 0);
//! inner.activate(submenu, 0);
//!
//! let mut escape = Event::key_down(Key::Escape);
//! assert_eq!(outer.handle_event(&mut escape, &dom), None);
//! assert_eq!(inner.handle_event(&mut escape, &dom), Some(DismissReason::Escape));
//!
//! // The host closes the submenu; the menu is on top again.
//! inner.deactivate();
//! assert!(outer.is_top());
//! assert_eq!(registry.count(), 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables the per-thread global registry.
//! - `libm`: `no_std` builds via `tacit_dom/libm`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod dismissable;
mod registry;

pub use dismissable::{DismissConfig, DismissReason, Dismissable};
pub use registry::{LayerId, LayerRegistry, LayerRegistryHandle, create_layer_registry};
