// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=tacit_focus --heading-base-level=0

//! Tacit Focus: keyboard focus behaviors for composite widgets and overlays.
//!
//! - [`FocusTrap`] keeps focus inside a modal-like container: Tab and
//!   Shift+Tab wrap at the edges, focus that escapes is pulled back, and focus
//!   returns to where it came from on deactivation.
//! - [`RovingTabindex`] gives a composite widget (menu, toolbar, listbox) a
//!   single Tab stop and moves it with the arrow keys, Home, and End.
//! - [`Typeahead`] jumps to the item whose label starts with (or contains) what
//!   the user just typed.
//!
//! All three are plain state machines. They act on a host document through
//! [`tacit_dom::Dom`], react to events the host forwards, and take host
//! timestamps (milliseconds) wherever time matters.
//!
//! ## Minimal example
//!
//! A three-item menu with a roving tab stop:
//!
//! ```rust
//! use tacit_dom::memory::MemoryDom;
//! use tacit_dom::{Dom, Event, Key};
//! use tacit_focus::{RovingConfig, RovingTabindex};
//!
//! let mut dom = MemoryDom::new();
//! let menu = dom.append(dom.body(), "ul");
//! let items = [
//!     dom.append(menu, "li"),
//!     dom.append(menu, "li"),
//!     dom.append(menu, "li"),
//! ];
//!
//! let mut roving = RovingTabindex::new(RovingConfig::default());
//! for item in items {
//!     roving.register_item(&mut dom, item, None);
//! }
//!
//! // Only the first item is reachable with Tab.
//! assert_eq!(dom.tab_index(items[0]), Some(0));
//! assert_eq!(dom.tab_index(items[1]), Some(-1));
//!
//! // Tab lands on the first item; ArrowDown then moves the tab stop and focus.
//! dom.focus(items[0]);
//! let mut ev = Event::key_down(Key::ArrowDown).with_target(items[0]);
//! assert!(roving.handle_key_down(&mut dom, &mut ev));
//! assert!(ev.default_prevented());
//! assert_eq!(dom.active_element(), Some(items[1]));
//! assert_eq!(dom.tab_index(items[1]), Some(0));
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards `std` to `tacit_dom` and `tracing`.
//! - `libm`: `no_std` builds via `tacit_dom/libm`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod focus_trap;
mod roving;
mod typeahead;

pub use focus_trap::{FocusTarget, FocusTrap, FocusTrapConfig};
pub use roving::{Orientation, RovingConfig, RovingTabindex};
pub use typeahead::{MatchMode, TextItem, Typeahead, TypeaheadConfig, TypeaheadItem};

pub use tacit_dom::focusable::{
    get_first_focusable, get_focusable_elements, get_last_focusable, is_focusable,
};
