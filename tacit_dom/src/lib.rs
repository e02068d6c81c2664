// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=tacit_dom --heading-base-level=0

//! Tacit DOM: the host document boundary shared by every Tacit behavior.
//!
//! Tacit behaviors (focus traps, roving tabindex, popovers, dismissable layers,
//! live-region announcers) are headless state machines. They never own a
//! document; instead every operation that needs one takes a host value that
//! implements [`Dom`]. A browser host implements [`Dom`] over `web-sys`, while
//! tests and server-side hosts can use the bundled [`memory::MemoryDom`].
//!
//! This crate provides:
//!
//! - [`Dom`]: the element, layout, focus, and animation surface behaviors rely on.
//! - [`Event`]: a small event payload the host forwards into behaviors. Like the
//!   payloads in a responder chain, it carries `default_prevented` and
//!   `propagation_stopped` flags that handlers set and the host inspects.
//! - [`Timers`]: a deterministic timer queue driven by host timestamps. Behaviors
//!   schedule pending work here and the host calls their `advance` method.
//! - [`focusable`]: focusable-element querying.
//! - [`geometry`]: viewport and boundary rectangles.
//! - [`StyleApplier`]: applies a single visual property through the animation API
//!   rather than a `style` attribute, for hosts under a strict content-security policy.
//!
//! ## Minimal example
//!
//! ```rust
//! use tacit_dom::memory::MemoryDom;
//! use tacit_dom::{Dom, focusable};
//!
//! let mut dom = MemoryDom::new();
//! let dialog = dom.append(dom.body(), "div");
//! let ok = dom.append(dialog, "button");
//! let cancel = dom.append(dialog, "button");
//! dom.set_attribute(cancel, "disabled", "");
//!
//! // Disabled controls are not focusable.
//! assert_eq!(focusable::get_focusable_elements(&dom, dialog), vec![ok]);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo` and `tracing`.
//! - `libm`: enables `no_std` builds of `kurbo` that rely on `libm`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod dom;
mod event;
pub mod focusable;
pub mod geometry;
pub mod memory;
mod style;
mod timer;

pub use dom::{ComputedStyle, Dom};
pub use event::{Event, EventKind, Key, Modifiers};
pub use style::{ApplyOptions, Keyframe, StyleApplier};
pub use timer::{TimerId, Timers};
