// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=tacit_position --heading-base-level=0

//! Tacit Position: place floating elements (menus, tooltips, popovers) next to
//! a reference element without leaving the viewport.
//!
//! - [`compute_position`] is the pure core: reference rect, floating size and
//!   boundary in, [`PositionResult`] out.
//! - [`Popover`] wires it to a host document through [`tacit_dom::Dom`], applies
//!   the result as a CSP-safe transform, and keeps it current while open.
//!
//! ## Collision handling
//!
//! The floating element first goes against the preferred [`Side`] with the
//! preferred [`Alignment`], `offset` pixels away. Then:
//!
//! 1. **Flip**: if that overflows the padded boundary, the opposite side is
//!    tried and adopted only when its total overflow is strictly smaller.
//! 2. **Shift**: overflow on the cross axis is removed by sliding along it, never
//!    pushing the element out of the opposite edge.
//!
//! The arrow offset always points at the reference center.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use tacit_dom::Dom;
//! use tacit_dom::memory::MemoryDom;
//! use tacit_position::{Popover, PopoverConfig};
//!
//! let mut dom = MemoryDom::new();
//! let button = dom.append(dom.body(), "button");
//! let menu = dom.append(dom.body(), "div");
//! dom.set_rect(button, Rect::new(100.0, 200.0, 200.0, 250.0));
//! dom.set_rect(menu, Rect::new(0.0, 0.0, 120.0, 80.0));
//!
//! let mut popover = Popover::new(PopoverConfig {
//!     flip: false,
//!     ..PopoverConfig::default()
//! });
//! popover.set_reference(Some(button));
//! popover.set_floating(&mut dom, Some(menu));
//!
//! let pos = popover.show(&mut dom).unwrap();
//! assert_eq!(pos.y, 258.0);
//! assert_eq!(dom.attribute(menu, "data-placement"), Some("bottom"));
//! ```
//!
//! ## Features
//!
//! - `std` (default): uses the Rust standard library.
//! - `libm`: `no_std` float support via `kurbo/libm`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod placement;
mod popover;

pub use placement::{
    Alignment, Overflow, Placement, PositionOptions, PositionResult, Side, compute_position,
};
pub use popover::{ABSOLUTE_CLASS, FIXED_CLASS, FLOATING_CLASS, Popover, PopoverConfig, Strategy};
