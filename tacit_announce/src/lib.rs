// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=tacit_announce --heading-base-level=0

//! Tacit Announce: tell screen reader users what just happened.
//!
//! [`LiveRegionAnnouncer`] owns two visually hidden ARIA live regions, one
//! polite and one assertive, and feeds them one message at a time:
//!
//! - Pending messages are drained highest [`AnnounceOptions::priority`] first;
//!   equal priorities keep their order.
//! - Each message is written after a short settle delay into a freshly cleared
//!   region, so repeating the same text is still announced.
//! - The region is blanked again after `clear_delay_ms`, and the next message
//!   waits `announcement_delay_ms`.
//!
//! Time is driven by the host through [`LiveRegionAnnouncer::advance`].
//!
//! ## Minimal example
//!
//! ```rust
//! use tacit_announce::{AnnounceOptions, AnnouncerConfig, LiveRegionAnnouncer, Politeness};
//! use tacit_dom::Dom;
//! use tacit_dom::memory::MemoryDom;
//!
//! let mut dom = MemoryDom::new();
//! let mut announcer = LiveRegionAnnouncer::new(AnnouncerConfig::default());
//!
//! announcer.announce(&mut dom, "Draft saved", AnnounceOptions::default(), 0);
//! announcer.announce(
//!     &mut dom,
//!     "Connection lost",
//!     AnnounceOptions { priority: 10, ..AnnounceOptions::default() },
//!     0,
//! );
//!
//! // Processing starts on the next tick and the settle delay is 50 ms.
//! announcer.advance(50, &mut dom);
//! let polite = announcer.region(Politeness::Polite).unwrap();
//! assert_eq!(dom.text_content(polite), "Connection lost");
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

mod announcer;

pub use announcer::{
    AnnounceOptions, Announcement, AnnouncerConfig, LiveRegionAnnouncer, Politeness,
    SETTLE_DELAY_MS, VISUALLY_HIDDEN_CLASS,
};
