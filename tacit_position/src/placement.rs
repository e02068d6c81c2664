// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement types and the pure positioning computation.

use core::fmt;

use kurbo::{Rect, Size};
use tacit_dom::geometry::inset;

/// The edge of the reference element the floating element sits against.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    /// Above the reference.
    Top,
    /// Below the reference.
    #[default]
    Bottom,
    /// Left of the reference.
    Left,
    /// Right of the reference.
    Right,
}

impl Side {
    /// The side across the reference.
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Whether the main axis is vertical (top or bottom).
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Cross-axis alignment against the reference.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Leading edges line up.
    Start,
    /// Centers line up.
    #[default]
    Center,
    /// Trailing edges line up.
    End,
}

/// A side plus an alignment, written `bottom`, `bottom-start`, `left-end`, ...
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Main-axis side.
    pub side: Side,
    /// Cross-axis alignment.
    pub alignment: Alignment,
}

impl Placement {
    /// Centered on `side`.
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            alignment: Alignment::Center,
        }
    }

    /// Replace the alignment.
    #[must_use]
    pub const fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Same alignment on the opposite side.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            side: self.side.opposite(),
            ..self
        }
    }

    /// Parse the `data-placement` notation. `-center` is accepted but optional.
    pub fn parse(s: &str) -> Option<Self> {
        let (side, alignment) = match s.split_once('-') {
            Some((side, align)) => (side, Some(align)),
            None => (s, None),
        };
        let side = match side {
            "top" => Side::Top,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            "right" => Side::Right,
            _ => return None,
        };
        let alignment = match alignment {
            None | Some("center") => Alignment::Center,
            Some("start") => Alignment::Start,
            Some("end") => Alignment::End,
            Some(_) => return None,
        };
        Some(Self { side, alignment })
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.side.as_str())?;
        match self.alignment {
            Alignment::Start => f.write_str("-start"),
            Alignment::Center => Ok(()),
            Alignment::End => f.write_str("-end"),
        }
    }
}

/// Options for [`compute_position`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionOptions {
    /// Preferred placement.
    pub placement: Placement,
    /// Gap between reference and floating element on the main axis.
    pub offset: f64,
    /// Try the opposite side when the preferred one overflows.
    pub flip: bool,
    /// Slide along the cross axis to stay inside the boundary.
    pub shift: bool,
    /// Inner padding applied to the boundary before collision checks.
    pub padding: f64,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            placement: Placement::new(Side::Bottom),
            offset: 8.0,
            flip: true,
            shift: true,
            padding: 8.0,
        }
    }
}

/// Where the floating element goes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionResult {
    /// Left edge of the floating element.
    pub x: f64,
    /// Top edge of the floating element.
    pub y: f64,
    /// The placement actually used.
    pub placement: Placement,
    /// Position of the reference center along the cross axis, relative to the
    /// floating element's leading edge and clamped to its extent.
    pub arrow: f64,
    /// The opposite side was adopted.
    pub flipped: bool,
    /// The cross axis was adjusted to stay in bounds.
    pub shifted: bool,
}

/// Positive overflow past each boundary edge.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Overflow {
    /// Past the top edge.
    pub top: f64,
    /// Past the bottom edge.
    pub bottom: f64,
    /// Past the left edge.
    pub left: f64,
    /// Past the right edge.
    pub right: f64,
}

impl Overflow {
    /// How far `rect` reaches outside `bounds` on each edge; zero when inside.
    pub fn of(rect: Rect, bounds: Rect) -> Self {
        Self {
            top: (bounds.y0 - rect.y0).max(0.0),
            bottom: (rect.y1 - bounds.y1).max(0.0),
            left: (bounds.x0 - rect.x0).max(0.0),
            right: (rect.x1 - bounds.x1).max(0.0),
        }
    }

    /// Sum of all four edges.
    pub fn total(&self) -> f64 {
        self.top + self.bottom + self.left + self.right
    }
}

/// Place a floating element of `floating` size next to `reference` inside
/// `boundary`.
///
/// Deterministic: the same inputs always produce the same result.
pub fn compute_position(
    reference: Rect,
    floating: Size,
    boundary: Rect,
    options: &PositionOptions,
) -> PositionResult {
    let bounds = inset(boundary, options.padding);
    let mut placement = options.placement;
    let (mut x, mut y) = base_position(reference, floating, placement, options.offset);
    let mut flipped = false;

    let overflow = Overflow::of(Rect::from_origin_size((x, y), floating), bounds).total();
    if options.flip && overflow > 0.0 {
        let candidate = placement.flipped();
        let (cx, cy) = base_position(reference, floating, candidate, options.offset);
        let candidate_overflow =
            Overflow::of(Rect::from_origin_size((cx, cy), floating), bounds).total();
        // Ties keep the preferred side.
        if candidate_overflow < overflow {
            tracing::trace!(from = %placement, to = %candidate, "flip adopted");
            placement = candidate;
            (x, y) = (cx, cy);
            flipped = true;
        }
    }

    let mut shifted = false;
    if options.shift {
        if placement.side.is_vertical() {
            let nx = shift_axis(x, floating.width, bounds.x0, bounds.x1);
            shifted = nx != x;
            x = nx;
        } else {
            let ny = shift_axis(y, floating.height, bounds.y0, bounds.y1);
            shifted = ny != y;
            y = ny;
        }
    }

    let center = reference.center();
    let arrow = if placement.side.is_vertical() {
        (center.x - x).max(0.0).min(floating.width)
    } else {
        (center.y - y).max(0.0).min(floating.height)
    };

    PositionResult {
        x,
        y,
        placement,
        arrow,
        flipped,
        shifted,
    }
}

/// Adjacent to `side`, aligned on the cross axis, `offset` away.
fn base_position(reference: Rect, floating: Size, placement: Placement, offset: f64) -> (f64, f64) {
    let cross = |start: f64, end: f64, extent: f64| match placement.alignment {
        Alignment::Start => start,
        Alignment::Center => (start + end - extent) * 0.5,
        Alignment::End => end - extent,
    };
    match placement.side {
        Side::Bottom => (
            cross(reference.x0, reference.x1, floating.width),
            reference.y1 + offset,
        ),
        Side::Top => (
            cross(reference.x0, reference.x1, floating.width),
            reference.y0 - offset - floating.height,
        ),
        Side::Right => (
            reference.x1 + offset,
            cross(reference.y0, reference.y1, floating.height),
        ),
        Side::Left => (
            reference.x0 - offset - floating.width,
            cross(reference.y0, reference.y1, floating.height),
        ),
    }
}

/// Clamp a leading edge into `[lo, hi - extent]`, favoring `lo` when the
/// element is larger than the range so a shift never creates overflow on the
/// opposite edge.
fn shift_axis(pos: f64, extent: f64, lo: f64, hi: f64) -> f64 {
    if pos < lo {
        lo
    } else if pos + extent > hi {
        (hi - extent).max(lo)
    } else {
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1024.0, 768.0);

    fn options(placement: Placement) -> PositionOptions {
        PositionOptions {
            placement,
            ..PositionOptions::default()
        }
    }

    #[test]
    fn bottom_offset_is_exact() {
        let reference = Rect::new(100.0, 200.0, 200.0, 250.0);
        let opts = PositionOptions {
            flip: false,
            ..PositionOptions::default()
        };
        let res = compute_position(reference, Size::new(80.0, 40.0), VIEWPORT, &opts);
        assert_eq!(res.y, 258.0);
        assert_eq!(res.x, 110.0);
        assert_eq!(res.placement, Placement::new(Side::Bottom));
        assert!(!res.flipped);
        assert!(!res.shifted);
        assert_eq!(res.arrow, 40.0);
    }

    #[test]
    fn sides_and_alignments() {
        let reference = Rect::new(400.0, 300.0, 500.0, 340.0);
        let size = Size::new(60.0, 20.0);
        let at = |p: Placement| {
            let r = compute_position(reference, size, VIEWPORT, &options(p));
            (r.x, r.y)
        };
        assert_eq!(at(Placement::new(Side::Top)), (420.0, 272.0));
        assert_eq!(
            at(Placement::new(Side::Top).with_alignment(Alignment::Start)),
            (400.0, 272.0)
        );
        assert_eq!(
            at(Placement::new(Side::Bottom).with_alignment(Alignment::End)),
            (440.0, 348.0)
        );
        assert_eq!(at(Placement::new(Side::Right)), (508.0, 310.0));
        assert_eq!(at(Placement::new(Side::Left)), (332.0, 310.0));
    }

    #[test]
    fn flips_when_the_opposite_side_fits_better() {
        // Reference near the bottom edge; 200px tall popover cannot fit below.
        let reference = Rect::new(100.0, 650.0, 200.0, 690.0);
        let size = Size::new(100.0, 200.0);
        let res = compute_position(reference, size, VIEWPORT, &PositionOptions::default());
        assert!(res.flipped);
        assert_eq!(res.placement.side, Side::Top);
        assert_eq!(res.y, 650.0 - 8.0 - 200.0);

        let base = Overflow::of(
            Rect::from_origin_size((100.0, 698.0), size),
            inset(VIEWPORT, 8.0),
        );
        let adopted = Overflow::of(
            Rect::from_origin_size((res.x, res.y), size),
            inset(VIEWPORT, 8.0),
        );
        assert!(adopted.total() < base.total());
    }

    #[test]
    fn flip_disabled_keeps_placement() {
        let reference = Rect::new(100.0, 650.0, 200.0, 690.0);
        let opts = PositionOptions {
            flip: false,
            ..PositionOptions::default()
        };
        let res = compute_position(reference, Size::new(100.0, 200.0), VIEWPORT, &opts);
        assert!(!res.flipped);
        assert_eq!(res.placement.side, Side::Bottom);
    }

    #[test]
    fn flip_ties_keep_the_preferred_side() {
        // Too tall for either side by the same amount.
        let viewport = Rect::new(0.0, 0.0, 400.0, 400.0);
        let reference = Rect::new(100.0, 180.0, 200.0, 220.0);
        let res = compute_position(
            reference,
            Size::new(50.0, 300.0),
            viewport,
            &PositionOptions::default(),
        );
        assert!(!res.flipped);
        assert_eq!(res.placement.side, Side::Bottom);
    }

    #[test]
    fn shift_stays_inside_padding() {
        let size = Size::new(120.0, 30.0);
        // Reference hugging the left edge.
        let res = compute_position(
            Rect::new(0.0, 100.0, 40.0, 120.0),
            size,
            VIEWPORT,
            &PositionOptions::default(),
        );
        assert!(res.shifted);
        assert_eq!(res.x, 8.0);
        // Arrow still points at the reference center.
        assert_eq!(res.arrow, 12.0);

        // And the right edge.
        let res = compute_position(
            Rect::new(1000.0, 100.0, 1024.0, 120.0),
            size,
            VIEWPORT,
            &PositionOptions::default(),
        );
        assert!(res.shifted);
        assert_eq!(res.x + size.width, 1016.0);

        let no_shift = PositionOptions {
            shift: false,
            ..PositionOptions::default()
        };
        let res = compute_position(Rect::new(0.0, 100.0, 40.0, 120.0), size, VIEWPORT, &no_shift);
        assert!(!res.shifted);
        assert_eq!(res.x, -40.0);
    }

    #[test]
    fn shift_never_overflows_the_opposite_edge() {
        let viewport = Rect::new(0.0, 0.0, 200.0, 600.0);
        // Wider than the padded boundary.
        let size = Size::new(300.0, 30.0);
        for x0 in [0.0, 50.0, 150.0, 190.0] {
            let reference = Rect::new(x0, 100.0, x0 + 10.0, 120.0);
            let res = compute_position(reference, size, viewport, &PositionOptions::default());
            assert_eq!(res.x, 8.0, "leading edge pinned for reference at {x0}");
        }

        // Vertical cross axis for left/right placements.
        let res = compute_position(
            Rect::new(300.0, 740.0, 340.0, 768.0),
            Size::new(60.0, 100.0),
            VIEWPORT,
            &options(Placement::new(Side::Right)),
        );
        assert!(res.shifted);
        assert_eq!(res.y, 768.0 - 8.0 - 100.0);
    }

    #[test]
    fn placement_notation() {
        for s in ["top", "bottom-start", "left-end", "right"] {
            assert_eq!(Placement::parse(s).map(|p| p.to_string()).as_deref(), Some(s));
        }
        assert_eq!(
            Placement::parse("top-center"),
            Some(Placement::new(Side::Top))
        );
        assert_eq!(Placement::parse("middle"), None);
        assert_eq!(Placement::parse("top-left"), None);
    }
}
