// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport and boundary rectangles.

use kurbo::Rect;

use crate::Dom;

/// The layout viewport of `dom`.
pub fn viewport_rect<D: Dom>(dom: &D) -> Rect {
    dom.viewport()
}

/// The clipping boundary for floating content.
///
/// Uses the bounding rect of `boundary` when supplied, otherwise the viewport.
pub fn boundary_rect<D: Dom>(dom: &D, boundary: Option<D::Node>) -> Rect {
    match boundary {
        Some(node) => dom.bounding_rect(node),
        None => dom.viewport(),
    }
}

/// Shrink `rect` by `padding` on every edge.
///
/// The result is never inverted: if the padding exceeds half the size on an
/// axis, that axis collapses to its midpoint.
pub fn inset(rect: Rect, padding: f64) -> Rect {
    let padding = padding.max(0.0);
    let cx = (rect.x0 + rect.x1) * 0.5;
    let cy = (rect.y0 + rect.y1) * 0.5;
    Rect::new(
        (rect.x0 + padding).min(cx),
        (rect.y0 + padding).min(cy),
        (rect.x1 - padding).max(cx),
        (rect.y1 - padding).max(cy),
    )
}
