// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focusable-element querying.
//!
//! An element is *focusable* when it is interactive, not disabled, and visibly
//! rendered:
//!
//! - Interactive: `a[href]`, `area[href]`, `button`, `input` (except
//!   `type="hidden"`), `select`, `textarea`, `iframe`, `object`, `embed`,
//!   `summary`, `audio[controls]`, `video[controls]`, `[contenteditable]` (unless
//!   `"false"`), or anything with a `tabindex` other than `-1`.
//! - Not disabled: form controls without the `disabled` attribute.
//! - Visible: computed style is neither `display: none` nor `visibility: hidden`,
//!   and the element has an offset parent or is `position: fixed`.

use alloc::vec::Vec;

use crate::Dom;

/// Focusable descendants of `container` in document order.
pub fn get_focusable_elements<D: Dom>(dom: &D, container: D::Node) -> Vec<D::Node> {
    dom.descendants(container)
        .into_iter()
        .filter(|&n| is_focusable(dom, n))
        .collect()
}

/// First focusable descendant of `container`.
pub fn get_first_focusable<D: Dom>(dom: &D, container: D::Node) -> Option<D::Node> {
    dom.descendants(container)
        .into_iter()
        .find(|&n| is_focusable(dom, n))
}

/// Last focusable descendant of `container`.
pub fn get_last_focusable<D: Dom>(dom: &D, container: D::Node) -> Option<D::Node> {
    dom.descendants(container)
        .into_iter()
        .rev()
        .find(|&n| is_focusable(dom, n))
}

/// Whether `node` is interactive, enabled, and visible.
pub fn is_focusable<D: Dom>(dom: &D, node: D::Node) -> bool {
    is_interactive(dom, node) && is_visible(dom, node)
}

/// Whether `node` is rendered.
pub fn is_visible<D: Dom>(dom: &D, node: D::Node) -> bool {
    let style = dom.computed_style(node);
    if style.display_none || style.visibility_hidden {
        return false;
    }
    dom.has_offset_parent(node) || style.position_fixed
}

/// Whether a composite-widget item should be skipped by keyboard navigation.
///
/// True for the `disabled` property, `aria-disabled="true"`, or a
/// `data-disabled` attribute.
pub fn is_disabled_item<D: Dom>(dom: &D, node: D::Node) -> bool {
    dom.is_disabled(node)
        || dom.attribute(node, "aria-disabled") == Some("true")
        || dom.has_attribute(node, "data-disabled")
}

fn is_interactive<D: Dom>(dom: &D, node: D::Node) -> bool {
    let native = match dom.tag_name(node) {
        "a" | "area" => dom.has_attribute(node, "href"),
        "button" | "select" | "textarea" => !dom.is_disabled(node),
        "input" => !dom.is_disabled(node) && dom.attribute(node, "type") != Some("hidden"),
        "iframe" | "object" | "embed" | "summary" => true,
        "audio" | "video" => dom.has_attribute(node, "controls"),
        _ => false,
    };
    if native {
        return true;
    }
    if dom
        .attribute(node, "contenteditable")
        .is_some_and(|v| v != "false")
    {
        return true;
    }
    // `[tabindex]:not([tabindex="-1"])`, except on disabled form controls.
    match dom.attribute(node, "tabindex") {
        Some(v) if v.trim() != "-1" => !is_disabled_control(dom, node),
        _ => false,
    }
}

fn is_disabled_control<D: Dom>(dom: &D, node: D::Node) -> bool {
    matches!(
        dom.tag_name(node),
        "button" | "input" | "select" | "textarea"
    ) && dom.is_disabled(node)
}
