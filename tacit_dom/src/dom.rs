// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host document trait.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Rect;

use crate::style::{ApplyOptions, Keyframe};

/// The subset of an element's computed style that behaviors consult.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    /// `display: none`.
    pub display_none: bool,
    /// `visibility: hidden` (or `collapse`).
    pub visibility_hidden: bool,
    /// `position: fixed`.
    pub position_fixed: bool,
}

/// A host document.
///
/// Behaviors read and mutate the document only through this trait. Node handles
/// are small copyable identifiers owned by the host; behaviors store them but
/// never assume anything about their lifetime beyond [`Dom::is_connected`].
///
/// Methods take node handles by value. Passing a stale handle is never an
/// error: getters return neutral values (`None`, empty, [`Rect::ZERO`]) and
/// setters do nothing.
///
/// Rectangles are in viewport coordinates, as returned by
/// `getBoundingClientRect`.
pub trait Dom {
    /// Element handle.
    type Node: Copy + Eq + Hash + Debug;
    /// Handle to a running animation created by [`Dom::animate`].
    type Animation: Copy + Eq + Debug;

    /// The document body, used as the default container for injected nodes.
    fn body(&self) -> Self::Node;

    /// Parent element, if any.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Children in document order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Whether `node` is attached to the document.
    fn is_connected(&self, node: Self::Node) -> bool;

    /// Create a detached element with the given tag name.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Append `child` to `parent`, detaching it from any previous parent.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Detach `node` (and its subtree) from the document.
    fn remove(&mut self, node: Self::Node);

    /// Lowercase tag name.
    fn tag_name(&self, node: Self::Node) -> &str;

    /// Attribute value.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Set an attribute.
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Remove an attribute.
    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    /// Whether the class list contains `class`.
    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    /// Add `class` to the class list.
    fn add_class(&mut self, node: Self::Node, class: &str);

    /// Remove `class` from the class list.
    fn remove_class(&mut self, node: Self::Node, class: &str);

    /// Concatenated text of the node and its descendants.
    fn text_content(&self, node: Self::Node) -> String;

    /// Replace the node's children with a single text run.
    fn set_text_content(&mut self, node: Self::Node, text: &str);

    /// Whether `node` matches a CSS selector. Unsupported selectors never match.
    fn matches(&self, node: Self::Node, selector: &str) -> bool;

    /// Border-box rectangle in viewport coordinates.
    fn bounding_rect(&self, node: Self::Node) -> Rect;

    /// The layout viewport, `(0, 0, innerWidth, innerHeight)`.
    fn viewport(&self) -> Rect;

    /// Computed style of `node`.
    fn computed_style(&self, node: Self::Node) -> ComputedStyle;

    /// Whether `offsetParent` is non-null.
    fn has_offset_parent(&self, node: Self::Node) -> bool;

    /// Currently focused element.
    fn active_element(&self) -> Option<Self::Node>;

    /// Move focus to `node`.
    fn focus(&mut self, node: Self::Node);

    /// Start an animation holding `keyframe` on `node`.
    ///
    /// Returns `None` when the host has no animation API.
    fn animate(
        &mut self,
        node: Self::Node,
        keyframe: &Keyframe,
        options: &ApplyOptions,
    ) -> Option<Self::Animation>;

    /// Replace the keyframe of a running animation.
    ///
    /// Returns `false` if the animation no longer exists.
    fn update_animation(&mut self, animation: Self::Animation, keyframe: &Keyframe) -> bool;

    /// Cancel an animation, removing its effect.
    fn cancel_animation(&mut self, animation: Self::Animation);

    /// All descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.children(root);
        stack.reverse();
        while let Some(node) = stack.pop() {
            out.push(node);
            let children = self.children(node);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Whether the attribute is present.
    fn has_attribute(&self, node: Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// First descendant of `root` matching `selector`.
    fn query_selector(&self, root: Self::Node, selector: &str) -> Option<Self::Node> {
        self.descendants(root)
            .into_iter()
            .find(|&n| self.matches(n, selector))
    }

    /// Add or remove `class`.
    fn toggle_class(&mut self, node: Self::Node, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    /// Parsed `tabindex` attribute.
    fn tab_index(&self, node: Self::Node) -> Option<i32> {
        self.attribute(node, "tabindex")
            .and_then(|v| v.trim().parse().ok())
    }

    /// Set the `tabindex` attribute.
    fn set_tab_index(&mut self, node: Self::Node, index: i32) {
        let value = alloc::format!("{index}");
        self.set_attribute(node, "tabindex", &value);
    }

    /// The `disabled` property of form controls.
    fn is_disabled(&self, node: Self::Node) -> bool {
        self.has_attribute(node, "disabled")
    }
}
