// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory document for tests and headless hosts.
//!
//! [`MemoryDom`] keeps a generational slot arena of elements, each with a tag,
//! attributes, classes, text, a fixed bounding rectangle, and a computed style.
//! There is no layout: callers place elements with [`MemoryDom::set_rect`].
//!
//! Focus follows the browser rule that only connected elements can be focused.
//! The animation API records keyframes per element and can be switched off with
//! [`MemoryDom::set_animations_supported`] to exercise degraded hosts.
//!
//! [`Dom::matches`] understands compound selectors built from a tag name, `*`,
//! `#id`, `.class`, `[attr]` and `[attr=value]` (quoted or bare), joined by
//! commas. Combinators and pseudo-classes never match.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::Rect;
use smallvec::SmallVec;

use crate::style::{ApplyOptions, Keyframe};
use crate::{ComputedStyle, Dom};

/// Identifier for an element in a [`MemoryDom`] (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for an animation in a [`MemoryDom`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AnimationId(u32);

#[derive(Clone, Debug)]
struct Element {
    generation: u32,
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: SmallVec<[(String, String); 4]>,
    classes: SmallVec<[String; 4]>,
    text: String,
    rect: Rect,
    style: ComputedStyle,
}

#[derive(Clone, Debug)]
struct AnimationSlot {
    node: NodeId,
    keyframe: Keyframe,
    options: ApplyOptions,
    live: bool,
}

/// In-memory [`Dom`] implementation.
#[derive(Clone, Debug)]
pub struct MemoryDom {
    elements: Vec<Option<Element>>,
    // Last generation per slot (persists across frees).
    generations: Vec<u32>,
    free_list: Vec<usize>,
    body: NodeId,
    viewport: Rect,
    active: Option<NodeId>,
    animations_supported: bool,
    animations: Vec<AnimationSlot>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Create a document with an empty body and a 1024×768 viewport.
    pub fn new() -> Self {
        let mut dom = Self {
            elements: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            body: NodeId::new(0, 0),
            viewport: Rect::new(0.0, 0.0, 1024.0, 768.0),
            active: None,
            animations_supported: true,
            animations: Vec::new(),
        };
        dom.body = dom.alloc("body");
        dom
    }

    /// Create an element and append it to `parent`.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.alloc(tag);
        self.append_child(parent, node);
        node
    }

    /// Remove `node` and its subtree and free their slots. Stale ids stay invalid.
    pub fn destroy(&mut self, node: NodeId) {
        if node == self.body || self.get(node).is_none() {
            return;
        }
        self.detach(node);
        let mut stack = alloc::vec![node];
        while let Some(n) = stack.pop() {
            let idx = n.idx();
            if let Some(el) = self.elements[idx].take() {
                stack.extend(el.children);
                self.free_list.push(idx);
            }
            if self.active == Some(n) {
                self.active = None;
            }
        }
    }

    /// Whether `node` refers to a live element.
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    /// Set the bounding rectangle reported for `node`.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(el) = self.get_mut(node) {
            el.rect = rect;
        }
    }

    /// Set the computed style reported for `node`.
    pub fn set_style(&mut self, node: NodeId, style: ComputedStyle) {
        if let Some(el) = self.get_mut(node) {
            el.style = style;
        }
    }

    /// Set the viewport rectangle.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Clear focus, as `document.activeElement.blur()` would.
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Toggle support for the animation API.
    pub fn set_animations_supported(&mut self, supported: bool) {
        self.animations_supported = supported;
    }

    /// Number of animations that have not been canceled.
    pub fn live_animation_count(&self) -> usize {
        self.animations.iter().filter(|a| a.live).count()
    }

    /// The keyframe currently held on `node` by its most recent live animation.
    pub fn applied_keyframe(&self, node: NodeId) -> Option<&Keyframe> {
        self.animations
            .iter()
            .rev()
            .find(|a| a.live && a.node == node)
            .map(|a| &a.keyframe)
    }

    /// Options the most recent live animation on `node` was created with.
    pub fn applied_options(&self, node: NodeId) -> Option<ApplyOptions> {
        self.animations
            .iter()
            .rev()
            .find(|a| a.live && a.node == node)
            .map(|a| a.options)
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let element = |generation| Element {
            generation,
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: SmallVec::new(),
            classes: SmallVec::new(),
            text: String::new(),
            rect: Rect::ZERO,
            style: ComputedStyle::default(),
        };
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].wrapping_add(1);
            self.generations[idx] = generation;
            self.elements[idx] = Some(element(generation));
            NodeId::new(idx as u32, generation)
        } else {
            let idx = self.elements.len();
            self.elements.push(Some(element(1)));
            self.generations.push(1);
            NodeId::new(idx as u32, 1)
        }
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements
            .get(node.idx())?
            .as_ref()
            .filter(|el| el.generation == node.1)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements
            .get_mut(node.idx())?
            .as_mut()
            .filter(|el| el.generation == node.1)
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.get(node).and_then(|el| el.parent) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != node);
        }
        if let Some(el) = self.get_mut(node) {
            el.parent = None;
        }
    }

    fn matches_compound(&self, el: &Element, sel: &str) -> bool {
        let mut rest = sel;
        // Leading tag name or universal selector.
        let tag_len = rest
            .find(|c: char| matches!(c, '#' | '.' | '['))
            .unwrap_or(rest.len());
        let (tag, tail) = rest.split_at(tag_len);
        if !tag.is_empty() && tag != "*" && !tag.eq_ignore_ascii_case(&el.tag) {
            return false;
        }
        rest = tail;
        while let Some(c) = rest.chars().next() {
            match c {
                '#' | '.' => {
                    let body = &rest[1..];
                    let end = body
                        .find(|c: char| matches!(c, '#' | '.' | '['))
                        .unwrap_or(body.len());
                    let name = &body[..end];
                    if name.is_empty() {
                        return false;
                    }
                    let ok = if c == '#' {
                        attr(el, "id") == Some(name)
                    } else {
                        el.classes.iter().any(|cl| cl == name)
                    };
                    if !ok {
                        return false;
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let Some(close) = rest.find(']') else {
                        return false;
                    };
                    let inner = rest[1..close].trim();
                    let ok = match inner.split_once('=') {
                        Some((name, value)) => {
                            let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
                            attr(el, name.trim()) == Some(value)
                        }
                        None => !inner.is_empty() && attr(el, inner).is_some(),
                    };
                    if !ok {
                        return false;
                    }
                    rest = &rest[close + 1..];
                }
                _ => return false,
            }
        }
        true
    }
}

fn attr<'a>(el: &'a Element, name: &str) -> Option<&'a str> {
    el.attributes
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

impl Dom for MemoryDom {
    type Node = NodeId;
    type Animation = AnimationId;

    fn body(&self) -> NodeId {
        self.body
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.is_alive(node) && self.contains(self.body, node)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        // Refuse to create cycles.
        if self.contains(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        self.detach(node);
        if self.active.is_some_and(|a| self.contains(node, a)) {
            self.active = None;
        }
    }

    fn tag_name(&self, node: NodeId) -> &str {
        self.get(node).map(|el| el.tag.as_str()).unwrap_or("")
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        attr(self.get(node)?, name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.get_mut(node) else {
            return;
        };
        if name.eq_ignore_ascii_case("class") {
            el.classes = value.split_whitespace().map(ToString::to_string).collect();
        }
        match el
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => el
                .attributes
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.get_mut(node) {
            el.attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            if name.eq_ignore_ascii_case("class") {
                el.classes.clear();
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.get_mut(node)
            && !el.classes.iter().any(|c| c == class)
        {
            el.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.get_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(el) = self.get(node) {
            out.push_str(&el.text);
        }
        for d in self.descendants(node) {
            if let Some(el) = self.get(d) {
                out.push_str(&el.text);
            }
        }
        out
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if self.get(node).is_none() {
            return;
        }
        for child in self.children(node) {
            self.destroy(child);
        }
        if let Some(el) = self.get_mut(node) {
            el.text.clear();
            el.text.push_str(text);
        }
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        let Some(el) = self.get(node) else {
            return false;
        };
        selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == ':'))
            .any(|s| self.matches_compound(el, s))
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.get(node).map(|el| el.rect).unwrap_or(Rect::ZERO)
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.get(node).map(|el| el.style).unwrap_or_default()
    }

    fn has_offset_parent(&self, node: NodeId) -> bool {
        if node == self.body || !self.is_connected(node) {
            return false;
        }
        if self.computed_style(node).position_fixed {
            return false;
        }
        let mut cur = Some(node);
        while let Some(n) = cur {
            if self.computed_style(n).display_none {
                return false;
            }
            cur = self.parent(n);
        }
        true
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    fn focus(&mut self, node: NodeId) {
        if self.is_connected(node) {
            self.active = Some(node);
        }
    }

    fn animate(
        &mut self,
        node: NodeId,
        keyframe: &Keyframe,
        options: &ApplyOptions,
    ) -> Option<AnimationId> {
        if !self.animations_supported || !self.is_alive(node) {
            return None;
        }
        let id = AnimationId(self.animations.len() as u32);
        self.animations.push(AnimationSlot {
            node,
            keyframe: keyframe.clone(),
            options: *options,
            live: true,
        });
        Some(id)
    }

    fn update_animation(&mut self, animation: AnimationId, keyframe: &Keyframe) -> bool {
        match self.animations.get_mut(animation.0 as usize) {
            Some(slot) if slot.live => {
                slot.keyframe = keyframe.clone();
                true
            }
            _ => false,
        }
    }

    fn cancel_animation(&mut self, animation: AnimationId) {
        if let Some(slot) = self.animations.get_mut(animation.0 as usize) {
            slot.live = false;
        }
    }
}
