// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSP-safe style application.
//!
//! A strict content-security policy (`style-src` without `'unsafe-inline'`)
//! rejects `style` attributes, so behaviors that must move an element apply the
//! value through the host's animation API instead: a zero-duration animation
//! that holds a single keyframe with `fill: forwards`.

use alloc::string::String;
use core::fmt;

use hashbrown::HashMap;

use crate::Dom;

/// A single visual property held by an animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keyframe {
    /// CSS property name, for example `transform`.
    pub property: String,
    /// CSS value.
    pub value: String,
}

impl Keyframe {
    /// A keyframe for an arbitrary property.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// A `transform` keyframe.
    pub fn transform(value: impl Into<String>) -> Self {
        Self::new("transform", value)
    }

    /// `transform: translate3d(x px, y px, 0)`.
    pub fn translate(x: f64, y: f64) -> Self {
        Self::transform(alloc::format!("translate3d({x}px, {y}px, 0)"))
    }
}

/// Animation timing used when applying a keyframe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Duration in milliseconds. Zero applies the value immediately.
    pub duration_ms: u64,
    /// Keep the final keyframe after the animation ends (`fill: forwards`).
    pub fill_forwards: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            duration_ms: 0,
            fill_forwards: true,
        }
    }
}

/// Applies keyframes through the animation API, one live animation per element.
///
/// The applier keeps a side table from element to the animation it created.
/// Applying again to the same element updates that animation in place rather
/// than stacking a new one. Entries hold only the host's node handle, never the
/// element itself, and are dropped by [`StyleApplier::release`] or
/// [`StyleApplier::clear`].
pub struct StyleApplier<D: Dom> {
    effects: HashMap<D::Node, D::Animation>,
}

impl<D: Dom> fmt::Debug for StyleApplier<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleApplier")
            .field("effects", &self.effects.len())
            .finish()
    }
}

impl<D: Dom> Default for StyleApplier<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dom> StyleApplier<D> {
    /// Create an applier with an empty cache.
    pub fn new() -> Self {
        Self {
            effects: HashMap::new(),
        }
    }

    /// Apply `keyframe` to `node`.
    ///
    /// Returns the animation holding the value, or `None` if the host has no
    /// animation API (in which case nothing happens).
    pub fn apply(
        &mut self,
        dom: &mut D,
        node: D::Node,
        keyframe: &Keyframe,
        options: &ApplyOptions,
    ) -> Option<D::Animation> {
        if let Some(&existing) = self.effects.get(&node) {
            if dom.update_animation(existing, keyframe) {
                return Some(existing);
            }
            // The host dropped it (for example the element was re-rendered).
            self.effects.remove(&node);
        }
        let Some(animation) = dom.animate(node, keyframe, options) else {
            tracing::trace!(?node, "animation API unavailable; style not applied");
            return None;
        };
        self.effects.insert(node, animation);
        Some(animation)
    }

    /// The animation currently held for `node`.
    pub fn effect(&self, node: D::Node) -> Option<D::Animation> {
        self.effects.get(&node).copied()
    }

    /// Cancel and forget the animation for `node`.
    pub fn release(&mut self, dom: &mut D, node: D::Node) {
        if let Some(animation) = self.effects.remove(&node) {
            dom.cancel_animation(animation);
        }
    }

    /// Cancel and forget every cached animation.
    pub fn clear(&mut self, dom: &mut D) {
        for (_, animation) in self.effects.drain() {
            dom.cancel_animation(animation);
        }
    }

    /// Number of cached animations.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    #[test]
    fn repeated_apply_updates_in_place() {
        let mut dom = MemoryDom::new();
        let el = dom.append(dom.body(), "div");
        let mut applier = StyleApplier::new();

        let first = applier.apply(
            &mut dom,
            el,
            &Keyframe::translate(1.0, 2.0),
            &ApplyOptions::default(),
        );
        let second = applier.apply(
            &mut dom,
            el,
            &Keyframe::translate(3.0, 4.0),
            &ApplyOptions::default(),
        );

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(dom.live_animation_count(), 1);
        assert_eq!(
            dom.applied_keyframe(el),
            Some(&Keyframe::transform("translate3d(3px, 4px, 0)"))
        );
        // Never through the style attribute.
        assert_eq!(dom.attribute(el, "style"), None);
    }

    #[test]
    fn unsupported_hosts_degrade_to_noop() {
        let mut dom = MemoryDom::new();
        dom.set_animations_supported(false);
        let el = dom.append(dom.body(), "div");
        let mut applier = StyleApplier::new();

        let res = applier.apply(
            &mut dom,
            el,
            &Keyframe::translate(1.0, 2.0),
            &ApplyOptions::default(),
        );
        assert_eq!(res, None);
        assert!(applier.is_empty());
        assert_eq!(dom.applied_keyframe(el), None);
    }

    #[test]
    fn host_dropped_animation_is_recreated() {
        let mut dom = MemoryDom::new();
        let el = dom.append(dom.body(), "div");
        let mut applier = StyleApplier::new();
        let opts = ApplyOptions::default();

        let first = applier
            .apply(&mut dom, el, &Keyframe::translate(0.0, 0.0), &opts)
            .unwrap();
        dom.cancel_animation(first);
        let second = applier
            .apply(&mut dom, el, &Keyframe::translate(5.0, 5.0), &opts)
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(applier.effect(el), Some(second));
    }

    #[test]
    fn release_and_clear_cancel_effects() {
        let mut dom = MemoryDom::new();
        let a = dom.append(dom.body(), "div");
        let b = dom.append(dom.body(), "div");
        let mut applier = StyleApplier::new();
        let opts = ApplyOptions::default();
        applier.apply(&mut dom, a, &Keyframe::translate(0.0, 0.0), &opts);
        applier.apply(&mut dom, b, &Keyframe::translate(0.0, 0.0), &opts);
        assert_eq!(applier.len(), 2);

        applier.release(&mut dom, a);
        assert_eq!(applier.effect(a), None);
        assert_eq!(dom.applied_keyframe(a), None);
        assert_eq!(dom.live_animation_count(), 1);

        applier.clear(&mut dom);
        assert!(applier.is_empty());
        assert_eq!(dom.live_animation_count(), 0);
    }
}
