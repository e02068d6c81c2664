// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Roving tabindex: one Tab stop per composite widget.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use tacit_dom::focusable::is_disabled_item;
use tacit_dom::{Dom, Event, Key};

/// Which arrow keys move the tab stop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// ArrowUp / ArrowDown.
    Vertical,
    /// ArrowLeft / ArrowRight.
    Horizontal,
    /// All four arrows.
    Both,
}

/// Configuration for [`RovingTabindex`].
pub struct RovingConfig<D: Dom> {
    /// Arrow keys that move between items. Defaults to [`Orientation::Vertical`].
    pub orientation: Orientation,
    /// Wrap from the last item to the first and back. Defaults to `true`.
    pub looping: bool,
    /// Handle Home and End. Defaults to `true`.
    pub home_end: bool,
    /// Override the disabled-item predicate.
    ///
    /// Defaults to [`is_disabled_item`]: the `disabled` property,
    /// `aria-disabled="true"`, or `data-disabled`.
    pub is_disabled: Option<Box<dyn Fn(&D, D::Node) -> bool>>,
    /// Called with the new index and item whenever the focused index changes.
    pub on_focus_change: Option<Box<dyn FnMut(usize, D::Node)>>,
    /// Called on Enter or Space with the focused index and item.
    pub on_activate: Option<Box<dyn FnMut(usize, D::Node)>>,
}

impl<D: Dom> Default for RovingConfig<D> {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            looping: true,
            home_end: true,
            is_disabled: None,
            on_focus_change: None,
            on_activate: None,
        }
    }
}

impl<D: Dom> fmt::Debug for RovingConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RovingConfig")
            .field("orientation", &self.orientation)
            .field("looping", &self.looping)
            .field("home_end", &self.home_end)
            .field("is_disabled", &self.is_disabled.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Copy, Clone)]
enum Step {
    Forward,
    Backward,
}

/// Single-tab-stop keyboard navigation over an ordered list of items.
///
/// Items live in slots. [`RovingTabindex::register_item`] with an explicit
/// index places an item at that slot, leaving empty slots in between, so items
/// that register out of order (for example after asynchronous rendering) still
/// end up in document order. Empty slots behave like disabled items.
///
/// After every mutation, exactly one enabled item carries `tabindex="0"`, the
/// focused item if it is enabled, otherwise the first enabled item. Every other
/// item carries `tabindex="-1"`. With no enabled items, none carries `0`.
pub struct RovingTabindex<D: Dom> {
    config: RovingConfig<D>,
    slots: Vec<Option<D::Node>>,
    focused: Option<usize>,
}

impl<D: Dom> fmt::Debug for RovingTabindex<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RovingTabindex")
            .field("config", &self.config)
            .field("slots", &self.slots)
            .field("focused", &self.focused)
            .finish()
    }
}

impl<D: Dom> RovingTabindex<D> {
    /// Create an empty roving group.
    pub fn new(config: RovingConfig<D>) -> Self {
        Self {
            config,
            slots: Vec::new(),
            focused: None,
        }
    }

    /// Number of slots, including empty ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slots exist.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered items in slot order.
    pub fn items(&self) -> impl Iterator<Item = D::Node> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// The slot index of `node`.
    pub fn index_of(&self, node: D::Node) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(node))
    }

    /// The focused index; `None` when nothing has been focused yet.
    pub fn focused_index(&self) -> Option<usize> {
        self.focused
    }

    /// The focused item.
    pub fn focused_item(&self) -> Option<D::Node> {
        self.focused.and_then(|i| self.slots.get(i).copied().flatten())
    }

    /// The index that currently carries `tabindex="0"`.
    pub fn tab_stop(&self, dom: &D) -> Option<usize> {
        self.focused
            .filter(|&i| self.is_enabled(dom, i))
            .or_else(|| (0..self.slots.len()).find(|&i| self.is_enabled(dom, i)))
    }

    /// Mutate the configuration in place.
    pub fn update_config(&mut self, dom: &mut D, f: impl FnOnce(&mut RovingConfig<D>)) {
        f(&mut self.config);
        self.sync_tab_indices(dom);
    }

    /// Register `node`, at slot `index` if given, otherwise at the end.
    ///
    /// Registering an item that is already present moves it. An explicit index
    /// that is already occupied inserts before the occupant.
    pub fn register_item(&mut self, dom: &mut D, node: D::Node, index: Option<usize>) {
        if let Some(existing) = self.index_of(node) {
            self.remove_slot(existing);
        }
        match index {
            None => self.slots.push(Some(node)),
            Some(i) if i >= self.slots.len() => {
                self.slots.resize(i, None);
                self.slots.push(Some(node));
            }
            Some(i) if self.slots[i].is_none() => self.slots[i] = Some(node),
            Some(i) => {
                self.slots.insert(i, Some(node));
                if let Some(f) = self.focused.as_mut()
                    && *f >= i
                {
                    *f += 1;
                }
            }
        }
        self.sync_tab_indices(dom);
    }

    /// Unregister `node`. Returns `false` if it was not registered.
    pub fn unregister_item(&mut self, dom: &mut D, node: D::Node) -> bool {
        let Some(i) = self.index_of(node) else {
            return false;
        };
        self.remove_slot(i);
        self.sync_tab_indices(dom);
        true
    }

    /// Make `index` the focused item, moving DOM focus to it when `focus` is set.
    ///
    /// Returns `false` (and changes nothing) for empty, disabled, or
    /// out-of-range slots.
    pub fn set_focused_index(&mut self, dom: &mut D, index: usize, focus: bool) -> bool {
        if !self.is_enabled(dom, index) {
            return false;
        }
        let Some(node) = self.slots[index] else {
            return false;
        };
        let changed = self.focused != Some(index);
        self.focused = Some(index);
        self.sync_tab_indices(dom);
        if focus {
            dom.focus(node);
        }
        if changed && let Some(cb) = self.config.on_focus_change.as_mut() {
            cb(index, node);
        }
        true
    }

    /// Move to the next enabled item.
    pub fn focus_next(&mut self, dom: &mut D) -> Option<usize> {
        self.step(dom, Step::Forward)
    }

    /// Move to the previous enabled item.
    pub fn focus_previous(&mut self, dom: &mut D) -> Option<usize> {
        self.step(dom, Step::Backward)
    }

    /// Move to the first enabled item.
    pub fn focus_first(&mut self, dom: &mut D) -> Option<usize> {
        let i = (0..self.slots.len()).find(|&i| self.is_enabled(dom, i))?;
        self.set_focused_index(dom, i, true).then_some(i)
    }

    /// Move to the last enabled item.
    pub fn focus_last(&mut self, dom: &mut D) -> Option<usize> {
        let i = (0..self.slots.len())
            .rev()
            .find(|&i| self.is_enabled(dom, i))?;
        self.set_focused_index(dom, i, true).then_some(i)
    }

    /// Handle a `keydown` forwarded from the widget.
    ///
    /// Returns `true` when the key was handled, in which case the event's
    /// default is prevented and its propagation stopped.
    pub fn handle_key_down(&mut self, dom: &mut D, event: &mut Event<D::Node>) -> bool {
        if event.propagation_stopped() || event.modifiers().is_chord() {
            return false;
        }
        let Some(key) = event.key() else {
            return false;
        };
        // Keep the index in sync with pointer- or script-driven focus.
        if let Some(i) = event.target.and_then(|t| self.index_of(t))
            && self.focused != Some(i)
            && self.is_enabled(dom, i)
        {
            self.focused = Some(i);
            self.sync_tab_indices(dom);
        }

        let vertical = matches!(
            self.config.orientation,
            Orientation::Vertical | Orientation::Both
        );
        let horizontal = matches!(
            self.config.orientation,
            Orientation::Horizontal | Orientation::Both
        );
        let handled = match key {
            Key::ArrowDown if vertical => {
                self.focus_next(dom);
                true
            }
            Key::ArrowUp if vertical => {
                self.focus_previous(dom);
                true
            }
            Key::ArrowRight if horizontal => {
                self.focus_next(dom);
                true
            }
            Key::ArrowLeft if horizontal => {
                self.focus_previous(dom);
                true
            }
            Key::Home if self.config.home_end => {
                self.focus_first(dom);
                true
            }
            Key::End if self.config.home_end => {
                self.focus_last(dom);
                true
            }
            Key::Enter | Key::SPACE => self.activate(dom),
            _ => false,
        };
        if handled {
            event.prevent_default();
            event.stop_propagation();
        }
        handled
    }

    /// Forget every item.
    pub fn destroy(&mut self) {
        self.slots.clear();
        self.focused = None;
    }

    fn activate(&mut self, dom: &D) -> bool {
        let Some(i) = self.tab_stop(dom) else {
            return false;
        };
        let Some(node) = self.slots[i] else {
            return false;
        };
        if let Some(cb) = self.config.on_activate.as_mut() {
            cb(i, node);
        }
        true
    }

    fn step(&mut self, dom: &mut D, step: Step) -> Option<usize> {
        // Nothing focused yet: the search starts before the first item.
        if self.focused.is_none() {
            return match step {
                Step::Forward => self.focus_first(dom),
                Step::Backward if self.config.looping => self.focus_last(dom),
                Step::Backward => None,
            };
        }
        let len = self.slots.len();
        let mut i = self.tab_stop(dom)?;
        for _ in 1..len {
            i = match step {
                Step::Forward if i + 1 < len => i + 1,
                Step::Forward if self.config.looping => 0,
                Step::Backward if i > 0 => i - 1,
                Step::Backward if self.config.looping => len - 1,
                // Boundary without looping: stay put.
                _ => return None,
            };
            if self.is_enabled(dom, i) {
                return self.set_focused_index(dom, i, true).then_some(i);
            }
        }
        None
    }

    fn is_enabled(&self, dom: &D, index: usize) -> bool {
        match self.slots.get(index).copied().flatten() {
            Some(node) => !self.is_disabled(dom, node),
            None => false,
        }
    }

    fn is_disabled(&self, dom: &D, node: D::Node) -> bool {
        match &self.config.is_disabled {
            Some(pred) => pred(dom, node),
            None => is_disabled_item(dom, node),
        }
    }

    fn remove_slot(&mut self, i: usize) {
        self.slots.remove(i);
        self.focused = match self.focused {
            Some(f) if f == i => None,
            Some(f) if f > i => Some(f - 1),
            other => other,
        };
    }

    fn sync_tab_indices(&self, dom: &mut D) {
        let stop = self.tab_stop(dom);
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(node) = *slot {
                dom.set_tab_index(node, if Some(i) == stop { 0 } else { -1 });
            }
        }
    }
}
