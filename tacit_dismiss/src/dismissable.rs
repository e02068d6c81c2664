// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use core::fmt;

use smallvec::SmallVec;
use tacit_dom::{Dom, Event, EventKind, Key, Timers};

use crate::registry::{LayerId, LayerRegistryHandle};

/// Why a layer was dismissed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// Escape was pressed.
    Escape,
    /// A pointer went down outside the layer.
    ClickOutside,
    /// Something outside the layer scrolled.
    ScrollOutside,
    /// The window was resized.
    Resize,
    /// Focus moved outside the layer.
    FocusOutside,
    /// [`Dismissable::dismiss`] was called.
    Programmatic,
}

/// Configuration for [`Dismissable`].
pub struct DismissConfig {
    /// Dismiss on Escape. Defaults to `true`.
    pub escape: bool,
    /// Dismiss on pointer-down outside. Defaults to `true`.
    pub click_outside: bool,
    /// Dismiss when something outside scrolls. Defaults to `false`.
    pub scroll_outside: bool,
    /// Dismiss on window resize. Defaults to `false`.
    pub resize: bool,
    /// Dismiss when focus moves outside. Defaults to `false`.
    pub focus_outside: bool,
    /// Veto hook. Returning `false` keeps the layer and skips `on_dismiss`.
    pub on_before_dismiss: Option<Box<dyn FnMut(DismissReason) -> bool>>,
    /// Called once per honored dismissal.
    pub on_dismiss: Option<Box<dyn FnMut(DismissReason)>>,
    /// Called after the layer joins the stack.
    pub on_activate: Option<Box<dyn FnMut()>>,
    /// Called after the layer leaves the stack.
    pub on_deactivate: Option<Box<dyn FnMut()>>,
}

impl Default for DismissConfig {
    fn default() -> Self {
        Self {
            escape: true,
            click_outside: true,
            scroll_outside: false,
            resize: false,
            focus_outside: false,
            on_before_dismiss: None,
            on_dismiss: None,
            on_activate: None,
            on_deactivate: None,
        }
    }
}

impl fmt::Debug for DismissConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissConfig")
            .field("escape", &self.escape)
            .field("click_outside", &self.click_outside)
            .field("scroll_outside", &self.scroll_outside)
            .field("resize", &self.resize)
            .field("focus_outside", &self.focus_outside)
            .finish_non_exhaustive()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DismissTimer {
    ArmClickOutside,
}

/// One dismissable layer (menu, dialog, popover) in a [`LayerRegistryHandle`].
///
/// While active the layer sits in the registry; the most recently activated
/// layer is on top, and only the top layer acts on forwarded events. A layer
/// that dismisses marks the event (`stop_propagation`, plus `prevent_default`
/// for Escape), and every layer ignores already-stopped events, so the host may
/// forward each event to all its layers in any order.
///
/// Dismissal only reports: the layer stays active until the host calls
/// [`Dismissable::deactivate`], typically after closing the UI.
///
/// Dropping the handle removes its layer from the registry.
pub struct Dismissable<D: Dom> {
    config: DismissConfig,
    registry: LayerRegistryHandle,
    id: LayerId,
    target: Option<D::Node>,
    excludes: SmallVec<[D::Node; 4]>,
    timers: Timers<DismissTimer>,
    click_outside_armed: bool,
}

impl<D: Dom> fmt::Debug for Dismissable<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dismissable")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("id", &self.id)
            .field("target", &self.target)
            .field("excludes", &self.excludes)
            .field("timers", &self.timers.len())
            .field("click_outside_armed", &self.click_outside_armed)
            .finish()
    }
}

impl<D: Dom> Dismissable<D> {
    /// A layer in the thread's default registry.
    #[cfg(feature = "std")]
    pub fn new(config: DismissConfig) -> Self {
        Self::with_registry(config, LayerRegistryHandle::global())
    }

    /// A layer in `registry`.
    pub fn with_registry(config: DismissConfig, registry: LayerRegistryHandle) -> Self {
        let id = registry.allocate();
        Self {
            config,
            registry,
            id,
            target: None,
            excludes: SmallVec::new(),
            timers: Timers::new(),
            click_outside_armed: false,
        }
    }

    /// This layer's identity in its registry.
    pub fn layer_id(&self) -> LayerId {
        self.id
    }

    /// The registry this layer joins.
    pub fn registry(&self) -> &LayerRegistryHandle {
        &self.registry
    }

    /// The dismissable element while active.
    pub fn target(&self) -> Option<D::Node> {
        self.target
    }

    /// Whether the layer is in the registry.
    pub fn is_active(&self) -> bool {
        self.registry.index_of(self.id).is_some()
    }

    /// Whether this is the topmost layer.
    pub fn is_top(&self) -> bool {
        self.registry.is_top(self.id)
    }

    /// Join the top of the stack with `target` as the inside element.
    ///
    /// Click-outside is armed on the next [`Dismissable::advance`] so the click
    /// that opened the layer cannot dismiss it. Activating an active layer
    /// deactivates it first.
    pub fn activate(&mut self, target: D::Node, now: u64) {
        if self.is_active() {
            self.deactivate();
        }
        self.target = Some(target);
        self.click_outside_armed = false;
        if self.config.click_outside {
            self.timers.schedule(now, 0, DismissTimer::ArmClickOutside);
        }
        self.registry.push(self.id);
        tracing::debug!(layer = ?self.id, ?target, "layer activated");
        if let Some(cb) = self.config.on_activate.as_mut() {
            cb();
        }
    }

    /// Leave the stack and cancel pending timers. No-op when inactive.
    pub fn deactivate(&mut self) {
        if !self.registry.remove(self.id) {
            return;
        }
        self.timers.clear();
        self.click_outside_armed = false;
        self.target = None;
        tracing::debug!(layer = ?self.id, "layer deactivated");
        if let Some(cb) = self.config.on_deactivate.as_mut() {
            cb();
        }
    }

    /// Mutate the configuration. An active layer is reactivated so the new
    /// triggers take effect, which also brings it to the top.
    pub fn update_config(&mut self, now: u64, f: impl FnOnce(&mut DismissConfig)) {
        f(&mut self.config);
        if let Some(target) = self.target
            && self.is_active()
        {
            self.deactivate();
            self.activate(target, now);
        }
    }

    /// Treat `node` as inside the layer for outside checks.
    pub fn add_exclude(&mut self, node: D::Node) {
        if !self.excludes.contains(&node) {
            self.excludes.push(node);
        }
    }

    /// Undo [`Dismissable::add_exclude`]. Returns `false` if `node` was not excluded.
    pub fn remove_exclude(&mut self, node: D::Node) -> bool {
        match self.excludes.iter().position(|&n| n == node) {
            Some(i) => {
                self.excludes.remove(i);
                true
            }
            None => false,
        }
    }

    /// Deactivate and forget the target and excluded elements.
    pub fn destroy(&mut self) {
        self.deactivate();
        self.timers.clear();
        self.target = None;
        self.excludes.clear();
    }

    /// Fire due timers.
    pub fn advance(&mut self, now: u64) {
        while let Some((_, timer)) = self.timers.pop_due(now) {
            match timer {
                DismissTimer::ArmClickOutside => self.click_outside_armed = true,
            }
        }
    }

    /// The next time [`Dismissable::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Dismiss now, regardless of stack position.
    ///
    /// Still consults `on_before_dismiss`. Returns whether the dismissal was
    /// honored; always `false` when inactive.
    pub fn dismiss(&mut self) -> bool {
        self.is_active() && self.try_dismiss(DismissReason::Programmatic)
    }

    /// Handle a forwarded event.
    ///
    /// Returns the reason when the event dismissed this layer.
    pub fn handle_event(&mut self, event: &mut Event<D::Node>, dom: &D) -> Option<DismissReason> {
        if event.propagation_stopped() {
            return None;
        }
        let target = self.target?;
        if !self.registry.is_top(self.id) {
            return None;
        }
        let outside = |dom: &D| match event.target {
            Some(t) => !self.is_inside(dom, target, t),
            // Document-level events come from outside every element.
            None => true,
        };
        let reason = match event.kind {
            EventKind::KeyDown {
                key: Key::Escape, ..
            } if self.config.escape => DismissReason::Escape,
            EventKind::PointerDown
                if self.config.click_outside && self.click_outside_armed && outside(dom) =>
            {
                DismissReason::ClickOutside
            }
            EventKind::Scroll if self.config.scroll_outside && outside(dom) => {
                DismissReason::ScrollOutside
            }
            EventKind::Resize if self.config.resize => DismissReason::Resize,
            EventKind::FocusIn
                if self.config.focus_outside && event.target.is_some() && outside(dom) =>
            {
                DismissReason::FocusOutside
            }
            _ => return None,
        };
        if !self.try_dismiss(reason) {
            return None;
        }
        if reason == DismissReason::Escape {
            event.prevent_default();
        }
        event.stop_propagation();
        Some(reason)
    }

    fn is_inside(&self, dom: &D, target: D::Node, node: D::Node) -> bool {
        dom.contains(target, node) || self.excludes.iter().any(|&e| dom.contains(e, node))
    }

    fn try_dismiss(&mut self, reason: DismissReason) -> bool {
        if let Some(cb) = self.config.on_before_dismiss.as_mut()
            && !cb(reason)
        {
            tracing::trace!(layer = ?self.id, ?reason, "dismissal suppressed");
            return false;
        }
        tracing::debug!(layer = ?self.id, ?reason, "layer dismissed");
        if let Some(cb) = self.config.on_dismiss.as_mut() {
            cb(reason);
        }
        true
    }
}

impl<D: Dom> Drop for Dismissable<D> {
    fn drop(&mut self) {
        self.registry.try_remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::create_layer_registry;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use tacit_dom::memory::{MemoryDom, NodeId};

    type Log = Rc<RefCell<Vec<(&'static str, DismissReason)>>>;

    fn logging(name: &'static str, log: &Log) -> DismissConfig {
        let log = log.clone();
        DismissConfig {
            on_dismiss: Some(Box::new(move |r| log.borrow_mut().push((name, r)))),
            ..DismissConfig::default()
        }
    }

    fn escape() -> Event<NodeId> {
        Event::key_down(Key::Escape)
    }

    #[test]
    fn only_the_top_layer_reacts_to_escape() {
        let mut dom = MemoryDom::new();
        let a_el = dom.append(dom.body(), "div");
        let b_el = dom.append(a_el, "div");
        let reg = create_layer_registry();
        let log = Log::default();
        let mut a = Dismissable::<MemoryDom>::with_registry(logging("a", &log), reg.clone());
        let mut b = Dismissable::<MemoryDom>::with_registry(logging("b", &log), reg.clone());
        a.activate(a_el, 0);
        b.activate(b_el, 0);
        assert_eq!(reg.count(), 2);
        assert_eq!(reg.index_of(a.layer_id()), Some(0));
        assert_eq!(reg.index_of(b.layer_id()), Some(1));
        assert!(b.is_top());

        // Bottom-up forwarding.
        let mut ev = escape();
        assert_eq!(a.handle_event(&mut ev, &dom), None);
        assert_eq!(b.handle_event(&mut ev, &dom), Some(DismissReason::Escape));
        assert!(ev.default_prevented());
        b.deactivate();
        assert_eq!(reg.count(), 1);
        assert!(a.is_top());

        // Top-down forwarding after B closed: A is now on top.
        let mut ev = escape();
        assert_eq!(b.handle_event(&mut ev, &dom), None);
        assert_eq!(a.handle_event(&mut ev, &dom), Some(DismissReason::Escape));

        assert_eq!(
            *log.borrow(),
            [("b", DismissReason::Escape), ("a", DismissReason::Escape)]
        );
    }

    #[test]
    fn stopped_events_reach_no_other_layer() {
        let mut dom = MemoryDom::new();
        let a_el = dom.append(dom.body(), "div");
        let b_el = dom.append(dom.body(), "div");
        let reg = create_layer_registry();
        let log = Log::default();
        let mut a = Dismissable::<MemoryDom>::with_registry(logging("a", &log), reg.clone());
        let mut b = Dismissable::<MemoryDom>::with_registry(logging("b", &log), reg);
        a.activate(a_el, 0);
        b.activate(b_el, 0);

        let mut ev = escape();
        b.handle_event(&mut ev, &dom);
        // A is on top now, but B already consumed this event.
        b.deactivate();
        assert_eq!(a.handle_event(&mut ev, &dom), None);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn escape_dismisses_once() {
        let mut dom = MemoryDom::new();
        let el = dom.append(dom.body(), "div");
        let log = Log::default();
        let mut layer =
            Dismissable::<MemoryDom>::with_registry(logging("x", &log), create_layer_registry());
        layer.activate(el, 0);
        let mut ev = escape();
        layer.handle_event(&mut ev, &dom);
        layer.handle_event(&mut ev, &dom);
        assert_eq!(*log.borrow(), [("x", DismissReason::Escape)]);
    }

    #[test]
    fn click_outside_is_deferred_and_respects_excludes() {
        let mut dom = MemoryDom::new();
        let trigger = dom.append(dom.body(), "button");
        let menu = dom.append(dom.body(), "div");
        let item = dom.append(menu, "button");
        let elsewhere = dom.append(dom.body(), "p");
        let mut layer =
            Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), create_layer_registry());
        layer.add_exclude(trigger);
        layer.activate(menu, 100);

        // The opening click is still being dispatched.
        let mut ev = Event::pointer_down(elsewhere);
        assert_eq!(layer.handle_event(&mut ev, &dom), None);

        assert_eq!(layer.next_deadline(), Some(100));
        layer.advance(100);
        let mut ev = Event::pointer_down(item);
        assert_eq!(layer.handle_event(&mut ev, &dom), None);
        let mut ev = Event::pointer_down(trigger);
        assert_eq!(layer.handle_event(&mut ev, &dom), None);

        assert!(layer.remove_exclude(trigger));
        assert!(!layer.remove_exclude(trigger));
        let mut ev = Event::pointer_down(trigger);
        assert_eq!(
            layer.handle_event(&mut ev, &dom),
            Some(DismissReason::ClickOutside)
        );
        assert!(ev.propagation_stopped());
        assert!(!ev.default_prevented());
    }

    #[test]
    fn veto_suppresses_dismissal() {
        let mut dom = MemoryDom::new();
        let el = dom.append(dom.body(), "div");
        let log = Log::default();
        let mut config = logging("x", &log);
        config.on_before_dismiss = Some(Box::new(|r| r != DismissReason::Escape));
        let mut layer = Dismissable::<MemoryDom>::with_registry(config, create_layer_registry());
        layer.activate(el, 0);

        let mut ev = escape();
        assert_eq!(layer.handle_event(&mut ev, &dom), None);
        assert!(!ev.propagation_stopped());
        assert!(layer.dismiss());
        assert_eq!(*log.borrow(), [("x", DismissReason::Programmatic)]);
    }

    #[test]
    fn programmatic_dismiss_bypasses_the_stack_but_not_activation() {
        let mut dom = MemoryDom::new();
        let a_el = dom.append(dom.body(), "div");
        let b_el = dom.append(dom.body(), "div");
        let reg = create_layer_registry();
        let log = Log::default();
        let mut a = Dismissable::<MemoryDom>::with_registry(logging("a", &log), reg.clone());
        let mut b = Dismissable::<MemoryDom>::with_registry(logging("b", &log), reg);
        assert!(!a.dismiss());
        a.activate(a_el, 0);
        b.activate(b_el, 0);
        assert!(a.dismiss());
        assert_eq!(*log.borrow(), [("a", DismissReason::Programmatic)]);
    }

    #[test]
    fn optional_triggers() {
        let mut dom = MemoryDom::new();
        let el = dom.append(dom.body(), "div");
        let inner = dom.append(el, "div");
        let other = dom.append(dom.body(), "div");
        let mut layer =
            Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), create_layer_registry());
        layer.activate(el, 0);
        assert_eq!(layer.handle_event(&mut Event::resize(), &dom), None);
        assert_eq!(layer.handle_event(&mut Event::scroll(other), &dom), None);
        assert_eq!(layer.handle_event(&mut Event::focus_in(other), &dom), None);

        layer.update_config(0, |c| {
            c.resize = true;
            c.scroll_outside = true;
            c.focus_outside = true;
        });
        assert_eq!(
            layer.handle_event(&mut Event::resize(), &dom),
            Some(DismissReason::Resize)
        );
        assert_eq!(layer.handle_event(&mut Event::scroll(inner), &dom), None);
        assert_eq!(
            layer.handle_event(&mut Event::scroll(other), &dom),
            Some(DismissReason::ScrollOutside)
        );
        assert_eq!(layer.handle_event(&mut Event::focus_in(inner), &dom), None);
        assert_eq!(
            layer.handle_event(&mut Event::focus_in(other), &dom),
            Some(DismissReason::FocusOutside)
        );

        layer.update_config(0, |c| c.escape = false);
        assert_eq!(layer.handle_event(&mut escape(), &dom), None);
    }

    #[test]
    fn update_config_reactivates_on_top() {
        let mut dom = MemoryDom::new();
        let a_el = dom.append(dom.body(), "div");
        let b_el = dom.append(dom.body(), "div");
        let reg = create_layer_registry();
        let mut a = Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), reg.clone());
        let mut b = Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), reg.clone());
        a.activate(a_el, 0);
        b.activate(b_el, 0);
        a.update_config(5, |c| c.resize = true);
        assert!(a.is_top());
        assert_eq!(reg.index_of(b.layer_id()), Some(0));
        assert_eq!(a.target(), Some(a_el));
        // Click-outside re-arms from the new activation.
        assert_eq!(a.next_deadline(), Some(5));

        // Inactive layers just take the new config.
        b.deactivate();
        b.update_config(5, |c| c.escape = false);
        assert!(!b.is_active());
    }

    #[test]
    fn destroy_and_drop_leave_the_registry() {
        let mut dom = MemoryDom::new();
        let el = dom.append(dom.body(), "div");
        let reg = create_layer_registry();
        let mut layer = Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), reg.clone());
        layer.activate(el, 0);
        layer.destroy();
        assert_eq!(reg.count(), 0);
        assert_eq!(layer.next_deadline(), None);
        layer.advance(10);
        let mut ev = Event::pointer_down(dom.body());
        assert_eq!(layer.handle_event(&mut ev, &dom), None);

        {
            let mut scoped =
                Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), reg.clone());
            scoped.activate(el, 0);
            assert_eq!(reg.count(), 1);
        }
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn deactivate_is_idempotent() {
        let calls = Rc::new(RefCell::new(0));
        let count = calls.clone();
        let mut layer = Dismissable::<MemoryDom>::with_registry(
            DismissConfig {
                on_deactivate: Some(Box::new(move || *count.borrow_mut() += 1)),
                ..DismissConfig::default()
            },
            create_layer_registry(),
        );
        layer.deactivate();
        assert_eq!(*calls.borrow(), 0);
        let dom = MemoryDom::new();
        layer.activate(dom.body(), 0);
        layer.deactivate();
        layer.deactivate();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn registry_reset_deactivates_everything() {
        let dom = MemoryDom::new();
        let reg = create_layer_registry();
        let mut layer = Dismissable::<MemoryDom>::with_registry(DismissConfig::default(), reg.clone());
        layer.activate(dom.body(), 0);
        reg.reset_all();
        assert!(!layer.is_active());
        assert_eq!(layer.handle_event(&mut escape(), &dom), None);
    }
}
