// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus containment for modal-like containers.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use tacit_dom::focusable::{get_first_focusable, get_focusable_elements};
use tacit_dom::{Dom, Event, EventKind, Key, Modifiers, Timers};

/// Where focus should go: on activation, or back on deactivation.
pub enum FocusTarget<D: Dom> {
    /// The default: the first focusable element on activation (when
    /// `auto_focus` is set), the previously active element on deactivation.
    Auto,
    /// A specific element.
    Node(D::Node),
    /// The first element matching a selector. Resolved inside the container on
    /// activation and inside the document body on deactivation.
    Selector(String),
    /// Computed on demand from the document and the trap container.
    Resolve(Box<dyn Fn(&D, D::Node) -> Option<D::Node>>),
}

impl<D: Dom> fmt::Debug for FocusTarget<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Node(n) => f.debug_tuple("Node").field(n).finish(),
            Self::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            Self::Resolve(_) => f.write_str("Resolve(..)"),
        }
    }
}

/// Configuration for [`FocusTrap`].
pub struct FocusTrapConfig<D: Dom> {
    /// Element focused shortly after activation.
    pub initial_focus: FocusTarget<D>,
    /// Fall back to the first focusable element when `initial_focus` does not
    /// resolve. Defaults to `true`.
    pub auto_focus: bool,
    /// Restore focus on deactivation. Defaults to `true`.
    pub return_focus: bool,
    /// Where to restore focus; [`FocusTarget::Auto`] means the element that was
    /// active when the trap activated.
    pub return_focus_target: FocusTarget<D>,
    /// Called with the outside element after focus escaped and was pulled back.
    pub on_focus_escape: Option<Box<dyn FnMut(D::Node)>>,
    /// Called after activation.
    pub on_activate: Option<Box<dyn FnMut()>>,
    /// Called after deactivation.
    pub on_deactivate: Option<Box<dyn FnMut()>>,
}

impl<D: Dom> Default for FocusTrapConfig<D> {
    fn default() -> Self {
        Self {
            initial_focus: FocusTarget::Auto,
            auto_focus: true,
            return_focus: true,
            return_focus_target: FocusTarget::Auto,
            on_focus_escape: None,
            on_activate: None,
            on_deactivate: None,
        }
    }
}

impl<D: Dom> fmt::Debug for FocusTrapConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusTrapConfig")
            .field("initial_focus", &self.initial_focus)
            .field("auto_focus", &self.auto_focus)
            .field("return_focus", &self.return_focus)
            .field("return_focus_target", &self.return_focus_target)
            .finish_non_exhaustive()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TrapTimer {
    InitialFocus,
}

/// Keeps keyboard focus inside a container while active.
///
/// The host forwards capture-phase `keydown` and `focusin` events to
/// [`FocusTrap::handle_event`] and drives the initial-focus timer with
/// [`FocusTrap::advance`].
///
/// - Tab on the last focusable element (or from outside the container) wraps to
///   the first; Shift+Tab on the first wraps to the last. Other Tabs are left to
///   the host.
/// - Focus that lands outside the container is pulled back to the first
///   focusable element.
/// - On deactivation focus returns to where it came from.
pub struct FocusTrap<D: Dom> {
    config: FocusTrapConfig<D>,
    container: Option<D::Node>,
    previously_focused: Option<D::Node>,
    timers: Timers<TrapTimer>,
}

impl<D: Dom> fmt::Debug for FocusTrap<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusTrap")
            .field("config", &self.config)
            .field("container", &self.container)
            .field("previously_focused", &self.previously_focused)
            .field("pending_timers", &self.timers.len())
            .finish()
    }
}

impl<D: Dom> FocusTrap<D> {
    /// Create an inactive trap.
    pub fn new(config: FocusTrapConfig<D>) -> Self {
        Self {
            config,
            container: None,
            previously_focused: None,
            timers: Timers::new(),
        }
    }

    /// Whether the trap is active.
    pub fn is_active(&self) -> bool {
        self.container.is_some()
    }

    /// The trapped container while active.
    pub fn container(&self) -> Option<D::Node> {
        self.container
    }

    /// Trap focus inside `container`.
    ///
    /// Records the active element for later return and schedules the initial
    /// focus for the next [`FocusTrap::advance`]. Activating an active trap
    /// deactivates it first.
    pub fn activate(&mut self, dom: &mut D, container: D::Node, now: u64) {
        if self.is_active() {
            self.deactivate(dom);
        }
        self.container = Some(container);
        self.previously_focused = dom.active_element();
        self.timers.schedule(now, 0, TrapTimer::InitialFocus);
        tracing::debug!(?container, "focus trap activated");
        if let Some(cb) = self.config.on_activate.as_mut() {
            cb();
        }
    }

    /// Release the trap, restoring focus unless `return_focus` is off.
    pub fn deactivate(&mut self, dom: &mut D) {
        let Some(container) = self.container.take() else {
            return;
        };
        self.timers.clear();
        let previous = self.previously_focused.take();
        if self.config.return_focus {
            let target = match &self.config.return_focus_target {
                FocusTarget::Auto => previous,
                FocusTarget::Node(n) => Some(*n),
                FocusTarget::Selector(s) => dom.query_selector(dom.body(), s),
                FocusTarget::Resolve(f) => f(dom, container),
            };
            if let Some(target) = target.filter(|&t| dom.is_connected(t)) {
                dom.focus(target);
            }
        }
        tracing::debug!(?container, "focus trap deactivated");
        if let Some(cb) = self.config.on_deactivate.as_mut() {
            cb();
        }
    }

    /// Mutate the configuration in place. The change applies from the next event.
    pub fn update_config(&mut self, f: impl FnOnce(&mut FocusTrapConfig<D>)) {
        f(&mut self.config);
    }

    /// Deactivate and drop every pending timer.
    pub fn destroy(&mut self, dom: &mut D) {
        self.deactivate(dom);
        self.timers.clear();
    }

    /// Fire due timers.
    pub fn advance(&mut self, now: u64, dom: &mut D) {
        while let Some((_, timer)) = self.timers.pop_due(now) {
            match timer {
                TrapTimer::InitialFocus => self.focus_initial(dom),
            }
        }
    }

    /// The next time [`FocusTrap::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Handle a forwarded `keydown` or `focusin`.
    ///
    /// Returns `true` when the trap acted on the event.
    pub fn handle_event(&mut self, dom: &mut D, event: &mut Event<D::Node>) -> bool {
        let Some(container) = self.container else {
            return false;
        };
        if event.propagation_stopped() {
            return false;
        }
        let kind = event.kind;
        match kind {
            EventKind::KeyDown {
                key: Key::Tab,
                modifiers,
            } if !modifiers.is_chord() => self.handle_tab(dom, container, event, modifiers),
            EventKind::FocusIn => {
                let Some(target) = event.target else {
                    return false;
                };
                if dom.contains(container, target) {
                    return false;
                }
                event.prevent_default();
                event.stop_propagation();
                if let Some(first) = get_first_focusable(dom, container) {
                    dom.focus(first);
                }
                tracing::trace!(?target, "focus escaped the trap; pulled back");
                if let Some(cb) = self.config.on_focus_escape.as_mut() {
                    cb(target);
                }
                true
            }
            _ => false,
        }
    }

    fn handle_tab(
        &mut self,
        dom: &mut D,
        container: D::Node,
        event: &mut Event<D::Node>,
        modifiers: Modifiers,
    ) -> bool {
        let focusables = get_focusable_elements(dom, container);
        let (Some(&first), Some(&last)) = (focusables.first(), focusables.last()) else {
            // Nothing to move to; keep focus where it is.
            event.prevent_default();
            return true;
        };
        let active = dom
            .active_element()
            .filter(|&a| dom.contains(container, a));
        let target = if modifiers.contains(Modifiers::SHIFT) {
            (active.is_none() || active == Some(first)).then_some(last)
        } else {
            (active.is_none() || active == Some(last)).then_some(first)
        };
        let Some(target) = target else {
            return false;
        };
        event.prevent_default();
        dom.focus(target);
        true
    }

    fn focus_initial(&mut self, dom: &mut D) {
        let Some(container) = self.container else {
            return;
        };
        let explicit = match &self.config.initial_focus {
            FocusTarget::Auto => None,
            FocusTarget::Node(n) => Some(*n),
            FocusTarget::Selector(s) => dom.query_selector(container, s),
            FocusTarget::Resolve(f) => f(dom, container),
        };
        let target = explicit.or_else(|| {
            if self.config.auto_focus {
                get_first_focusable(dom, container)
            } else {
                None
            }
        });
        if let Some(target) = target {
            dom.focus(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use tacit_dom::memory::{MemoryDom, NodeId};

    struct Modal {
        dom: MemoryDom,
        opener: NodeId,
        dialog: NodeId,
        buttons: [NodeId; 3],
        outside: NodeId,
    }

    fn modal() -> Modal {
        let mut dom = MemoryDom::new();
        let opener = dom.append(dom.body(), "button");
        let dialog = dom.append(dom.body(), "div");
        let buttons = [
            dom.append(dialog, "button"),
            dom.append(dialog, "button"),
            dom.append(dialog, "button"),
        ];
        let outside = dom.append(dom.body(), "button");
        dom.focus(opener);
        Modal {
            dom,
            opener,
            dialog,
            buttons,
            outside,
        }
    }

    fn tab(dom: &mut MemoryDom, trap: &mut FocusTrap<MemoryDom>, shift: bool) -> Event<NodeId> {
        let modifiers = if shift {
            Modifiers::SHIFT
        } else {
            Modifiers::empty()
        };
        let mut ev = Event::key_down(Key::Tab).with_modifiers(modifiers);
        trap.handle_event(dom, &mut ev);
        ev
    }

    #[test]
    fn initial_focus_is_deferred() {
        let Modal {
            mut dom,
            opener,
            dialog,
            buttons,
            ..
        } = modal();
        let mut trap = FocusTrap::new(FocusTrapConfig::default());
        trap.activate(&mut dom, dialog, 100);
        assert_eq!(dom.active_element(), Some(opener));
        assert_eq!(trap.next_deadline(), Some(100));
        trap.advance(100, &mut dom);
        assert_eq!(dom.active_element(), Some(buttons[0]));
    }

    #[test]
    fn explicit_initial_focus_targets() {
        let Modal {
            mut dom,
            dialog,
            buttons,
            ..
        } = modal();
        dom.set_attribute(buttons[2], "data-autofocus", "");

        let mut trap = FocusTrap::new(FocusTrapConfig {
            initial_focus: FocusTarget::Selector("[data-autofocus]".into()),
            ..FocusTrapConfig::default()
        });
        trap.activate(&mut dom, dialog, 0);
        trap.advance(0, &mut dom);
        assert_eq!(dom.active_element(), Some(buttons[2]));

        let second = buttons[1];
        trap.update_config(|c| {
            c.initial_focus = FocusTarget::Resolve(Box::new(move |_, _| Some(second)));
        });
        trap.activate(&mut dom, dialog, 0);
        trap.advance(0, &mut dom);
        assert_eq!(dom.active_element(), Some(buttons[1]));
    }

    #[test]
    fn no_focusable_elements_is_silent() {
        let mut dom = MemoryDom::new();
        let opener = dom.append(dom.body(), "button");
        let dialog = dom.append(dom.body(), "div");
        dom.append(dialog, "p");
        dom.focus(opener);
        let mut trap = FocusTrap::new(FocusTrapConfig::default());
        trap.activate(&mut dom, dialog, 0);
        trap.advance(0, &mut dom);
        assert_eq!(dom.active_element(), Some(opener));

        // Tab cannot leave either.
        let ev = tab(&mut dom, &mut trap, false);
        assert!(ev.default_prevented());
    }

    #[test]
    fn tab_wraps_between_first_and_last() {
        let Modal {
            mut dom,
            dialog,
            buttons: [first, middle, last],
            ..
        } = modal();
        let mut trap = FocusTrap::new(FocusTrapConfig::default());
        trap.activate(&mut dom, dialog, 0);
        trap.advance(0, &mut dom);

        dom.focus(last);
        let ev = tab(&mut dom, &mut trap, false);
        assert!(ev.default_prevented());
        assert_eq!(dom.active_element(), Some(first));

        let ev = tab(&mut dom, &mut trap, true);
        assert!(ev.default_prevented());
        assert_eq!(dom.active_element(), Some(last));

        // Tab in the middle belongs to the host.
        dom.focus(middle);
        let ev = tab(&mut dom, &mut trap, false);
        assert!(!ev.default_prevented());
        assert_eq!(dom.active_element(), Some(middle));
        let ev = tab(&mut dom, &mut trap, true);
        assert!(!ev.default_prevented());
    }

    #[test]
    fn two_focusables_wrap_both_ways() {
        let mut dom = MemoryDom::new();
        let dialog = dom.append(dom.body(), "div");
        let first = dom.append(dialog, "button");
        let last = dom.append(dialog, "button");
        let mut trap = FocusTrap::new(FocusTrapConfig::default());
        trap.activate(&mut dom, dialog, 0);
        trap.advance(0, &mut dom);
        assert_eq!(dom.active_element(), Some(first));

        // Tab on `last` goes to `first`, Shift+Tab on `first` goes to `last`.
        dom.focus(last);
        let ev = tab(&mut dom, &mut trap, false);
        assert!(ev.default_prevented());
        assert_eq!(dom.active_element(), Some(first));
        let ev = tab(&mut dom, &mut trap, true);
        assert!(ev.default_prevented());
        assert_eq!(dom.active_element(), Some(last));

        // Forward from `first` is an ordinary Tab.
        dom.focus(first);
        let ev = tab(&mut dom, &mut trap, false);
        assert!(!ev.default_prevented());
        assert_eq!(dom.active_element(), Some(first));
    }

    #[test]
    fn tab_from_outside_enters_the_trap() {
        let Modal {
            mut dom,
            dialog,
            buttons: [first, _, last],
            outside,
            ..
        } = modal();
        let mut trap = FocusTrap::new(FocusTrapConfig::default());
        trap.activate(&mut dom, dialog, 0);

        dom.focus(outside);
        tab(&mut dom, &mut trap, false);
        assert_eq!(dom.active_element(), Some(first));
        dom.focus(outside);
        tab(&mut dom, &mut trap, true);
        assert_eq!(dom.active_element(), Some(last));
    }

    #[test]
    fn chorded_tab_is_ignored() {
        let Modal {
            mut dom,
            dialog,
            buttons,
            ..
        } = modal();
        let mut trap = FocusTrap::new(FocusTrapConfig::default());
        trap.activate(&mut dom, dialog, 0);
        dom.focus(buttons[2]);
        let mut ev = Event::key_down(Key::Tab).with_modifiers(Modifiers::CONTROL);
        assert!(!trap.handle_event(&mut dom, &mut ev));
        assert_eq!(dom.active_element(), Some(buttons[2]));
    }

    #[test]
    fn escaped_focus_is_pulled_back() {
        let Modal {
            mut dom,
            dialog,
            buttons,
            outside,
            ..
        } = modal();
        let escapes = Rc::new(RefCell::new(Vec::new()));
        let sink = escapes.clone();
        let mut trap = FocusTrap::new(FocusTrapConfig {
            on_focus_escape: Some(Box::new(move |n| sink.borrow_mut().push(n))),
            ..FocusTrapConfig::default()
        });
        trap.activate(&mut dom, dialog, 0);

        dom.focus(outside);
        let mut ev = Event::focus_in(outside);
        assert!(trap.handle_event(&mut dom, &mut ev));
        assert!(ev.default_prevented());
        assert!(ev.propagation_stopped());
        assert_eq!(dom.active_element(), Some(buttons[0]));
        assert_eq!(*escapes.borrow(), [outside]);

        // Focus moving within the container is fine.
        let mut ev = Event::focus_in(buttons[1]);
        assert!(!trap.handle_event(&mut dom, &mut ev));
    }

    #[test]
    fn deactivation_returns_focus() {
        let Modal {
            mut dom,
            opener,
            dialog,
            outside,
            ..
        } = modal();
        let deactivated = Rc::new(Cell::new(0));
        let count = deactivated.clone();
        let mut trap = FocusTrap::new(FocusTrapConfig {
            on_deactivate: Some(Box::new(move || count.set(count.get() + 1))),
            ..FocusTrapConfig::default()
        });
        trap.activate(&mut dom, dialog, 0);
        trap.advance(0, &mut dom);
        trap.deactivate(&mut dom);
        assert_eq!(dom.active_element(), Some(opener));
        assert!(!trap.is_active());

        // Second deactivate is a no-op.
        trap.deactivate(&mut dom);
        assert_eq!(deactivated.get(), 1);

        // Inactive traps ignore events.
        let mut ev = Event::focus_in(outside);
        assert!(!trap.handle_event(&mut dom, &mut ev));

        trap.update_config(|c| c.return_focus_target = FocusTarget::Node(outside));
        trap.activate(&mut dom, dialog, 0);
        trap.deactivate(&mut dom);
        assert_eq!(dom.active_element(), Some(outside));

        trap.update_config(|c| c.return_focus = false);
        trap.activate(&mut dom, dialog, 0);
        trap.advance(0, &mut dom);
        trap.deactivate(&mut dom);
        assert_ne!(dom.active_element(), Some(outside));
    }

    #[test]
    fn deactivation_cancels_initial_focus() {
        let Modal {
            mut dom,
            opener,
            dialog,
            ..
        } = modal();
        let mut trap = FocusTrap::new(FocusTrapConfig::default());
        trap.activate(&mut dom, dialog, 0);
        trap.destroy(&mut dom);
        trap.advance(10, &mut dom);
        assert_eq!(dom.active_element(), Some(opener));
        assert_eq!(trap.next_deadline(), None);
    }

    #[test]
    fn removed_return_target_is_skipped() {
        let Modal {
            mut dom,
            opener,
            dialog,
            buttons,
            ..
        } = modal();
        let mut trap = FocusTrap::new(FocusTrapConfig::default());
        trap.activate(&mut dom, dialog, 0);
        trap.advance(0, &mut dom);
        dom.remove(opener);
        trap.deactivate(&mut dom);
        assert_eq!(dom.active_element(), Some(buttons[0]));
    }
}
