// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event payloads forwarded by the host.
//!
//! Behaviors do not register listeners with the document. The host forwards
//! the document-level events it receives (in the capture phase) to each live
//! behavior's `handle_event`. Cancelation state lives on the payload: a
//! behavior that consumes an event calls [`Event::prevent_default`] and/or
//! [`Event::stop_propagation`], and behaviors ignore events whose propagation
//! has already been stopped.

/// Keys that behaviors react to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, including space.
    Character(char),
    /// `Tab`.
    Tab,
    /// `Escape`.
    Escape,
    /// `Enter`.
    Enter,
    /// `Backspace`.
    Backspace,
    /// `ArrowUp`.
    ArrowUp,
    /// `ArrowDown`.
    ArrowDown,
    /// `ArrowLeft`.
    ArrowLeft,
    /// `ArrowRight`.
    ArrowRight,
    /// `Home`.
    Home,
    /// `End`.
    End,
    /// Any other named key.
    Other,
}

impl Key {
    /// The space bar.
    pub const SPACE: Self = Self::Character(' ');

    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            "Backspace" => Self::Backspace,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            "Spacebar" => Self::SPACE,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c),
                    _ => Self::Other,
                }
            }
        }
    }

    /// The character for printable keys.
    pub fn as_char(self) -> Option<char> {
        match self {
            Self::Character(c) => Some(c),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT   = 0b0000_0001;
        /// Control.
        const CONTROL = 0b0000_0010;
        /// Alt / Option.
        const ALT     = 0b0000_0100;
        /// Meta / Command.
        const META    = 0b0000_1000;
    }
}

impl Modifiers {
    /// Whether a command chord (Ctrl, Alt, or Meta) is held. Shift alone is not a chord.
    pub fn is_chord(self) -> bool {
        self.intersects(Self::CONTROL | Self::ALT | Self::META)
    }
}

/// The kind of a forwarded event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// `keydown`.
    KeyDown {
        /// The key pressed.
        key: Key,
        /// Modifiers held.
        modifiers: Modifiers,
    },
    /// `pointerdown`.
    PointerDown,
    /// `focusin`.
    FocusIn,
    /// `scroll`.
    Scroll,
    /// `resize` on the window.
    Resize,
}

/// An event payload forwarded by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event<K> {
    /// What happened.
    pub kind: EventKind,
    /// The event target, if it is an element.
    pub target: Option<K>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl<K: Copy> Event<K> {
    /// Create an event with no target.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            target: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// A `keydown` with no modifiers.
    pub fn key_down(key: Key) -> Self {
        Self::new(EventKind::KeyDown {
            key,
            modifiers: Modifiers::empty(),
        })
    }

    /// A `pointerdown` on `target`.
    pub fn pointer_down(target: K) -> Self {
        Self::new(EventKind::PointerDown).with_target(target)
    }

    /// A `focusin` on `target`.
    pub fn focus_in(target: K) -> Self {
        Self::new(EventKind::FocusIn).with_target(target)
    }

    /// A `scroll` on `target`.
    pub fn scroll(target: K) -> Self {
        Self::new(EventKind::Scroll).with_target(target)
    }

    /// A window `resize`.
    pub fn resize() -> Self {
        Self::new(EventKind::Resize)
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: K) -> Self {
        self.target = Some(target);
        self
    }

    /// Replace the modifiers of a key event. Other kinds are unchanged.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        if let EventKind::KeyDown { modifiers: m, .. } = &mut self.kind {
            *m = modifiers;
        }
        self
    }

    /// The key of a `keydown`.
    pub fn key(&self) -> Option<Key> {
        match self.kind {
            EventKind::KeyDown { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The modifiers of a `keydown`; empty for other kinds.
    pub fn modifiers(&self) -> Modifiers {
        match self.kind {
            EventKind::KeyDown { modifiers, .. } => modifiers,
            _ => Modifiers::empty(),
        }
    }

    /// Suppress the host's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop delivery to further behaviors.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether a handler prevented the default action.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether a handler stopped propagation.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_key_names_parse() {
        assert_eq!(Key::from_dom_key("ArrowDown"), Key::ArrowDown);
        assert_eq!(Key::from_dom_key("Esc"), Key::Escape);
        assert_eq!(Key::from_dom_key(" "), Key::SPACE);
        assert_eq!(Key::from_dom_key("a"), Key::Character('a'));
        assert_eq!(Key::from_dom_key("é"), Key::Character('é'));
        assert_eq!(Key::from_dom_key("F5"), Key::Other);
        assert_eq!(Key::from_dom_key(""), Key::Other);
    }

    #[test]
    fn shift_is_not_a_chord() {
        assert!(!Modifiers::SHIFT.is_chord());
        assert!(Modifiers::CONTROL.is_chord());
        assert!((Modifiers::SHIFT | Modifiers::META).is_chord());
    }

    #[test]
    fn flags_are_sticky() {
        let mut ev: Event<u32> = Event::key_down(Key::Tab).with_modifiers(Modifiers::SHIFT);
        assert_eq!(ev.modifiers(), Modifiers::SHIFT);
        assert!(!ev.default_prevented());
        ev.prevent_default();
        ev.stop_propagation();
        assert!(ev.default_prevented());
        assert!(ev.propagation_stopped());
    }

    #[test]
    fn modifiers_only_apply_to_key_events() {
        let ev: Event<u32> = Event::pointer_down(3).with_modifiers(Modifiers::SHIFT);
        assert_eq!(ev.modifiers(), Modifiers::empty());
        assert_eq!(ev.key(), None);
        assert_eq!(ev.target, Some(3));
    }
}
