// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-to-select matching for lists and menus.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use tacit_dom::focusable::is_disabled_item;
use tacit_dom::{Dom, Event, Key};

/// Something a [`Typeahead`] can match against.
pub trait TypeaheadItem {
    /// The label typed characters are compared with.
    fn text(&self) -> &str;

    /// Disabled items never match.
    fn is_disabled(&self) -> bool {
        false
    }
}

impl TypeaheadItem for &str {
    fn text(&self) -> &str {
        self
    }
}

impl TypeaheadItem for String {
    fn text(&self) -> &str {
        self.as_str()
    }
}

/// An owned label with a disabled flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextItem {
    /// The label.
    pub text: String,
    /// Whether the item is skipped.
    pub disabled: bool,
}

impl TextItem {
    /// An enabled item.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disabled: false,
        }
    }

    /// Read the trimmed text content and disabled state of an element.
    pub fn from_dom<D: Dom>(dom: &D, node: D::Node) -> Self {
        Self {
            text: dom.text_content(node).trim().into(),
            disabled: is_disabled_item(dom, node),
        }
    }
}

impl TypeaheadItem for TextItem {
    fn text(&self) -> &str {
        &self.text
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// How the buffer is compared with item text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The text starts with the buffer.
    #[default]
    Prefix,
    /// The text contains the buffer anywhere.
    Substring,
}

/// Configuration for [`Typeahead`].
pub struct TypeaheadConfig {
    /// Idle time in milliseconds after which the buffer clears. Defaults to 500.
    pub timeout_ms: u64,
    /// Defaults to [`MatchMode::Prefix`].
    pub match_mode: MatchMode,
    /// Defaults to `false`.
    pub case_sensitive: bool,
    /// Called with the index of each match.
    pub on_match: Option<Box<dyn FnMut(usize)>>,
    /// Called with the buffer when nothing matched.
    pub on_no_match: Option<Box<dyn FnMut(&str)>>,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            match_mode: MatchMode::Prefix,
            case_sensitive: false,
            on_match: None,
            on_no_match: None,
        }
    }
}

impl fmt::Debug for TypeaheadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeaheadConfig")
            .field("timeout_ms", &self.timeout_ms)
            .field("match_mode", &self.match_mode)
            .field("case_sensitive", &self.case_sensitive)
            .finish_non_exhaustive()
    }
}

/// Accumulates typed characters and finds the matching item.
///
/// The buffer clears [`TypeaheadConfig::timeout_ms`] after the last keystroke.
/// Expiry is checked lazily on the next keystroke and by
/// [`Typeahead::advance`], so hosts that never call `advance` still get the
/// right behavior.
///
/// Pressing the same character repeatedly cycles through the items starting
/// with it. A longer buffer refines the current match instead.
///
/// ```
/// use tacit_focus::{Typeahead, TypeaheadConfig};
///
/// let items = ["Apple", "Banana", "Apricot"];
/// let mut typeahead = Typeahead::new(TypeaheadConfig::default());
/// assert_eq!(typeahead.handle_char('a', &items, 0), Some(0));
/// assert_eq!(typeahead.handle_char('a', &items, 100), Some(2));
/// // Past the idle timeout the buffer starts over, continuing after the match.
/// assert_eq!(typeahead.handle_char('b', &items, 1000), Some(1));
/// ```
pub struct Typeahead {
    config: TypeaheadConfig,
    buffer: String,
    last_match: Option<usize>,
    expires_at: Option<u64>,
}

impl fmt::Debug for Typeahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typeahead")
            .field("config", &self.config)
            .field("buffer", &self.buffer)
            .field("last_match", &self.last_match)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Typeahead {
    /// Create an empty typeahead.
    pub fn new(config: TypeaheadConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            last_match: None,
            expires_at: None,
        }
    }

    /// The characters typed so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The index of the most recent match.
    pub fn last_match_index(&self) -> Option<usize> {
        self.last_match
    }

    /// Seed the continuation point, for example from the current roving focus.
    pub fn set_last_match_index(&mut self, index: Option<usize>) {
        self.last_match = index;
    }

    /// Mutate the configuration in place.
    pub fn update_config(&mut self, f: impl FnOnce(&mut TypeaheadConfig)) {
        f(&mut self.config);
    }

    /// When the buffer will clear if nothing else is typed.
    pub fn next_deadline(&self) -> Option<u64> {
        self.expires_at
    }

    /// Clear the buffer if the idle timeout has passed.
    pub fn advance(&mut self, now: u64) {
        if self.expires_at.is_some_and(|t| now >= t) {
            self.buffer.clear();
            self.expires_at = None;
        }
    }

    /// Clear the buffer and forget the last match.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.last_match = None;
        self.expires_at = None;
    }

    /// Append `ch` to the buffer and return the index of the matching item.
    ///
    /// A buffer of one repeated character searches from just after the last
    /// match. A longer buffer searches from the last match itself, so typing
    /// "ap" after "a" matched "Apple" keeps "Apple" instead of skipping it.
    pub fn handle_char<I: TypeaheadItem>(
        &mut self,
        ch: char,
        items: &[I],
        now: u64,
    ) -> Option<usize> {
        self.advance(now);
        self.buffer.push(ch);
        self.touch(now);

        let mut chars = self.buffer.chars();
        let repeated = chars
            .next()
            .filter(|&first| chars.all(|c| c == first));
        let found = match repeated {
            // Same key again: cycle to the next item with that initial.
            Some(first) => {
                let mut single = [0_u8; 4];
                let query: &str = first.encode_utf8(&mut single);
                self.find(query, items, self.after_last_match())
            }
            // Refine: the current match may still fit the longer buffer.
            None => {
                let query = self.buffer.clone();
                self.find(&query, items, self.last_match.unwrap_or(0))
            }
        };
        self.report(found)
    }

    /// Handle a forwarded `keydown`.
    ///
    /// Printable characters go through [`Typeahead::handle_char`]; Space only
    /// while a search is in progress. Backspace edits the buffer and searches
    /// again; Escape clears it without consuming the event. Returns `true`, and
    /// prevents the default action, when the key was consumed.
    pub fn handle_key_down<K: Copy, I: TypeaheadItem>(
        &mut self,
        event: &mut Event<K>,
        items: &[I],
        now: u64,
    ) -> bool {
        if event.propagation_stopped() || event.modifiers().is_chord() {
            return false;
        }
        self.advance(now);
        let consumed = match event.key() {
            Some(Key::Escape) => {
                self.buffer.clear();
                self.expires_at = None;
                false
            }
            Some(Key::Backspace) if !self.buffer.is_empty() => {
                self.buffer.pop();
                self.last_match = None;
                self.touch(now);
                if !self.buffer.is_empty() {
                    let query = self.buffer.clone();
                    let found = self.find(&query, items, 0);
                    self.report(found);
                }
                true
            }
            Some(Key::SPACE) if self.buffer.is_empty() => false,
            Some(Key::Character(c)) if !c.is_control() => {
                self.handle_char(c, items, now);
                true
            }
            _ => false,
        };
        if consumed {
            event.prevent_default();
        }
        consumed
    }

    /// Find the next item matching `query`, scanning from just after the last
    /// match and wrapping around. Updates the last match on success.
    pub fn search<I: TypeaheadItem>(&mut self, query: &str, items: &[I]) -> Option<usize> {
        let found = self.find(query, items, self.after_last_match())?;
        self.last_match = Some(found);
        Some(found)
    }

    fn after_last_match(&self) -> usize {
        self.last_match.map_or(0, |i| i + 1)
    }

    fn touch(&mut self, now: u64) {
        self.expires_at = Some(now.saturating_add(self.config.timeout_ms));
    }

    fn report(&mut self, found: Option<usize>) -> Option<usize> {
        match found {
            Some(i) => {
                self.last_match = Some(i);
                tracing::trace!(index = i, buffer = %self.buffer, "typeahead match");
                if let Some(cb) = self.config.on_match.as_mut() {
                    cb(i);
                }
            }
            None => {
                tracing::trace!(buffer = %self.buffer, "typeahead found no match");
                if let Some(cb) = self.config.on_no_match.as_mut() {
                    cb(&self.buffer);
                }
            }
        }
        found
    }

    /// Wrap-around scan of `items` beginning at `start` (inclusive).
    fn find<I: TypeaheadItem>(&self, query: &str, items: &[I], start: usize) -> Option<usize> {
        let len = items.len();
        if len == 0 || query.is_empty() {
            return None;
        }
        let query = self.normalize(query);
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&i| {
                let item = &items[i];
                !item.is_disabled() && self.is_match(&self.normalize(item.text()), &query)
            })
    }

    fn is_match(&self, text: &str, query: &str) -> bool {
        match self.config.match_mode {
            MatchMode::Prefix => text.starts_with(query),
            MatchMode::Substring => text.contains(query),
        }
    }

    fn normalize<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if self.config.case_sensitive {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.to_lowercase())
        }
    }
}
