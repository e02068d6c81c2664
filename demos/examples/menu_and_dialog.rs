// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A menu button that opens a menu, which opens a dialog, driven entirely over
//! the in-memory document.
//!
//! This example wires every Tacit behavior the way a host would:
//! - `tacit_position` keeps the menu attached to its button,
//! - `tacit_dismiss` closes the topmost overlay on Escape or click-outside,
//! - `tacit_focus` provides arrow-key navigation, typeahead, and the dialog's
//!   focus trap,
//! - `tacit_announce` reports what happened to screen readers.
//!
//! Run:
//! - `cargo run -p tacit_demos --example menu_and_dialog`
//! - `RUST_LOG=trace cargo run -p tacit_demos --example menu_and_dialog` for
//!   every decision the behaviors make.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Rect;
use tacit_announce::{AnnouncerConfig, LiveRegionAnnouncer, Politeness};
use tacit_dismiss::{DismissConfig, DismissReason, Dismissable, create_layer_registry};
use tacit_dom::memory::{MemoryDom, NodeId};
use tacit_dom::{Dom, Event, Key, Modifiers};
use tacit_focus::{
    FocusTrap, FocusTrapConfig, RovingConfig, RovingTabindex, TextItem, Typeahead, TypeaheadConfig,
};
use tacit_position::{Popover, PopoverConfig};
use tracing_subscriber::EnvFilter;

/// Things the behaviors ask the host to do. Callbacks only record; the host
/// acts after the event has been handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    CloseMenu,
    CloseDialog,
    Activate(usize),
}

type Commands = Rc<RefCell<Vec<Command>>>;

struct App {
    dom: MemoryDom,
    now: u64,
    button: NodeId,
    menu: NodeId,
    items: Vec<NodeId>,
    dialog: NodeId,
    popover: Popover<MemoryDom>,
    menu_layer: Dismissable<MemoryDom>,
    dialog_layer: Dismissable<MemoryDom>,
    roving: RovingTabindex<MemoryDom>,
    typeahead: Typeahead,
    trap: FocusTrap<MemoryDom>,
    announcer: LiveRegionAnnouncer<MemoryDom>,
    commands: Commands,
}

const LABELS: [&str; 5] = ["New", "Open", "Save", "Save As", "Quit"];

impl App {
    fn new() -> Self {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let button = dom.append(body, "button");
        dom.set_text_content(button, "File");
        dom.set_rect(button, Rect::new(16.0, 700.0, 96.0, 732.0));

        let menu = dom.append(body, "ul");
        dom.set_attribute(menu, "role", "menu");
        dom.set_rect(menu, Rect::new(0.0, 0.0, 160.0, 180.0));
        let items: Vec<NodeId> = LABELS
            .iter()
            .map(|label| {
                let li = dom.append(menu, "li");
                dom.set_attribute(li, "role", "menuitem");
                dom.set_text_content(li, label);
                li
            })
            .collect();
        dom.set_attribute(items[4], "aria-disabled", "true");

        let dialog = dom.append(body, "div");
        dom.set_attribute(dialog, "role", "dialog");
        let name = dom.append(dialog, "input");
        dom.set_attribute(name, "data-autofocus", "");
        let cancel = dom.append(dialog, "button");
        dom.set_text_content(cancel, "Cancel");
        let save = dom.append(dialog, "button");
        dom.set_text_content(save, "Save");

        let commands = Commands::default();
        let registry = create_layer_registry();

        let sink = commands.clone();
        let menu_layer = Dismissable::with_registry(
            DismissConfig {
                on_dismiss: Some(Box::new(move |reason: DismissReason| {
                    tracing::info!(?reason, "menu dismissed");
                    sink.borrow_mut().push(Command::CloseMenu);
                })),
                ..DismissConfig::default()
            },
            registry.clone(),
        );
        let sink = commands.clone();
        let dialog_layer = Dismissable::with_registry(
            DismissConfig {
                on_dismiss: Some(Box::new(move |reason: DismissReason| {
                    tracing::info!(?reason, "dialog dismissed");
                    sink.borrow_mut().push(Command::CloseDialog);
                })),
                ..DismissConfig::default()
            },
            registry,
        );

        let sink = commands.clone();
        let roving = RovingTabindex::new(RovingConfig {
            on_activate: Some(Box::new(move |index, _| {
                sink.borrow_mut().push(Command::Activate(index));
            })),
            ..RovingConfig::default()
        });

        let trap = FocusTrap::new(FocusTrapConfig {
            initial_focus: tacit_focus::FocusTarget::Selector("[data-autofocus]".into()),
            ..FocusTrapConfig::default()
        });

        Self {
            dom,
            now: 0,
            button,
            menu,
            items,
            dialog,
            popover: Popover::new(PopoverConfig::default()),
            menu_layer,
            dialog_layer,
            roving,
            typeahead: Typeahead::new(TypeaheadConfig::default()),
            trap,
            announcer: LiveRegionAnnouncer::new(AnnouncerConfig::default()),
            commands,
        }
    }

    /// Move the clock and fire everything that came due.
    fn tick(&mut self, ms: u64) {
        self.now += ms;
        let now = self.now;
        self.menu_layer.advance(now);
        self.dialog_layer.advance(now);
        self.trap.advance(now, &mut self.dom);
        self.typeahead.advance(now);
        self.announcer.advance(now, &mut self.dom);
    }

    fn open_menu(&mut self) {
        for &item in &self.items {
            self.roving.register_item(&mut self.dom, item, None);
        }
        self.popover.set_reference(Some(self.button));
        self.popover.set_floating(&mut self.dom, Some(self.menu));
        if let Some(pos) = self.popover.show(&mut self.dom) {
            println!(
                "menu placed at ({}, {}) on {} (flipped: {})",
                pos.x, pos.y, pos.placement, pos.flipped
            );
        }
        self.menu_layer.activate(self.menu, self.now);
        self.menu_layer.add_exclude(self.button);
        self.roving.focus_first(&mut self.dom);
        self.announcer
            .announce_polite(&mut self.dom, "File menu, 4 items", self.now);
    }

    fn close_menu(&mut self) {
        self.popover.hide(&mut self.dom);
        self.menu_layer.deactivate();
        self.roving.destroy();
        self.typeahead.clear();
        self.dom.focus(self.button);
    }

    fn open_dialog(&mut self) {
        self.dialog_layer.activate(self.dialog, self.now);
        self.trap.activate(&mut self.dom, self.dialog, self.now);
        self.announcer
            .announce_assertive(&mut self.dom, "Save As dialog", self.now);
    }

    fn close_dialog(&mut self) {
        self.trap.deactivate(&mut self.dom);
        self.dialog_layer.deactivate();
    }

    /// Forward a keydown the way a browser host would: overlays first, then
    /// the focused widget.
    fn key(&mut self, key: Key, modifiers: Modifiers) {
        let target = self.dom.active_element();
        let mut ev = Event::key_down(key).with_modifiers(modifiers);
        if let Some(t) = target {
            ev = ev.with_target(t);
        }
        self.dialog_layer.handle_event(&mut ev, &self.dom);
        self.menu_layer.handle_event(&mut ev, &self.dom);
        self.trap.handle_event(&mut self.dom, &mut ev);
        if self.menu_layer.is_active() && !self.dialog_layer.is_active() {
            if !self.roving.handle_key_down(&mut self.dom, &mut ev) {
                let labels: Vec<TextItem> = self
                    .items
                    .iter()
                    .map(|&n| TextItem::from_dom(&self.dom, n))
                    .collect();
                self.typeahead
                    .set_last_match_index(self.roving.focused_index());
                self.typeahead.handle_key_down(&mut ev, &labels, self.now);
                if let Some(index) = self.typeahead.last_match_index() {
                    self.roving.set_focused_index(&mut self.dom, index, true);
                }
            }
        }
        self.run_commands();
    }

    fn pointer_down(&mut self, target: NodeId) {
        let mut ev = Event::pointer_down(target);
        self.dialog_layer.handle_event(&mut ev, &self.dom);
        self.menu_layer.handle_event(&mut ev, &self.dom);
        self.run_commands();
    }

    fn run_commands(&mut self) {
        let commands: Vec<Command> = self.commands.borrow_mut().drain(..).collect();
        for command in commands {
            match command {
                Command::CloseMenu => self.close_menu(),
                Command::CloseDialog => self.close_dialog(),
                Command::Activate(index) => {
                    println!("activated {:?}", LABELS[index]);
                    if LABELS[index] == "Save As" {
                        self.open_dialog();
                    }
                }
            }
        }
    }

    fn focused_label(&self) -> String {
        self.dom
            .active_element()
            .map(|n| self.dom.text_content(n))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("{:?}", self.dom.active_element()))
    }

    fn spoken(&self, politeness: Politeness) -> String {
        self.announcer
            .region(politeness)
            .map(|r| self.dom.text_content(r))
            .unwrap_or_default()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut app = App::new();

    // The button sits near the bottom of the viewport, so the menu flips up.
    app.open_menu();
    app.tick(50);
    println!(
        "focus: {}, polite region: {:?}",
        app.focused_label(),
        app.spoken(Politeness::Polite)
    );

    app.key(Key::ArrowDown, Modifiers::empty());
    println!("after ArrowDown: {}", app.focused_label());

    // Typeahead: "s" jumps to Save, a second "s" cycles to Save As.
    app.key(Key::Character('s'), Modifiers::empty());
    app.tick(100);
    app.key(Key::Character('s'), Modifiers::empty());
    println!("after typing s, s: {}", app.focused_label());

    // Home, then End: End skips the disabled Quit item and lands on Save As.
    app.key(Key::Home, Modifiers::empty());
    app.key(Key::End, Modifiers::empty());
    println!("after Home, End: {}", app.focused_label());

    // Enter on Save As opens the dialog with its own dismiss layer and trap.
    app.key(Key::Enter, Modifiers::empty());
    app.tick(0);
    println!("dialog open, focus on {:?}", app.dom.active_element());
    app.tick(50);
    println!("assertive region: {:?}", app.spoken(Politeness::Assertive));

    // The host moves focus between the edges; the trap wraps at them.
    let last = tacit_dom::focusable::get_last_focusable(&app.dom, app.dialog);
    if let Some(last) = last {
        app.dom.focus(last);
    }
    app.key(Key::Tab, Modifiers::empty());
    println!("Tab from Save wrapped to {:?}", app.dom.active_element());
    app.key(Key::Tab, Modifiers::SHIFT);
    println!("Shift+Tab wrapped back to {}", app.focused_label());

    // Escape closes only the dialog; the menu stays open underneath.
    app.key(Key::Escape, Modifiers::empty());
    println!(
        "after Escape: dialog {}, menu {}",
        app.dialog_layer.is_active(),
        app.menu_layer.is_active()
    );

    // Clicking the page closes the menu too.
    let body = app.dom.body();
    app.pointer_down(body);
    println!(
        "after click outside: menu {}, focus back on {}",
        app.menu_layer.is_active(),
        app.focused_label()
    );
    app.tick(2_000);
}
