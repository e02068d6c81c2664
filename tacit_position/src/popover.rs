// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::string::ToString;
use core::fmt;

use kurbo::Size;
use tacit_dom::geometry::boundary_rect;
use tacit_dom::{ApplyOptions, Dom, Event, EventKind, Keyframe, StyleApplier};

use crate::placement::{Placement, PositionOptions, PositionResult, Side, compute_position};

/// Class added to every positioned floating element.
pub const FLOATING_CLASS: &str = "tacit-floating";
/// Class for [`Strategy::Absolute`].
pub const ABSOLUTE_CLASS: &str = "tacit-floating-absolute";
/// Class for [`Strategy::Fixed`].
pub const FIXED_CLASS: &str = "tacit-floating-fixed";

/// CSS positioning scheme of the floating element.
///
/// The stylesheet maps the strategy classes to `position: absolute` or
/// `position: fixed`; the positioner never writes inline styles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `position: absolute`.
    #[default]
    Absolute,
    /// `position: fixed`.
    Fixed,
}

/// Configuration for [`Popover`].
pub struct PopoverConfig<D: Dom> {
    /// Preferred placement. Defaults to `bottom`.
    pub placement: Placement,
    /// Main-axis gap in pixels. Defaults to 8.
    pub offset: f64,
    /// Defaults to `true`.
    pub flip: bool,
    /// Defaults to `true`.
    pub shift: bool,
    /// Boundary padding in pixels. Defaults to 8.
    pub viewport_padding: f64,
    /// Defaults to [`Strategy::Absolute`].
    pub strategy: Strategy,
    /// Clip against this element instead of the viewport.
    pub boundary: Option<D::Node>,
    /// Arrow element inside the floating element.
    pub arrow: Option<D::Node>,
    /// Recompute on forwarded scroll and resize events while open. Defaults to `true`.
    pub auto_update: bool,
    /// Called with every computed position.
    pub on_position_change: Option<Box<dyn FnMut(&PositionResult)>>,
}

impl<D: Dom> Default for PopoverConfig<D> {
    fn default() -> Self {
        Self {
            placement: Placement::new(Side::Bottom),
            offset: 8.0,
            flip: true,
            shift: true,
            viewport_padding: 8.0,
            strategy: Strategy::Absolute,
            boundary: None,
            arrow: None,
            auto_update: true,
            on_position_change: None,
        }
    }
}

impl<D: Dom> fmt::Debug for PopoverConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopoverConfig")
            .field("placement", &self.placement)
            .field("offset", &self.offset)
            .field("flip", &self.flip)
            .field("shift", &self.shift)
            .field("viewport_padding", &self.viewport_padding)
            .field("strategy", &self.strategy)
            .field("boundary", &self.boundary)
            .field("arrow", &self.arrow)
            .field("auto_update", &self.auto_update)
            .finish_non_exhaustive()
    }
}

impl<D: Dom> PopoverConfig<D> {
    fn position_options(&self) -> PositionOptions {
        PositionOptions {
            placement: self.placement,
            offset: self.offset,
            flip: self.flip,
            shift: self.shift,
            padding: self.viewport_padding,
        }
    }
}

/// Positions a floating element against a reference element.
///
/// Nothing is cached between calls: every [`Popover::update`] reads the current
/// rects and recomputes from scratch. The result is applied to the floating
/// element as a `translate3d` through a [`StyleApplier`], so it works under a
/// strict style CSP.
pub struct Popover<D: Dom> {
    config: PopoverConfig<D>,
    reference: Option<D::Node>,
    floating: Option<D::Node>,
    open: bool,
    styles: StyleApplier<D>,
}

impl<D: Dom> fmt::Debug for Popover<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popover")
            .field("config", &self.config)
            .field("reference", &self.reference)
            .field("floating", &self.floating)
            .field("open", &self.open)
            .field("styles", &self.styles)
            .finish()
    }
}

impl<D: Dom> Popover<D> {
    /// Create a closed popover with no elements.
    pub fn new(config: PopoverConfig<D>) -> Self {
        Self {
            config,
            reference: None,
            floating: None,
            open: false,
            styles: StyleApplier::new(),
        }
    }

    /// The current configuration.
    pub fn config(&self) -> &PopoverConfig<D> {
        &self.config
    }

    /// Whether [`Popover::show`] was called more recently than [`Popover::hide`].
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The reference element.
    pub fn reference(&self) -> Option<D::Node> {
        self.reference
    }

    /// The floating element.
    pub fn floating(&self) -> Option<D::Node> {
        self.floating
    }

    /// Set or clear the reference element.
    pub fn set_reference(&mut self, reference: Option<D::Node>) {
        self.reference = reference;
    }

    /// Set or clear the floating element.
    ///
    /// The previous floating element loses its strategy classes and applied
    /// transform.
    pub fn set_floating(&mut self, dom: &mut D, floating: Option<D::Node>) {
        if self.floating == floating {
            return;
        }
        if let Some(old) = self.floating.take() {
            self.detach(dom, old);
        }
        self.floating = floating;
    }

    /// Mutate the configuration in place, repositioning if open.
    pub fn update_config(&mut self, dom: &mut D, f: impl FnOnce(&mut PopoverConfig<D>)) {
        let old_arrow = self.config.arrow;
        f(&mut self.config);
        if let Some(old) = old_arrow
            && self.config.arrow != old_arrow
        {
            self.styles.release(dom, old);
        }
        if self.open {
            self.update(dom);
        }
    }

    /// Mark the popover open and position it.
    pub fn show(&mut self, dom: &mut D) -> Option<PositionResult> {
        self.open = true;
        if let Some(floating) = self.floating {
            dom.set_attribute(floating, "data-state", "open");
        }
        tracing::debug!(floating = ?self.floating, "popover shown");
        self.update(dom)
    }

    /// Mark the popover closed.
    pub fn hide(&mut self, dom: &mut D) {
        self.open = false;
        if let Some(floating) = self.floating {
            dom.set_attribute(floating, "data-state", "closed");
        }
        tracing::debug!(floating = ?self.floating, "popover hidden");
    }

    /// Recompute and apply the position.
    ///
    /// Returns `None`, doing nothing, unless both elements are set.
    pub fn update(&mut self, dom: &mut D) -> Option<PositionResult> {
        let reference = self.reference?;
        let floating = self.floating?;

        let reference_rect = dom.bounding_rect(reference);
        let floating_size = dom.bounding_rect(floating).size();
        let boundary = boundary_rect(dom, self.config.boundary);
        let result = compute_position(
            reference_rect,
            floating_size,
            boundary,
            &self.config.position_options(),
        );

        dom.add_class(floating, FLOATING_CLASS);
        dom.toggle_class(
            floating,
            ABSOLUTE_CLASS,
            self.config.strategy == Strategy::Absolute,
        );
        dom.toggle_class(floating, FIXED_CLASS, self.config.strategy == Strategy::Fixed);
        dom.set_attribute(floating, "data-placement", &result.placement.to_string());

        let options = ApplyOptions::default();
        self.styles.apply(
            dom,
            floating,
            &Keyframe::translate(result.x, result.y),
            &options,
        );
        if let Some(arrow) = self.config.arrow {
            let size = dom.bounding_rect(arrow).size();
            let (ax, ay) = arrow_translation(&result, floating_size, size);
            self.styles
                .apply(dom, arrow, &Keyframe::translate(ax, ay), &options);
        }

        if let Some(cb) = self.config.on_position_change.as_mut() {
            cb(&result);
        }
        Some(result)
    }

    /// React to a forwarded window `scroll` or `resize`.
    ///
    /// Repositions an open popover when `auto_update` is on. The event is not
    /// marked.
    pub fn handle_event(&mut self, dom: &mut D, event: &Event<D::Node>) -> Option<PositionResult> {
        if !self.open || !self.config.auto_update {
            return None;
        }
        match event.kind {
            EventKind::Scroll | EventKind::Resize => self.update(dom),
            _ => None,
        }
    }

    /// Close, forget both elements, and cancel every applied transform.
    pub fn destroy(&mut self, dom: &mut D) {
        self.open = false;
        if let Some(old) = self.floating.take() {
            self.detach(dom, old);
        }
        self.reference = None;
        self.styles.clear(dom);
    }

    fn detach(&mut self, dom: &mut D, floating: D::Node) {
        self.styles.release(dom, floating);
        for class in [FLOATING_CLASS, ABSOLUTE_CLASS, FIXED_CLASS] {
            dom.remove_class(floating, class);
        }
        dom.remove_attribute(floating, "data-placement");
    }
}

/// Arrow offset inside the floating element: centered on the reference along
/// the cross axis, sitting outside the edge that faces the reference.
fn arrow_translation(result: &PositionResult, floating: Size, arrow: Size) -> (f64, f64) {
    match result.placement.side {
        Side::Bottom => (result.arrow - arrow.width * 0.5, -arrow.height),
        Side::Top => (result.arrow - arrow.width * 0.5, floating.height),
        Side::Right => (-arrow.width, result.arrow - arrow.height * 0.5),
        Side::Left => (floating.width, result.arrow - arrow.height * 0.5),
    }
}
