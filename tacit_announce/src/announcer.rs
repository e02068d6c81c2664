// Copyright 2025 the Tacit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::collections::VecDeque;
use alloc::string::String;
use core::fmt;

use tacit_dom::{Dom, TimerId, Timers};

/// Delay between blanking a region and writing the next message into it.
pub const SETTLE_DELAY_MS: u64 = 50;

/// Class the host stylesheet uses to hide the live regions visually.
pub const VISUALLY_HIDDEN_CLASS: &str = "tacit-visually-hidden";

/// `aria-live` level of an announcement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Politeness {
    /// Announced when the user is idle.
    #[default]
    Polite,
    /// Interrupts the user.
    Assertive,
}

impl Politeness {
    /// The `aria-live` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

/// A queued message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Announcement {
    /// The text to speak.
    pub message: String,
    /// Which region it goes to.
    pub politeness: Politeness,
    /// Higher drains first.
    pub priority: i32,
}

/// Per-call options for [`LiveRegionAnnouncer::announce`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnounceOptions {
    /// Defaults to [`Politeness::Polite`].
    pub politeness: Politeness,
    /// Defaults to 0.
    pub priority: i32,
    /// Drop everything still pending first.
    pub clear_previous: bool,
    /// Wait this long before queueing.
    pub delay_ms: u64,
}

/// Configuration for [`LiveRegionAnnouncer`].
pub struct AnnouncerConfig<D: Dom> {
    /// Parent of the live regions; the document body when `None`.
    pub container: Option<D::Node>,
    /// How long a message stays in its region. Defaults to 1000 ms.
    pub clear_delay_ms: u64,
    /// Gap between consecutive messages. Defaults to 150 ms.
    pub announcement_delay_ms: u64,
    /// Pending queue bound. Defaults to 20.
    pub max_queue_size: usize,
}

impl<D: Dom> Default for AnnouncerConfig<D> {
    fn default() -> Self {
        Self {
            container: None,
            clear_delay_ms: 1000,
            announcement_delay_ms: 150,
            max_queue_size: 20,
        }
    }
}

impl<D: Dom> fmt::Debug for AnnouncerConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnouncerConfig")
            .field("container", &self.container)
            .field("clear_delay_ms", &self.clear_delay_ms)
            .field("announcement_delay_ms", &self.announcement_delay_ms)
            .field("max_queue_size", &self.max_queue_size)
            .finish()
    }
}

#[derive(Copy, Clone, Debug)]
struct Regions<N> {
    polite: N,
    assertive: N,
}

impl<N: Copy> Regions<N> {
    fn get(&self, politeness: Politeness) -> N {
        match politeness {
            Politeness::Polite => self.polite,
            Politeness::Assertive => self.assertive,
        }
    }
}

#[derive(Clone, Debug)]
enum AnnounceTimer {
    /// A delayed announcement joins the queue.
    Enqueue(Announcement),
    /// Take the next pending announcement.
    Process,
    /// Write a message into its region after the settle delay.
    Render(Announcement),
    /// Blank a region after `clear_delay_ms`.
    Clear(Politeness),
}

/// Queues announcements and renders them one at a time into live regions.
///
/// The regions are created on the first accepted announcement and removed by
/// [`LiveRegionAnnouncer::destroy`].
pub struct LiveRegionAnnouncer<D: Dom> {
    config: AnnouncerConfig<D>,
    regions: Option<Regions<D::Node>>,
    pending: VecDeque<Announcement>,
    processing: bool,
    timers: Timers<AnnounceTimer>,
    // Pending `Clear` per region, replaced when a newer message renders.
    polite_clear: Option<TimerId>,
    assertive_clear: Option<TimerId>,
}

impl<D: Dom> fmt::Debug for LiveRegionAnnouncer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveRegionAnnouncer")
            .field("config", &self.config)
            .field("regions", &self.regions)
            .field("pending", &self.pending)
            .field("processing", &self.processing)
            .field("timers", &self.timers.len())
            .field("polite_clear", &self.polite_clear)
            .field("assertive_clear", &self.assertive_clear)
            .finish()
    }
}

impl<D: Dom> LiveRegionAnnouncer<D> {
    /// Create an announcer. No regions exist until the first announcement.
    pub fn new(config: AnnouncerConfig<D>) -> Self {
        Self {
            config,
            regions: None,
            pending: VecDeque::new(),
            processing: false,
            timers: Timers::new(),
            polite_clear: None,
            assertive_clear: None,
        }
    }

    /// Whether the live regions exist.
    pub fn is_initialized(&self) -> bool {
        self.regions.is_some()
    }

    /// The live region for `politeness`, once created.
    pub fn region(&self, politeness: Politeness) -> Option<D::Node> {
        self.regions.map(|r| r.get(politeness))
    }

    /// Whether a message is being rendered or spaced out.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Announcements waiting for their turn.
    pub fn pending(&self) -> impl Iterator<Item = &Announcement> {
        self.pending.iter()
    }

    /// The next time [`LiveRegionAnnouncer::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Queue `message`.
    ///
    /// Returns `false` when the message is blank or the full queue holds only
    /// higher-priority items.
    pub fn announce(
        &mut self,
        dom: &mut D,
        message: &str,
        options: AnnounceOptions,
        now: u64,
    ) -> bool {
        if message.trim().is_empty() {
            return false;
        }
        self.ensure_regions(dom);
        if options.clear_previous {
            self.pending.clear();
        }
        let announcement = Announcement {
            message: message.into(),
            politeness: options.politeness,
            priority: options.priority,
        };
        if options.delay_ms > 0 {
            self.timers.schedule(
                now,
                options.delay_ms,
                AnnounceTimer::Enqueue(announcement),
            );
            return true;
        }
        self.enqueue(announcement, now)
    }

    /// [`LiveRegionAnnouncer::announce`] with default options.
    pub fn announce_polite(&mut self, dom: &mut D, message: &str, now: u64) -> bool {
        self.announce(dom, message, AnnounceOptions::default(), now)
    }

    /// [`LiveRegionAnnouncer::announce`] into the assertive region.
    pub fn announce_assertive(&mut self, dom: &mut D, message: &str, now: u64) -> bool {
        let options = AnnounceOptions {
            politeness: Politeness::Assertive,
            ..AnnounceOptions::default()
        };
        self.announce(dom, message, options, now)
    }

    /// Drop everything pending, cancel all timers, and blank both regions.
    pub fn clear(&mut self, dom: &mut D) {
        self.pending.clear();
        self.timers.clear();
        self.polite_clear = None;
        self.assertive_clear = None;
        self.processing = false;
        if let Some(regions) = self.regions {
            dom.set_text_content(regions.polite, "");
            dom.set_text_content(regions.assertive, "");
        }
    }

    /// Mutate the configuration. A new container adopts existing regions.
    pub fn update_config(&mut self, dom: &mut D, f: impl FnOnce(&mut AnnouncerConfig<D>)) {
        let old_container = self.config.container;
        f(&mut self.config);
        if self.config.container != old_container
            && let Some(regions) = self.regions
        {
            let parent = self.container(dom);
            dom.append_child(parent, regions.polite);
            dom.append_child(parent, regions.assertive);
            tracing::debug!(?parent, "live regions moved");
        }
    }

    /// Clear and remove both regions. The next announcement recreates them.
    pub fn destroy(&mut self, dom: &mut D) {
        self.clear(dom);
        if let Some(regions) = self.regions.take() {
            dom.remove(regions.polite);
            dom.remove(regions.assertive);
            tracing::debug!("live regions removed");
        }
    }

    /// Fire due timers. Follow-up work is scheduled from each timer's due time.
    pub fn advance(&mut self, now: u64, dom: &mut D) {
        while let Some((due, timer)) = self.timers.pop_due(now) {
            match timer {
                AnnounceTimer::Enqueue(announcement) => {
                    self.enqueue(announcement, due);
                }
                AnnounceTimer::Process => self.process_next(dom, due),
                AnnounceTimer::Render(announcement) => self.render(dom, announcement, due),
                AnnounceTimer::Clear(politeness) => {
                    *self.clear_slot(politeness) = None;
                    if let Some(regions) = self.regions {
                        dom.set_text_content(regions.get(politeness), "");
                    }
                }
            }
        }
    }

    fn container(&self, dom: &D) -> D::Node {
        self.config.container.unwrap_or_else(|| dom.body())
    }

    fn ensure_regions(&mut self, dom: &mut D) {
        if self.regions.is_some() {
            return;
        }
        let parent = self.container(dom);
        let mut make = |politeness: Politeness| {
            let node = dom.create_element("div");
            dom.set_attribute(node, "aria-live", politeness.as_str());
            dom.set_attribute(node, "role", "status");
            dom.set_attribute(node, "aria-atomic", "true");
            dom.add_class(node, VISUALLY_HIDDEN_CLASS);
            dom.append_child(parent, node);
            node
        };
        let polite = make(Politeness::Polite);
        let assertive = make(Politeness::Assertive);
        self.regions = Some(Regions { polite, assertive });
        tracing::debug!(?parent, "live regions created");
    }

    fn enqueue(&mut self, announcement: Announcement, now: u64) -> bool {
        if self.pending.len() >= self.config.max_queue_size {
            // Oldest among the lowest priority.
            let lowest = self
                .pending
                .iter()
                .enumerate()
                .min_by_key(|(i, a)| (a.priority, *i))
                .map(|(i, a)| (i, a.priority));
            match lowest {
                Some((i, priority)) if priority <= announcement.priority => {
                    let evicted = self.pending.remove(i);
                    tracing::trace!(?evicted, "announcement queue full; evicted");
                }
                _ => {
                    tracing::trace!(?announcement, "announcement queue full; dropped");
                    return false;
                }
            }
        }
        self.pending.push_back(announcement);
        if !self.processing {
            self.processing = true;
            self.timers.schedule(now, 0, AnnounceTimer::Process);
        }
        true
    }

    fn process_next(&mut self, dom: &mut D, now: u64) {
        // Stable: equal priorities keep arrival order.
        self.pending
            .make_contiguous()
            .sort_by(|a, b| b.priority.cmp(&a.priority));
        let Some(next) = self.pending.pop_front() else {
            self.processing = false;
            return;
        };
        if let Some(regions) = self.regions {
            dom.set_text_content(regions.get(next.politeness), "");
        }
        self.timers
            .schedule(now, SETTLE_DELAY_MS, AnnounceTimer::Render(next));
    }

    fn render(&mut self, dom: &mut D, announcement: Announcement, now: u64) {
        let Some(regions) = self.regions else {
            return;
        };
        dom.set_text_content(regions.get(announcement.politeness), &announcement.message);
        tracing::debug!(
            politeness = announcement.politeness.as_str(),
            priority = announcement.priority,
            "announced"
        );
        let clear = self.timers.schedule(
            now,
            self.config.clear_delay_ms,
            AnnounceTimer::Clear(announcement.politeness),
        );
        if let Some(previous) = self.clear_slot(announcement.politeness).replace(clear) {
            self.timers.cancel(previous);
        }
        self.timers.schedule(
            now,
            self.config.announcement_delay_ms,
            AnnounceTimer::Process,
        );
    }

    fn clear_slot(&mut self, politeness: Politeness) -> &mut Option<TimerId> {
        match politeness {
            Politeness::Polite => &mut self.polite_clear,
            Politeness::Assertive => &mut self.assertive_clear,
        }
    }
}
