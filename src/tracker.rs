//! Scroll-synchronized active heading tracking.
//!
//! All state here is driven by the page's event loop: scroll events request at most one
//! recomputation per animation frame, clicks on outline entries start a programmatic scroll that
//! suspends tracking until it settles, and resizes are debounced. Time is a monotonic millisecond
//! clock supplied by the driver (`performance.now()` in the browser).

use crate::{
    config::OutlineConfig,
    heading::{Outline, OutlineEntry},
    render::OutlineTarget,
};

/// Read access to the page geometry. Distances are document pixels.
pub trait Viewport {
    /// Current vertical scroll offset of the page.
    fn scroll_offset(&self) -> f64;
    fn viewport_height(&self) -> f64;
    /// Document position of the top of the heading with `id`, if it is still on the page.
    fn heading_offset(&self, id: &str) -> Option<f64>;
    /// Top position and height of the article content.
    fn content_bounds(&self) -> Option<(f64, f64)>;
}

/// Find the active heading: scanning from the bottom-most heading upwards, the first one whose
/// position minus `lookback` is at or above the scroll offset.
pub fn active_heading<'a, F>(
    entries: &'a [OutlineEntry],
    scroll_offset: f64,
    lookback: f64,
    position_of: F,
) -> Option<&'a OutlineEntry>
where
    F: Fn(&str) -> Option<f64>,
{
    entries.iter().rev().find(|entry| {
        position_of(&entry.id).is_some_and(|top| scroll_offset >= top - lookback)
    })
}

/// A change of the active heading, to be mirrored onto a rendered outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveChange {
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl ActiveChange {
    /// Remove the marker from the previous entry and add it to the new one.
    pub fn apply<T: OutlineTarget + ?Sized>(&self, target: &mut T) {
        if let Some(previous) = &self.previous {
            target.set_active(previous, false);
        }
        if let Some(next) = &self.next {
            if !target.set_active(next, true) {
                tracing::debug!("No outline entry for active heading '{}'", next);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrollTracker {
    active: Option<String>,
    frame_pending: bool,
    settle_until: Option<f64>,
    lookback: f64,
    header_offset: f64,
    settle_duration: f64,
}

impl ScrollTracker {
    pub fn new(config: &OutlineConfig) -> ScrollTracker {
        ScrollTracker {
            active: None,
            frame_pending: false,
            settle_until: None,
            lookback: config.active_lookback,
            header_offset: config.header_offset,
            settle_duration: config.settle_duration_ms,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Record a scroll event. Returns `true` when the caller should request an animation frame;
    /// while one is already pending, further scroll events are dropped.
    pub fn request_frame(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Consume the pending frame. Returns `false` if no frame was requested.
    pub fn take_frame(&mut self) -> bool {
        std::mem::replace(&mut self.frame_pending, false)
    }

    /// Whether a programmatic scroll is still settling at `now`.
    pub fn is_settling(&self, now: f64) -> bool {
        self.settle_until.is_some_and(|until| now < until)
    }

    /// Recompute the active heading from the current scroll offset.
    ///
    /// Returns `None` when nothing changed, including while a programmatic scroll is settling.
    pub fn update_active<V: Viewport + ?Sized>(
        &mut self,
        now: f64,
        outline: &Outline,
        viewport: &V,
    ) -> Option<ActiveChange> {
        if self.is_settling(now) {
            return None;
        }
        self.settle_until = None;

        let next = active_heading(
            outline.entries(),
            viewport.scroll_offset(),
            self.lookback,
            |id| viewport.heading_offset(id),
        )
        .map(|entry| entry.id.clone());

        if next == self.active {
            return None;
        }
        tracing::debug!("Active heading changed: {:?} -> {:?}", self.active, next);
        let previous = std::mem::replace(&mut self.active, next.clone());
        Some(ActiveChange { previous, next })
    }

    /// Start a programmatic scroll to the heading with `id`.
    ///
    /// Returns the scroll target, leaving room for the fixed header, and suspends
    /// [`update_active`](Self::update_active) for the settle duration. An id that no longer
    /// resolves to a heading is ignored.
    pub fn navigate_to<V: Viewport + ?Sized>(
        &mut self,
        id: &str,
        now: f64,
        viewport: &V,
    ) -> Option<f64> {
        let Some(top) = viewport.heading_offset(id) else {
            tracing::debug!("Ignoring navigation to unknown heading '{}'", id);
            return None;
        };
        self.settle_until = Some(now + self.settle_duration);
        Some(top - self.header_offset)
    }
}

/// Trailing-edge debounce: only the most recently scheduled token fires.
#[derive(Debug, Clone, Default)]
pub struct Debounce {
    delay: f64,
    next_token: u64,
    pending: Option<u64>,
}

impl Debounce {
    pub fn new(delay: f64) -> Debounce {
        Debounce {
            delay,
            ..Default::default()
        }
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Supersede any pending token and return a new one to fire after [`delay`](Self::delay).
    pub fn schedule(&mut self) -> u64 {
        self.next_token += 1;
        self.pending = Some(self.next_token);
        self.next_token
    }

    /// Returns `true` exactly once, for the latest scheduled token.
    pub fn fire(&mut self, token: u64) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
