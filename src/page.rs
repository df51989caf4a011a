//! The post page's outline component.
//!
//! [`PostOutline`] is constructed once per page view from the scanned headings and the outline
//! targets that exist on the page, and is discarded on navigation. Drivers feed it
//! [`PageEvent`]s and carry out the [`PageEffect`]s it returns, which keeps every decision here
//! free of platform calls.

use crate::{
    config::OutlineConfig,
    heading::{HeadingSource, Outline},
    render::{render, OutlineTarget},
    tracker::{Debounce, ScrollTracker, Viewport},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageEvent {
    Scroll,
    AnimationFrame,
    Resize,
    /// A debounced resize timer fired.
    ResizeSettled(u64),
    /// An outline link was clicked; `in_drawer` when it came from the mobile drawer.
    LinkClicked { id: String, in_drawer: bool },
    ToggleDrawer,
    CloseDrawer,
    OverlayClicked,
    KeyDown(String),
    BackToTop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageEffect {
    RequestAnimationFrame,
    /// Smooth-scroll the page to this document offset.
    ScrollTo { top: f64 },
    /// Deliver `event` back to the component after `delay_ms`.
    Schedule { delay_ms: f64, event: PageEvent },
    /// Hide the desktop sidebar and the mobile drawer toggle.
    HideOutline,
    SetDrawerOpen(bool),
    LockBodyScroll(bool),
    /// Reading progress in percent, `0.0..=100.0`.
    SetProgress(f64),
    SetBackToTopVisible(bool),
}

/// Which optional page elements the driver found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageElements {
    /// Toggle button, drawer and overlay are all present.
    pub drawer_controls: bool,
    pub progress_bar: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MobileDrawer {
    enabled: bool,
    open: bool,
}

impl MobileDrawer {
    /// Returns the effects of moving to `open`, or nothing when already there.
    fn set_open(&mut self, open: bool) -> Vec<PageEffect> {
        if !self.enabled || self.open == open {
            return Vec::new();
        }
        self.open = open;
        vec![PageEffect::SetDrawerOpen(open), PageEffect::LockBodyScroll(open)]
    }
}

/// Reading progress through the article in percent.
///
/// Reading starts when the article top is `start_ratio` of the viewport below the top edge and
/// ends when its bottom is `end_ratio` of the viewport below it.
pub fn reading_progress(
    scroll_offset: f64,
    viewport_height: f64,
    (content_top, content_height): (f64, f64),
    start_ratio: f64,
    end_ratio: f64,
) -> f64 {
    let start = content_top - viewport_height * start_ratio;
    let end = content_top + content_height - viewport_height * end_ratio;
    if scroll_offset <= start {
        return 0.0;
    }
    let distance = end - start;
    if distance == 0.0 {
        return 100.0;
    }
    ((scroll_offset - start) / distance * 100.0).clamp(0.0, 100.0)
}

pub struct PostOutline<T: OutlineTarget> {
    config: OutlineConfig,
    outline: Option<Outline>,
    desktop: Option<T>,
    mobile: Option<T>,
    tracker: ScrollTracker,
    resize: Debounce,
    drawer: MobileDrawer,
    progress_bar: bool,
    back_to_top_visible: bool,
}

impl<T: OutlineTarget> PostOutline<T> {
    /// Build the outline from `headings` and render it into whichever targets exist.
    ///
    /// Without headings or without a desktop target the outline stays unrendered, and
    /// [`start`](Self::start) asks the driver to hide it.
    pub fn new<H: HeadingSource>(
        config: OutlineConfig,
        headings: &mut [H],
        desktop: Option<T>,
        mobile: Option<T>,
        elements: PageElements,
    ) -> PostOutline<T> {
        let mut desktop = desktop;
        let mut mobile = mobile;
        let outline = match desktop.as_mut() {
            Some(desktop) => Outline::build(headings).inspect(|outline| {
                render(outline.roots(), desktop);
                match mobile.as_mut() {
                    Some(mobile) => render(outline.roots(), mobile),
                    None => tracing::debug!("No mobile outline list, rendering desktop only"),
                }
            }),
            None => {
                tracing::debug!("No outline list on the page, outline disabled");
                None
            }
        };

        PostOutline {
            tracker: ScrollTracker::new(&config),
            resize: Debounce::new(config.resize_debounce_ms),
            drawer: MobileDrawer {
                enabled: elements.drawer_controls,
                open: false,
            },
            progress_bar: elements.progress_bar,
            back_to_top_visible: false,
            outline,
            desktop,
            mobile,
            config,
        }
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    pub fn desktop(&self) -> Option<&T> {
        self.desktop.as_ref()
    }

    pub fn mobile(&self) -> Option<&T> {
        self.mobile.as_ref()
    }

    pub fn active(&self) -> Option<&str> {
        self.tracker.active()
    }

    pub fn is_drawer_open(&self) -> bool {
        self.drawer.open
    }

    /// Initial effects once the page is mounted.
    pub fn start<V: Viewport + ?Sized>(&mut self, now: f64, viewport: &V) -> Vec<PageEffect> {
        let mut effects = Vec::new();
        if self.outline.is_none() {
            if let Some(desktop) = self.desktop.as_mut() {
                desktop.set_visible(false);
            }
            effects.push(PageEffect::HideOutline);
        }
        self.refresh_active(now, viewport);
        effects.extend(self.progress(viewport));
        effects.extend(self.back_to_top(viewport));
        effects
    }

    pub fn handle<V: Viewport + ?Sized>(
        &mut self,
        event: PageEvent,
        now: f64,
        viewport: &V,
    ) -> Vec<PageEffect> {
        match event {
            PageEvent::Scroll => {
                let mut effects = Vec::new();
                if self.tracker.request_frame() {
                    effects.push(PageEffect::RequestAnimationFrame);
                }
                effects.extend(self.back_to_top(viewport));
                effects
            }
            PageEvent::AnimationFrame => {
                if !self.tracker.take_frame() {
                    return Vec::new();
                }
                self.refresh_active(now, viewport);
                self.progress(viewport).into_iter().collect()
            }
            PageEvent::Resize => {
                let token = self.resize.schedule();
                vec![PageEffect::Schedule {
                    delay_ms: self.resize.delay(),
                    event: PageEvent::ResizeSettled(token),
                }]
            }
            PageEvent::ResizeSettled(token) => {
                if self.resize.fire(token) {
                    self.refresh_active(now, viewport);
                }
                Vec::new()
            }
            PageEvent::LinkClicked { id, in_drawer } => {
                let mut effects = Vec::new();
                if self.outline.as_ref().is_some_and(|o| o.contains(&id)) {
                    if let Some(top) = self.tracker.navigate_to(&id, now, viewport) {
                        effects.push(PageEffect::ScrollTo { top });
                    }
                } else {
                    tracing::debug!("Ignoring click on stale outline entry '{}'", id);
                }
                if in_drawer {
                    effects.extend(self.drawer.set_open(false));
                }
                effects
            }
            PageEvent::ToggleDrawer => {
                let open = !self.drawer.open;
                self.drawer.set_open(open)
            }
            PageEvent::CloseDrawer | PageEvent::OverlayClicked => self.drawer.set_open(false),
            PageEvent::KeyDown(key) if key == "Escape" => self.drawer.set_open(false),
            PageEvent::KeyDown(_) => Vec::new(),
            PageEvent::BackToTop => vec![PageEffect::ScrollTo { top: 0.0 }],
        }
    }

    fn refresh_active<V: Viewport + ?Sized>(&mut self, now: f64, viewport: &V) {
        let (Some(outline), Some(desktop)) = (self.outline.as_ref(), self.desktop.as_mut()) else {
            return;
        };
        if let Some(change) = self.tracker.update_active(now, outline, viewport) {
            change.apply(desktop);
        }
    }

    fn progress<V: Viewport + ?Sized>(&self, viewport: &V) -> Option<PageEffect> {
        if !self.progress_bar {
            return None;
        }
        let bounds = viewport.content_bounds()?;
        Some(PageEffect::SetProgress(reading_progress(
            viewport.scroll_offset(),
            viewport.viewport_height(),
            bounds,
            self.config.progress_start_ratio,
            self.config.progress_end_ratio,
        )))
    }

    fn back_to_top<V: Viewport + ?Sized>(&mut self, viewport: &V) -> Option<PageEffect> {
        let visible = viewport.scroll_offset() > self.config.back_to_top_threshold;
        if visible == self.back_to_top_visible {
            return None;
        }
        self.back_to_top_visible = visible;
        Some(PageEffect::SetBackToTopVisible(visible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_starts_at_zero_and_clamps_at_hundred() {
        // start = 1000 - 300 = 700, end = 1000 + 2000 - 700 = 2300
        let bounds = (1000.0, 2000.0);
        assert_eq!(reading_progress(0.0, 1000.0, bounds, 0.3, 0.7), 0.0);
        assert_eq!(reading_progress(700.0, 1000.0, bounds, 0.3, 0.7), 0.0);
        assert_eq!(reading_progress(1500.0, 1000.0, bounds, 0.3, 0.7), 50.0);
        assert_eq!(reading_progress(9000.0, 1000.0, bounds, 0.3, 0.7), 100.0);
    }

    #[test]
    fn article_shorter_than_reading_window_shows_no_progress() {
        // start = 100 - 300 = -200, end = 100 + 50 - 700 = -550
        assert_eq!(reading_progress(0.0, 1000.0, (100.0, 50.0), 0.3, 0.7), 0.0);
        assert_eq!(reading_progress(5000.0, 1000.0, (100.0, 50.0), 0.3, 0.7), 0.0);
    }

    #[test]
    fn zero_reading_distance_is_complete_once_started() {
        // start = 1000 - 300 = 700, end = 1000 + 400 - 700 = 700
        assert_eq!(reading_progress(700.0, 1000.0, (1000.0, 400.0), 0.3, 0.7), 0.0);
        assert_eq!(reading_progress(701.0, 1000.0, (1000.0, 400.0), 0.3, 0.7), 100.0);
    }

    #[test]
    fn drawer_ignores_requests_when_controls_missing() {
        let mut drawer = MobileDrawer::default();
        assert!(drawer.set_open(true).is_empty());
        assert!(!drawer.open);
    }
}
