//! Shared test utilities for outline testing

use crate::{
    heading::{HeadingRecord, Outline},
    tracker::Viewport,
};
use std::collections::HashMap;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Headings with the given levels, labelled `Heading <index>` and without ids.
pub fn records(levels: &[u8]) -> Vec<HeadingRecord> {
    levels
        .iter()
        .enumerate()
        .map(|(index, level)| HeadingRecord::new(*level, &format!("Heading {index}")).unwrap())
        .collect()
}

/// Page geometry with headings at fixed document positions.
#[derive(Debug, Clone, Default)]
pub struct FixedViewport {
    pub scroll: f64,
    pub height: f64,
    pub positions: HashMap<String, f64>,
    pub content: Option<(f64, f64)>,
}

impl FixedViewport {
    /// Headings placed `gap` pixels apart, the first one at `first`.
    pub fn spaced(outline: &Outline, first: f64, gap: f64) -> FixedViewport {
        let positions = outline
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.id.clone(), first + gap * index as f64))
            .collect();
        FixedViewport {
            scroll: 0.0,
            height: 800.0,
            content: Some((first, gap * outline.len() as f64)),
            positions,
        }
    }

    pub fn scrolled_to(&self, offset: f64) -> FixedViewport {
        FixedViewport {
            scroll: offset,
            ..self.clone()
        }
    }

    /// The same page with heading `id` removed.
    pub fn without(&self, id: &str) -> FixedViewport {
        let mut viewport = self.clone();
        viewport.positions.remove(id);
        viewport
    }
}

impl Viewport for FixedViewport {
    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn viewport_height(&self) -> f64 {
        self.height
    }

    fn heading_offset(&self, id: &str) -> Option<f64> {
        self.positions.get(id).copied()
    }

    fn content_bounds(&self) -> Option<(f64, f64)> {
        self.content
    }
}
