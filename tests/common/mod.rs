//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use sky_toc::{heading::HeadingRecord, tracker::Viewport, Outline};
use std::collections::HashMap;

/// Headings with the given levels, labelled `Heading <index>` and without ids.
#[allow(dead_code)]
pub fn records(levels: &[u8]) -> Vec<HeadingRecord> {
    levels
        .iter()
        .enumerate()
        .map(|(index, level)| HeadingRecord::new(*level, &format!("Heading {index}")).unwrap())
        .collect()
}

/// Deterministic pseudo-random heading levels (xorshift), for property-style checks.
#[allow(dead_code)]
pub fn level_sequence(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 6) as u8 + 1
        })
        .collect()
}

/// A post page: headings 400px apart starting at 600px, 800px viewport.
#[derive(Debug, Clone)]
pub struct TestPage {
    pub scroll: f64,
    pub positions: HashMap<String, f64>,
}

#[allow(dead_code)]
impl TestPage {
    pub fn new(outline: &Outline) -> TestPage {
        TestPage {
            scroll: 0.0,
            positions: outline
                .entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| (entry.id.clone(), 600.0 + 400.0 * index as f64))
                .collect(),
        }
    }

    pub fn at(&mut self, scroll: f64) -> &TestPage {
        self.scroll = scroll;
        self
    }
}

impl Viewport for TestPage {
    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn viewport_height(&self) -> f64 {
        800.0
    }

    fn heading_offset(&self, id: &str) -> Option<f64> {
        self.positions.get(id).copied()
    }

    fn content_bounds(&self) -> Option<(f64, f64)> {
        Some((500.0, 400.0 * self.positions.len() as f64 + 200.0))
    }
}
