//! # sky-toc
//!
//! Table-of-contents builder and scroll-synchronized outline tracker for the Sky blog theme.
//!
//! ## Overview
//!
//! A post page's headings arrive as a flat, document-ordered sequence, each tagged with a level
//! from its `h1`..`h6` tag. sky-toc turns that sequence into a hierarchical outline, renders it as
//! nested navigation lists (desktop sidebar and mobile drawer), and keeps exactly one outline
//! entry marked `active` as the reader scrolls.
//!
//! ## Architecture
//!
//! - **[`heading`]**: `HeadingSource` seam, `HeadingNode` forest, stack-based [`Outline::build`]
//! - **[`render`]**: nested list markup and the `OutlineTarget` seam it is written into
//! - **[`tracker`]**: active-heading computation, frame coalescing, settle suspension, debounce
//! - **[`page`]**: `PostOutline`, the per-page component turning `PageEvent`s into `PageEffect`s
//! - **[`extract`]**: heading extraction from Markdown and HTML posts, with id write-back
//! - **[`config`]**: layout constants and page selectors
//!
//! ## Quick Start
//!
//! ```rust
//! use sky_toc::{heading::HeadingRecord, render::to_markup, Outline};
//!
//! # fn main() -> Result<(), sky_toc::TocError> {
//! let mut headings = vec![
//!     HeadingRecord::new(1, "Intro")?,
//!     HeadingRecord::new(2, "Setup")?.with_id("setup"),
//!     HeadingRecord::new(1, "Wrap-up")?,
//! ];
//! let outline = Outline::build(&mut headings).expect("at least one heading");
//!
//! assert_eq!(outline.roots().len(), 2);
//! assert_eq!(headings[0].id.as_deref(), Some("heading-0"));
//! assert!(to_markup(outline.roots()).contains(r##"href="#setup""##));
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **default**: outline building, rendering, tracking and extraction
//! - **bin**: the `sky-toc` command-line tool
//! - **wasm**: the browser driver, wiring the component to the live DOM

pub mod config;
pub mod error;
pub mod extract;
pub mod heading;
pub mod page;
pub mod render;
#[cfg(test)]
mod tests;
pub mod tracker;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::*;
pub use heading::{HeadingNode, Outline};
pub use page::{PageEffect, PageEvent, PostOutline};
