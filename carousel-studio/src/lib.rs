//! # Carousel Studio
//!
//! Command-line shell around `carousel-core`: talks to the generation and
//! image search service, renders decks onto headless surfaces, replays
//! scripted edits and exports one standalone HTML file per slide.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod pipeline;

pub use client::{CarouselResult, ClientError, MediaSource, StudioClient};
pub use pipeline::{
    build_deck, export_deck, fill_media, read_rows, read_templates, EditOp, EditScript,
    PipelineError, ScriptReport,
};

/// Carousel studio version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
