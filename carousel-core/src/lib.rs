//! # Carousel Core
//!
//! Interactive media positioning and selection engine for the carousel
//! editor. Compiles to WASM for in-browser use.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             carousel-core.wasm              │
//! ├─────────────────────────────────────────────┤
//! │  Slides          │  Interaction             │
//! │  - Templates     │  - Hit testing           │
//! │  - Text markers  │  - Drag / crop / resize  │
//! │  - Discovery     │  - In-place text edits   │
//! ├─────────────────────────────────────────────┤
//! │  Edit Store      │  Render Surface          │
//! │  - Text / style  │  - Browser DOM (wasm)    │
//! │  - Placements    │  - Headless markup       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every slide is rendered into its own isolated [`RenderSurface`]. The
//! [`CarouselEditor`] owns the logical selection and the [`EditStore`], and
//! replays recorded edits whenever a surface is (re)mounted.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod discovery;
pub mod drag;
pub mod editor;
pub mod edits;
pub mod element;
pub mod error;
pub mod event;
pub mod export;
pub mod geometry;
pub mod headless;
pub mod inline_edit;
pub mod markup;
pub mod protection;
pub mod selection;
pub mod slide;
pub mod style;
pub mod surface;
pub mod template;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::EngineConfig;
pub use discovery::{augment_markup, discover, find_largest_visual, Discovery, LargestVisual};
pub use drag::{DragCommit, DragController, DragKind, DragStart, DragState, ResizeHandle};
pub use editor::{CarouselEditor, EventOutcome, MediaReplacement, MountReport};
pub use edits::{EditStore, Field, StyleProperty, TextStyle};
pub use element::{EditableElement, ElementKind, ElementRef};
pub use error::{EditorError, EditorResult};
pub use event::{InputEvent, KeyEvent, KeyModifiers, PointerEvent, PointerPhase};
pub use export::SlideExport;
pub use geometry::{Anchor, MediaGeometry, Point, Rect, Size};
pub use headless::MarkupSurface;
pub use inline_edit::{InlineEditState, TextCommit};
pub use protection::{MediaGuard, PatternGuard, Unprotected};
pub use selection::SelectionState;
pub use slide::{Slide, SlideContent};
pub use surface::{NodeIndex, RenderSurface, SurfaceId};
pub use template::{PlaceholderRenderer, SlideRenderer};

/// Carousel core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
