//! Drag/crop state machine.
//!
//! `Idle → Armed → Dragging → Idle`. A pointer-down over editable media arms
//! a session (measuring geometry, or waiting a bounded number of frames for
//! layout); the first pointer move starts dragging; pointer-up commits.
//! One [`DragController`] owns at most one session at a time.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::element::{EditableElement, ElementKind, ElementRef};
use crate::geometry::{compute_cover_bleed, Anchor, MediaGeometry, Point, Size};
use crate::style::{format_anchor, format_px, parse_position};
use crate::surface::{NodeIndex, RenderSurface};

/// One of the eight compass handles around a selected container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Top edge.
    N,
    /// Top-right corner.
    NE,
    /// Right edge.
    E,
    /// Bottom-right corner.
    SE,
    /// Bottom edge.
    S,
    /// Bottom-left corner.
    SW,
    /// Left edge.
    W,
    /// Top-left corner.
    NW,
}

impl ResizeHandle {
    /// All handles, clockwise from the top edge.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// How a pointer delta maps onto width and height growth.
    ///
    /// Edges move one axis, corners both. Handles on the left/top edge grow
    /// the container when dragged outward (negative delta).
    #[must_use]
    pub const fn factors(self) -> (f64, f64) {
        match self {
            Self::N => (0.0, -1.0),
            Self::NE => (1.0, -1.0),
            Self::E => (1.0, 0.0),
            Self::SE => (1.0, 1.0),
            Self::S => (0.0, 1.0),
            Self::SW => (-1.0, 1.0),
            Self::W => (-1.0, 0.0),
            Self::NW => (-1.0, -1.0),
        }
    }

    /// Lowercase compass name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::NE => "ne",
            Self::E => "e",
            Self::SE => "se",
            Self::S => "s",
            Self::SW => "sw",
            Self::W => "w",
            Self::NW => "nw",
        }
    }

    /// Parse a compass name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// What a drag gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragKind {
    /// Pan an `<img>` inside its box.
    ImagePan,
    /// Pan a `<video>` inside its box.
    VideoPan,
    /// Pan a container's background image.
    BackgroundPan,
    /// Resize the target with a handle.
    Resize(ResizeHandle),
}

impl DragKind {
    /// The pan gesture for a media element kind.
    #[must_use]
    pub const fn pan_for(kind: ElementKind) -> Option<Self> {
        match kind {
            ElementKind::Image => Some(Self::ImagePan),
            ElementKind::Video => Some(Self::VideoPan),
            ElementKind::Background => Some(Self::BackgroundPan),
            ElementKind::Title | ElementKind::Subtitle => None,
        }
    }

    /// Whether this gesture can act on an element kind.
    #[must_use]
    pub fn accepts(self, kind: ElementKind) -> bool {
        match self {
            Self::Resize(_) => kind.is_media(),
            pan => Self::pan_for(kind) == Some(pan),
        }
    }

    fn position_property(self) -> &'static str {
        match self {
            Self::BackgroundPan => "background-position",
            _ => "object-position",
        }
    }

    fn fit_declaration(self) -> (&'static str, &'static str) {
        match self {
            Self::BackgroundPan => ("background-size", "cover"),
            _ => ("object-fit", "cover"),
        }
    }

    fn default_anchor(self) -> Anchor {
        match self {
            Self::BackgroundPan => Anchor::TOP_LEFT,
            _ => Anchor::CENTER,
        }
    }

    /// Inline properties a gesture of this kind may write.
    fn touched_properties(self) -> Vec<&'static str> {
        match self {
            Self::Resize(_) => vec!["width", "height"],
            pan => vec![pan.position_property(), pan.fit_declaration().0],
        }
    }
}

/// Where the state machine is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragState {
    /// No session.
    #[default]
    Idle,
    /// Pointer is down; waiting for layout or for the first move.
    Armed,
    /// The pointer has moved; writes are live.
    Dragging,
}

/// Measurements a session drags against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Pan geometry plus the anchor the media started at.
    Pan {
        /// Cover-fit geometry.
        geometry: MediaGeometry,
        /// Anchor at pointer-down.
        anchor: Anchor,
    },
    /// Container size at pointer-down.
    Resize {
        /// Starting box size.
        start: Size,
    },
}

/// The one active gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// What the gesture does.
    pub kind: DragKind,
    /// Slide the target lives on.
    pub slide: usize,
    /// Target element.
    pub target: ElementRef,
    /// Pointer position at pointer-down.
    pub origin: Point,
    /// `None` while layout is still pending.
    pub measurement: Option<Measurement>,
    retries: u32,
    moved: bool,
    original: Vec<(&'static str, Option<String>)>,
    written: Vec<(String, String)>,
}

impl DragSession {
    /// Whether any pointer move changed the target.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.moved
    }
}

/// Outcome of a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragStart {
    /// Geometry measured; the session is armed.
    Started,
    /// Layout is not ready; the session waits for frame ticks.
    Deferred,
    /// Nothing started (busy, protected, wrong kind or missing target).
    Ignored,
}

/// Declarations a finished gesture left on its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragCommit {
    /// Slide the target lives on.
    pub slide: usize,
    /// Target element.
    pub target: ElementRef,
    /// What the gesture did.
    pub kind: DragKind,
    /// Final inline declarations, in write order.
    pub declarations: Vec<(String, String)>,
}

/// Owns the single drag session.
#[derive(Debug, Clone)]
pub struct DragController {
    session: Option<DragSession>,
    state: DragState,
    max_retries: u32,
    cover_epsilon: f64,
    min_dimension: f64,
}

impl DragController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            session: None,
            state: DragState::Idle,
            max_retries: config.layout_retry_frames,
            cover_epsilon: config.cover_epsilon,
            min_dimension: config.min_resize_dimension,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Whether a session is armed or dragging.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start a gesture on `element`.
    ///
    /// A pointer-down while another session is active is a no-op: the first
    /// session wins. Protected elements never start a session.
    pub fn pointer_down(
        &mut self,
        surface: &dyn RenderSurface,
        slide: usize,
        element: &EditableElement,
        kind: DragKind,
        origin: Point,
    ) -> DragStart {
        if let Some(active) = &self.session {
            tracing::debug!(
                "Pointer down ignored: drag session already active on slide {}",
                active.slide
            );
            return DragStart::Ignored;
        }
        if element.protected {
            tracing::debug!("Pointer down ignored: {} is protected", element.node_id());
            return DragStart::Ignored;
        }
        if !kind.accepts(element.kind) {
            return DragStart::Ignored;
        }
        let Some(node) = element.element.locate(surface) else {
            tracing::debug!("Pointer down ignored: {} not in surface", element.node_id());
            return DragStart::Ignored;
        };

        let original = kind
            .touched_properties()
            .into_iter()
            .map(|p| (p, surface.inline_style(node, p)))
            .collect();
        let measurement = self.measure(surface, node, kind);
        let start = if measurement.is_some() {
            DragStart::Started
        } else {
            tracing::debug!(
                "Layout not ready for {}; deferring drag geometry",
                element.node_id()
            );
            DragStart::Deferred
        };

        self.session = Some(DragSession {
            kind,
            slide,
            target: element.element.clone(),
            origin,
            measurement,
            retries: 0,
            moved: false,
            original,
            written: Vec::new(),
        });
        self.state = DragState::Armed;
        start
    }

    /// Retry pending measurement on a frame tick.
    ///
    /// Gives up after the configured number of frames.
    pub fn on_frame(&mut self, surface: &dyn RenderSurface) {
        let Some(session) = &self.session else {
            return;
        };
        if session.measurement.is_some() || session.target.surface != surface.id() {
            return;
        }
        let Some(node) = session.target.locate(surface) else {
            self.discard("target disappeared");
            return;
        };
        let kind = session.kind;
        let measurement = self.measure(surface, node, kind);
        let max_retries = self.max_retries;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match measurement {
            Some(m) => {
                tracing::debug!("Layout settled after {} frames", session.retries + 1);
                session.measurement = Some(m);
            }
            None => {
                session.retries += 1;
                if session.retries >= max_retries {
                    tracing::warn!(
                        "Abandoning drag on slide {}: no layout after {} frames",
                        session.slide,
                        session.retries
                    );
                    self.session = None;
                    self.state = DragState::Idle;
                }
            }
        }
    }

    /// Apply a pointer move. Returns whether the target was written.
    pub fn pointer_move(&mut self, surface: &mut dyn RenderSurface, point: Point) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if session.target.surface != surface.id() {
            self.discard("surface replaced");
            return false;
        }
        let Some(node) = session.target.locate(&*surface) else {
            self.discard("target disappeared");
            return false;
        };
        let Some(measurement) = session.measurement else {
            return false;
        };

        let dx = point.x - session.origin.x;
        let dy = point.y - session.origin.y;
        let still = dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON;
        if still && !session.moved {
            return false;
        }
        let kind = session.kind;
        let declarations = match measurement {
            Measurement::Pan { geometry, anchor } => {
                let offset = geometry.pan(dx, dy);
                let next = geometry.anchor_for(offset, anchor);
                tracing::trace!(
                    "Pan delta ({dx}, {dy}) -> offset ({}, {}) -> anchor {}",
                    offset.x,
                    offset.y,
                    format_anchor(next)
                );
                let (fit, cover) = kind.fit_declaration();
                vec![
                    (fit.to_string(), cover.to_string()),
                    (kind.position_property().to_string(), format_anchor(next)),
                ]
            }
            Measurement::Resize { start } => {
                let DragKind::Resize(handle) = kind else {
                    return false;
                };
                let (fx, fy) = handle.factors();
                let mut out = Vec::with_capacity(2);
                if fx.abs() > f64::EPSILON {
                    let width = (start.width + fx * dx).max(self.min_dimension);
                    out.push(("width".to_string(), format_px(width)));
                }
                if fy.abs() > f64::EPSILON {
                    let height = (start.height + fy * dy).max(self.min_dimension);
                    out.push(("height".to_string(), format_px(height)));
                }
                tracing::trace!("Resize {} delta ({dx}, {dy})", handle.as_str());
                out
            }
        };

        for (property, value) in &declarations {
            surface.set_style(node, property, value);
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !still {
            session.moved = true;
        }
        session.written = declarations;
        self.state = DragState::Dragging;
        true
    }

    /// Finish the gesture. Returns a commit only when something moved.
    pub fn pointer_up(&mut self) -> Option<DragCommit> {
        let session = self.session.take()?;
        self.state = DragState::Idle;
        if !session.moved {
            return None;
        }
        tracing::debug!(
            "Drag committed on slide {} ({})",
            session.slide,
            session.target.node_id
        );
        Some(DragCommit {
            slide: session.slide,
            target: session.target,
            kind: session.kind,
            declarations: session.written,
        })
    }

    /// Abort the gesture and restore the target's inline values.
    pub fn cancel(&mut self, surface: &mut dyn RenderSurface) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.state = DragState::Idle;
        let Some(node) = session.target.locate(&*surface) else {
            return;
        };
        for (property, value) in &session.original {
            match value {
                Some(v) => surface.set_style(node, property, v),
                None => surface.remove_style(node, property),
            }
        }
        tracing::debug!("Drag cancelled on slide {}", session.slide);
    }

    /// Drop the session without touching any surface.
    pub fn abandon(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("Drag session abandoned");
        }
        self.state = DragState::Idle;
    }

    /// Drop a session targeting `slide` (its surface is being replaced).
    pub fn invalidate_slide(&mut self, slide: usize) {
        if self.session.as_ref().is_some_and(|s| s.slide == slide) {
            self.discard("slide remounted");
        }
    }

    fn discard(&mut self, reason: &str) {
        if let Some(session) = self.session.take() {
            tracing::debug!("Drag session on slide {} discarded: {reason}", session.slide);
        }
        self.state = DragState::Idle;
    }

    fn measure(
        &self,
        surface: &dyn RenderSurface,
        node: NodeIndex,
        kind: DragKind,
    ) -> Option<Measurement> {
        let container = surface.rect(node).size();
        if container.is_empty() {
            return None;
        }
        if matches!(kind, DragKind::Resize(_)) {
            return Some(Measurement::Resize { start: container });
        }

        let natural = surface.natural_size(node);
        let display = compute_cover_bleed(natural, container, self.cover_epsilon)?;
        let overflow = Size::new(
            (display.width - container.width).max(0.0),
            (display.height - container.height).max(0.0),
        );
        let fallback = kind.default_anchor();
        let anchor = surface
            .computed_style(node, kind.position_property())
            .and_then(|v| parse_position(&v))
            .map_or(fallback, |p| p.resolve(overflow, fallback));
        let geometry = MediaGeometry::compute(natural, container, anchor, self.cover_epsilon)?;
        Some(Measurement::Pan { geometry, anchor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::discover;
    use crate::headless::MarkupSurface;
    use crate::protection::Unprotected;

    const MEDIA: &str = r#"<div style="width: 1200px; height: 800px">
<img src="photo.jpg" style="width: 400px; height: 300px">
<div style="width: 400px; height: 300px; background-image: url('bg.jpg')"></div>
<img src="logo.png" data-cs-protected style="width: 100px; height: 100px">
</div>"#;

    fn config() -> EngineConfig {
        EngineConfig {
            cover_epsilon: 0.0,
            layout_retry_frames: 3,
            ..EngineConfig::default()
        }
    }

    fn surface() -> MarkupSurface {
        MarkupSurface::parse(MEDIA)
            .with_media_size("photo.jpg", Size::new(800.0, 400.0))
            .with_media_size("bg.jpg", Size::new(800.0, 400.0))
    }

    fn element(surface: &MarkupSurface, id: &str) -> EditableElement {
        discover(surface, &Unprotected, &config())
            .elements
            .into_iter()
            .find(|e| e.node_id() == id)
            .expect("element discovered")
    }

    fn percent_x(position: &str) -> f64 {
        position
            .split_whitespace()
            .next()
            .and_then(|v| v.trim_end_matches('%').parse().ok())
            .expect("percentage position")
    }

    #[test]
    fn test_pan_right_moves_anchor_left() {
        let mut surface = surface();
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());

        let start = drag.pointer_down(&surface, 0, &image, DragKind::ImagePan, Point::new(10.0, 10.0));
        assert_eq!(start, DragStart::Started);
        assert_eq!(drag.state(), DragState::Armed);

        // 400x300 box, 800x400 media: display 600x300, overflow 200 on x.
        assert!(drag.pointer_move(&mut surface, Point::new(60.0, 10.0)));
        assert_eq!(drag.state(), DragState::Dragging);

        let node = NodeIndex(1);
        let position = surface
            .inline_style(node, "object-position")
            .expect("position written");
        assert_eq!(position, "25% 50%");
        assert_eq!(surface.inline_style(node, "object-fit").as_deref(), Some("cover"));

        let commit = drag.pointer_up().expect("moved gesture commits");
        assert_eq!(commit.slide, 0);
        assert_eq!(commit.kind, DragKind::ImagePan);
        assert!(commit
            .declarations
            .contains(&("object-position".to_string(), "25% 50%".to_string())));
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_pan_is_clamped_and_monotonic() {
        let mut surface = surface();
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());
        drag.pointer_down(&surface, 0, &image, DragKind::ImagePan, Point::new(0.0, 0.0));

        let mut last = 50.0;
        for x in [10.0, 50.0, 120.0, 500.0] {
            drag.pointer_move(&mut surface, Point::new(x, 0.0));
            let position = surface
                .inline_style(NodeIndex(1), "object-position")
                .expect("position written");
            let percent = percent_x(&position);
            assert!(percent <= last);
            assert!((0.0..=100.0).contains(&percent));
            last = percent;
        }
        assert!(last.abs() < f64::EPSILON);

        drag.pointer_move(&mut surface, Point::new(-10_000.0, 0.0));
        let position = surface
            .inline_style(NodeIndex(1), "object-position")
            .expect("position written");
        assert!((percent_x(&position) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_background_pan_forces_cover() {
        let mut surface = surface();
        let background = element(&surface, "background-0");
        let mut drag = DragController::new(&config());
        let start = drag.pointer_down(
            &surface,
            0,
            &background,
            DragKind::BackgroundPan,
            Point::new(0.0, 0.0),
        );
        assert_eq!(start, DragStart::Started);
        drag.pointer_move(&mut surface, Point::new(-100.0, 0.0));

        let node = NodeIndex(2);
        assert_eq!(
            surface.inline_style(node, "background-size").as_deref(),
            Some("cover")
        );
        // Default background anchor is 0% 0%; dragging left reveals the right side.
        assert_eq!(
            surface.inline_style(node, "background-position").as_deref(),
            Some("50% 0%")
        );
    }

    #[test]
    fn test_second_pointer_down_is_noop() {
        let surface = surface();
        let image = element(&surface, "image-0");
        let background = element(&surface, "background-0");
        let mut drag = DragController::new(&config());

        drag.pointer_down(&surface, 0, &image, DragKind::ImagePan, Point::new(0.0, 0.0));
        let second = drag.pointer_down(
            &surface,
            0,
            &background,
            DragKind::BackgroundPan,
            Point::new(5.0, 5.0),
        );
        assert_eq!(second, DragStart::Ignored);
        let session = drag.session().expect("first session kept");
        assert_eq!(session.target.node_id, "image-0");
    }

    #[test]
    fn test_protected_and_mismatched_targets_never_start() {
        let surface = surface();
        let guard = |src: &str| src.starts_with("logo");
        let logo = discover(&surface, &guard, &config())
            .elements
            .into_iter()
            .find(|e| e.source.as_deref() == Some("logo.png"))
            .expect("logo discovered");
        let mut drag = DragController::new(&config());
        assert_eq!(
            drag.pointer_down(&surface, 0, &logo, DragKind::ImagePan, Point::default()),
            DragStart::Ignored
        );

        let image = element(&surface, "image-0");
        assert_eq!(
            drag.pointer_down(&surface, 0, &image, DragKind::BackgroundPan, Point::default()),
            DragStart::Ignored
        );
        assert!(!drag.is_active());
    }

    #[test]
    fn test_click_commits_nothing() {
        let mut surface = surface();
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());
        drag.pointer_down(&surface, 0, &image, DragKind::ImagePan, Point::new(3.0, 3.0));
        drag.pointer_move(&mut surface, Point::new(3.0, 3.0));
        assert!(drag.pointer_up().is_none());
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_cancel_restores_inline_values() {
        let mut surface = surface();
        let node = NodeIndex(1);
        surface.set_style(node, "object-position", "left top");
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());
        drag.pointer_down(&surface, 0, &image, DragKind::ImagePan, Point::new(0.0, 0.0));
        drag.pointer_move(&mut surface, Point::new(-80.0, 0.0));
        assert_eq!(
            surface.inline_style(node, "object-position").as_deref(),
            Some("40% 0%")
        );

        drag.cancel(&mut surface);
        assert_eq!(
            surface.inline_style(node, "object-position").as_deref(),
            Some("left top")
        );
        assert!(surface.inline_style(node, "object-fit").is_none());
        assert_eq!(surface.inline_style(node, "width").as_deref(), Some("400px"));
        assert!(drag.pointer_up().is_none());
    }

    #[test]
    fn test_deferred_session_waits_for_layout() {
        let mut surface = surface().settle_after_frames(2);
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());

        let start = drag.pointer_down(&surface, 0, &image, DragKind::ImagePan, Point::new(0.0, 0.0));
        assert_eq!(start, DragStart::Deferred);
        assert!(!drag.pointer_move(&mut surface, Point::new(20.0, 0.0)));

        surface.on_frame();
        drag.on_frame(&surface);
        surface.on_frame();
        drag.on_frame(&surface);
        assert!(drag.session().and_then(|s| s.measurement).is_some());
        assert!(drag.pointer_move(&mut surface, Point::new(20.0, 0.0)));
    }

    #[test]
    fn test_deferred_session_abandoned_after_bound() {
        let surface = surface().settle_after_frames(100);
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());
        drag.pointer_down(&surface, 0, &image, DragKind::ImagePan, Point::default());
        for _ in 0..3 {
            drag.on_frame(&surface);
        }
        assert!(!drag.is_active());
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let mut surface = surface();
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());
        drag.pointer_down(
            &surface,
            0,
            &image,
            DragKind::Resize(ResizeHandle::SE),
            Point::new(400.0, 300.0),
        );
        drag.pointer_move(&mut surface, Point::new(450.0, -500.0));

        let node = NodeIndex(1);
        assert_eq!(surface.inline_style(node, "width").as_deref(), Some("450px"));
        assert_eq!(surface.inline_style(node, "height").as_deref(), Some("50px"));

        let commit = drag.pointer_up().expect("resize commits");
        assert_eq!(commit.declarations.len(), 2);
    }

    #[test]
    fn test_edge_handle_changes_one_axis() {
        let mut surface = surface();
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());
        drag.pointer_down(
            &surface,
            0,
            &image,
            DragKind::Resize(ResizeHandle::W),
            Point::new(0.0, 0.0),
        );
        drag.pointer_move(&mut surface, Point::new(-40.0, 90.0));
        assert_eq!(
            surface.inline_style(NodeIndex(1), "width").as_deref(),
            Some("440px")
        );
        assert_eq!(
            surface.inline_style(NodeIndex(1), "height").as_deref(),
            Some("300px")
        );
    }

    #[test]
    fn test_session_for_replaced_surface_is_discarded() {
        let surface = surface();
        let image = element(&surface, "image-0");
        let mut drag = DragController::new(&config());
        drag.pointer_down(&surface, 0, &image, DragKind::ImagePan, Point::default());

        let mut remounted = self::surface();
        assert!(!drag.pointer_move(&mut remounted, Point::new(50.0, 0.0)));
        assert!(remounted.inline_style(NodeIndex(1), "object-position").is_none());
        assert!(!drag.is_active());

        drag.pointer_down(&surface, 3, &image, DragKind::ImagePan, Point::default());
        drag.invalidate_slide(3);
        assert!(!drag.is_active());
    }

    #[test]
    fn test_handle_names() {
        assert_eq!(ResizeHandle::parse("NE"), Some(ResizeHandle::NE));
        assert_eq!(ResizeHandle::parse("middle"), None);
        assert_eq!(ResizeHandle::ALL.len(), 8);
    }
}
