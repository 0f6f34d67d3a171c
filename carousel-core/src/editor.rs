//! The editor facade.
//!
//! [`CarouselEditor`] owns the deck, the mounted surfaces and every piece of
//! interaction state, and exposes the operations a host shell drives:
//! mounting slides, routing input, selection, edits, media replacement and
//! export.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::discovery::{discover, find_largest_visual, Discovery, LargestVisual};
use crate::drag::{DragCommit, DragController, DragKind, DragStart, DragState};
use crate::edits::{EditStore, Field, StyleProperty, TextStyle};
use crate::element::{EditableElement, ElementKind, ID_ATTR};
use crate::error::{EditorError, EditorResult};
use crate::event::{InputEvent, KeyEvent, PointerEvent, PointerPhase};
use crate::export::SlideExport;
use crate::geometry::Point;
use crate::headless::MarkupSurface;
use crate::inline_edit::{InlineEditController, InlineEditState, TextCommit};
use crate::protection::MediaGuard;
use crate::selection::{SelectionManager, SelectionState};
use crate::slide::{Slide, SlideContent};
use crate::surface::{RenderSurface, SurfaceId, SurfaceMap};
use crate::template::{PlaceholderRenderer, SlideRenderer};

/// File extensions treated as video when replacing media.
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mov", ".m4v", ".ogv", ".ogg"];

/// What mounting a slide found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountReport {
    /// The new surface's identity.
    pub surface: SurfaceId,
    /// Editable elements discovered so far.
    pub elements: usize,
    /// Background discovery is waiting for layout.
    pub layout_pending: bool,
}

/// Result of a media replacement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MediaReplacement {
    /// The URL was recorded and written to the target.
    Replaced {
        /// Target identifier.
        node_id: String,
        /// Target kind.
        kind: ElementKind,
    },
    /// The target is protected or cannot show this kind of media.
    Refused {
        /// Target identifier.
        node_id: String,
    },
    /// Nothing on the slide can take media.
    NoTarget,
}

/// What an input event did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum EventOutcome {
    /// Nothing happened.
    Ignored,
    /// The selection changed.
    Selected(Option<ElementKind>),
    /// A drag session started or is waiting for layout.
    DragStarted(DragStart),
    /// The dragged target was updated.
    Dragged,
    /// A drag finished and its placement was recorded.
    DragCommitted(DragCommit),
    /// A drag was cancelled and its target restored.
    DragCancelled,
    /// In-place text editing started, possibly committing an earlier edit.
    EditStarted(Option<TextCommit>),
    /// In-place text editing ended and the text was recorded.
    TextCommitted(TextCommit),
    /// A frame tick was processed.
    Frame,
}

struct Mount {
    discovery: Discovery,
    retries_left: u32,
}

/// Interactive editor over a deck of slides.
pub struct CarouselEditor {
    config: EngineConfig,
    guard: Box<dyn MediaGuard>,
    renderer: Box<dyn SlideRenderer>,
    slides: Vec<Slide>,
    surfaces: SurfaceMap,
    mounts: BTreeMap<usize, Mount>,
    drag: DragController,
    selection: SelectionManager,
    inline: InlineEditController,
    store: EditStore,
}

impl std::fmt::Debug for CarouselEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselEditor")
            .field("slides", &self.slides.len())
            .field("mounted", &self.surfaces.keys().collect::<Vec<_>>())
            .field("drag", &self.drag.state())
            .field("selection", &self.selection.state())
            .finish_non_exhaustive()
    }
}

impl CarouselEditor {
    /// Create an editor with an empty deck.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: EngineConfig) -> EditorResult<Self> {
        config.validate()?;
        let guard = config.guard()?;
        tracing::debug!("Editor created with {} protected-media patterns", guard.len());
        Ok(Self {
            drag: DragController::new(&config),
            config,
            guard: Box::new(guard),
            renderer: Box::new(PlaceholderRenderer),
            slides: Vec::new(),
            surfaces: SurfaceMap::new(),
            mounts: BTreeMap::new(),
            selection: SelectionManager::new(),
            inline: InlineEditController::new(),
            store: EditStore::new(),
        })
    }

    /// Replace the protected-media predicate.
    #[must_use]
    pub fn with_guard(mut self, guard: impl MediaGuard + 'static) -> Self {
        self.guard = Box::new(guard);
        self
    }

    /// Replace the slide renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl SlideRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recorded edits.
    #[must_use]
    pub fn store(&self) -> &EditStore {
        &self.store
    }

    /// The deck.
    #[must_use]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// One slide.
    #[must_use]
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Render a new deck, dropping every surface and edit of the old one.
    pub fn load_deck(&mut self, templates: &[String], rows: &[SlideContent]) -> usize {
        let rendered = self.renderer.render_all_slides(templates, rows);
        self.slides = rendered
            .into_iter()
            .zip(rows.iter().cloned())
            .enumerate()
            .map(|(index, (markup, content))| {
                let template = templates[index % templates.len()].clone();
                Slide::from_markup(index, template, content, markup)
            })
            .collect();
        self.surfaces.clear();
        self.mounts.clear();
        self.drag.abandon();
        self.inline = InlineEditController::new();
        self.selection = SelectionManager::new();
        self.store = EditStore::new();
        tracing::info!("Loaded deck with {} slides", self.slides.len());
        self.slides.len()
    }

    /// Append an already rendered slide. Its index is reassigned to its
    /// position in the deck.
    pub fn push_slide(&mut self, mut slide: Slide) -> usize {
        slide.index = self.slides.len();
        self.slides.push(slide);
        self.slides.len() - 1
    }

    /// Re-render one slide with new content. Mounted surfaces keep showing
    /// the old markup until the host remounts them.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SlideNotFound`] for an unknown index.
    pub fn set_slide_content(&mut self, index: usize, content: SlideContent) -> EditorResult<()> {
        let slide = self
            .slides
            .get_mut(index)
            .ok_or(EditorError::SlideNotFound(index))?;
        slide.set_content(content, self.renderer.as_ref());
        tracing::debug!("Slide {index} re-rendered; remount to apply");
        Ok(())
    }

    /// Attach a freshly created surface showing a slide.
    ///
    /// Any previous surface for the slide is dropped along with drag and edit
    /// sessions bound to it (an open text edit is committed first). Discovery
    /// tags the new surface and every recorded edit is replayed before it
    /// becomes interactive.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SlideNotFound`] for an unknown index.
    pub fn mount_slide(
        &mut self,
        index: usize,
        mut surface: Box<dyn RenderSurface>,
    ) -> EditorResult<MountReport> {
        if index >= self.slides.len() {
            return Err(EditorError::SlideNotFound(index));
        }
        if self.inline.is_editing_slide(index) {
            self.inline.finish(&mut self.surfaces, &mut self.store.content);
        }
        self.drag.invalidate_slide(index);

        let discovery = discover(surface.as_ref(), self.guard.as_ref(), &self.config);
        discovery.apply_tags(surface.as_mut());
        self.selection
            .resync(surface.as_mut(), &discovery.elements, index, &self.store);

        let report = MountReport {
            surface: surface.id(),
            elements: discovery.elements.len(),
            layout_pending: discovery.needs_layout,
        };
        tracing::info!(
            "Mounted slide {index} ({} editable elements{})",
            report.elements,
            if report.layout_pending {
                ", layout pending"
            } else {
                ""
            }
        );
        self.surfaces.insert(index, surface);
        self.mounts.insert(
            index,
            Mount {
                retries_left: if discovery.needs_layout {
                    self.config.layout_retry_frames
                } else {
                    0
                },
                discovery,
            },
        );
        Ok(report)
    }

    /// Mount a slide on a headless surface built from its augmented markup.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SlideNotFound`] for an unknown index.
    pub fn mount_headless(
        &mut self,
        index: usize,
        configure: impl FnOnce(MarkupSurface) -> MarkupSurface,
    ) -> EditorResult<MountReport> {
        let slide = self
            .slides
            .get(index)
            .ok_or(EditorError::SlideNotFound(index))?;
        let surface = configure(MarkupSurface::parse(slide.augmented()));
        self.mount_slide(index, Box::new(surface))
    }

    /// Detach a slide's surface. Returns whether one was mounted.
    pub fn unmount_slide(&mut self, index: usize) -> bool {
        if self.inline.is_editing_slide(index) {
            self.inline.finish(&mut self.surfaces, &mut self.store.content);
        }
        self.drag.invalidate_slide(index);
        self.mounts.remove(&index);
        self.surfaces.remove(&index).is_some()
    }

    /// Slides with a mounted surface.
    #[must_use]
    pub fn mounted_slides(&self) -> Vec<usize> {
        self.surfaces.keys().copied().collect()
    }

    /// A mounted slide's surface.
    #[must_use]
    pub fn surface(&self, index: usize) -> Option<&dyn RenderSurface> {
        self.surfaces.get(&index).map(|s| &**s)
    }

    /// Editable elements discovered on a mounted slide.
    #[must_use]
    pub fn elements(&self, index: usize) -> &[EditableElement] {
        self.mounts
            .get(&index)
            .map_or(&[][..], |m| m.discovery.elements.as_slice())
    }

    /// Whether background discovery on a slide is still waiting for layout.
    #[must_use]
    pub fn layout_pending(&self, index: usize) -> bool {
        self.mounts
            .get(&index)
            .is_some_and(|m| m.discovery.needs_layout)
    }

    /// Drag state machine position.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    /// Inline text edit state.
    #[must_use]
    pub fn inline_state(&self) -> &InlineEditState {
        self.inline.state()
    }

    /// Advance one animation frame: tick every surface, retry deferred drag
    /// geometry and deferred background discovery.
    pub fn on_frame(&mut self) {
        for surface in self.surfaces.values_mut() {
            surface.on_frame();
        }
        if let Some(slide) = self.drag.session().map(|s| s.slide) {
            match self.surfaces.get(&slide) {
                Some(surface) => self.drag.on_frame(surface.as_ref()),
                None => self.drag.abandon(),
            }
        }
        let pending: Vec<usize> = self
            .mounts
            .iter()
            .filter(|(_, m)| m.discovery.needs_layout)
            .map(|(index, _)| *index)
            .collect();
        for index in pending {
            self.retry_discovery(index);
        }
    }

    fn retry_discovery(&mut self, index: usize) {
        let (Some(surface), Some(mount)) =
            (self.surfaces.get_mut(&index), self.mounts.get_mut(&index))
        else {
            return;
        };
        let mut discovery = discover(surface.as_ref(), self.guard.as_ref(), &self.config);
        discovery.apply_tags(surface.as_mut());
        mount.retries_left = mount.retries_left.saturating_sub(1);

        if discovery.needs_layout && mount.retries_left > 0 {
            mount.discovery = discovery;
            return;
        }
        if discovery.needs_layout {
            tracing::debug!(
                "Slide {index}: layout never settled; keeping {} elements",
                discovery.elements.len()
            );
            discovery.needs_layout = false;
        }
        mount.discovery = discovery;
        self.selection
            .resync(surface.as_mut(), &mount.discovery.elements, index, &self.store);
    }

    /// Route one input event.
    pub fn handle_event(&mut self, event: &InputEvent) -> EventOutcome {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer),
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Blur { slide } => self
                .inline
                .blur(*slide, &mut self.surfaces, &mut self.store.content)
                .map_or(EventOutcome::Ignored, EventOutcome::TextCommitted),
            InputEvent::Frame => {
                self.on_frame();
                EventOutcome::Frame
            }
        }
    }

    fn handle_pointer(&mut self, event: &PointerEvent) -> EventOutcome {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event),
            PointerPhase::Move => self.pointer_move(event.point()),
            PointerPhase::Up => self.pointer_up(),
            PointerPhase::Cancel => self.cancel_drag(),
            PointerPhase::DoubleClick => self.double_click(event),
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent) -> EventOutcome {
        if self.drag.is_active() {
            tracing::debug!("Pointer down ignored: drag in progress");
            return EventOutcome::Ignored;
        }
        let slide = event.slide;
        if !self.surfaces.contains_key(&slide) {
            tracing::debug!("Pointer down ignored: slide {slide} is not mounted");
            return EventOutcome::Ignored;
        }
        let point = event.point();

        if let Some(handle) = event.handle {
            let elements = self.elements(slide);
            let Some(target) = self
                .selection
                .selected_element(slide, elements)
                .filter(|e| e.kind.is_media())
                .cloned()
            else {
                return EventOutcome::Ignored;
            };
            return self.start_drag(slide, &target, DragKind::Resize(handle), point);
        }

        let Some(hit) = self.hit_test(slide, point) else {
            let elements = self
                .mounts
                .get(&slide)
                .map_or(&[][..], |m| m.discovery.elements.as_slice());
            self.selection
                .select(&mut self.surfaces, elements, slide, None);
            return EventOutcome::Selected(None);
        };

        let elements = self
            .mounts
            .get(&slide)
            .map_or(&[][..], |m| m.discovery.elements.as_slice());
        self.selection
            .select_element(&mut self.surfaces, elements, slide, &hit);
        match DragKind::pan_for(hit.kind) {
            Some(kind) => self.start_drag(slide, &hit, kind, point),
            None => EventOutcome::Selected(Some(hit.kind)),
        }
    }

    fn start_drag(
        &mut self,
        slide: usize,
        target: &EditableElement,
        kind: DragKind,
        point: Point,
    ) -> EventOutcome {
        let Some(surface) = self.surfaces.get(&slide) else {
            return EventOutcome::Ignored;
        };
        match self
            .drag
            .pointer_down(surface.as_ref(), slide, target, kind, point)
        {
            DragStart::Ignored => EventOutcome::Selected(Some(target.kind)),
            start => EventOutcome::DragStarted(start),
        }
    }

    fn pointer_move(&mut self, point: Point) -> EventOutcome {
        let Some(slide) = self.drag.session().map(|s| s.slide) else {
            return EventOutcome::Ignored;
        };
        let Some(surface) = self.surfaces.get_mut(&slide) else {
            self.drag.abandon();
            return EventOutcome::Ignored;
        };
        if self.drag.pointer_move(surface.as_mut(), point) {
            EventOutcome::Dragged
        } else {
            EventOutcome::Ignored
        }
    }

    fn pointer_up(&mut self) -> EventOutcome {
        match self.drag.pointer_up() {
            Some(commit) => {
                self.store
                    .placements
                    .commit(commit.slide, &commit.target.node_id, &commit.declarations);
                EventOutcome::DragCommitted(commit)
            }
            None => EventOutcome::Ignored,
        }
    }

    fn cancel_drag(&mut self) -> EventOutcome {
        let Some(slide) = self.drag.session().map(|s| s.slide) else {
            return EventOutcome::Ignored;
        };
        match self.surfaces.get_mut(&slide) {
            Some(surface) => self.drag.cancel(surface.as_mut()),
            None => self.drag.abandon(),
        }
        EventOutcome::DragCancelled
    }

    fn double_click(&mut self, event: &PointerEvent) -> EventOutcome {
        let Some(hit) = self
            .hit_test(event.slide, event.point())
            .filter(|e| e.kind.is_text())
        else {
            return EventOutcome::Ignored;
        };
        let (previous, started) = self.inline.begin(
            &mut self.surfaces,
            event.slide,
            &hit,
            &mut self.store.content,
        );
        if started {
            EventOutcome::EditStarted(previous)
        } else {
            previous.map_or(EventOutcome::Ignored, EventOutcome::TextCommitted)
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> EventOutcome {
        if matches!(self.inline.state(), InlineEditState::Editing { .. }) {
            return self
                .inline
                .handle_key(key, &mut self.surfaces, &mut self.store.content)
                .map_or(EventOutcome::Ignored, EventOutcome::TextCommitted);
        }
        if key.key == "Escape" && self.drag.is_active() {
            return self.cancel_drag();
        }
        EventOutcome::Ignored
    }

    /// Topmost interactive element under `point`: text first, then images
    /// and videos, then backgrounds; later elements in document order win.
    fn hit_test(&self, slide: usize, point: Point) -> Option<EditableElement> {
        let surface = self.surfaces.get(&slide)?;
        let elements = self.elements(slide);
        let under = |accept: fn(ElementKind) -> bool| {
            elements
                .iter()
                .filter(|e| e.is_interactive() && accept(e.kind))
                .filter(|e| {
                    e.element
                        .locate(surface.as_ref())
                        .map(|node| surface.rect(node))
                        .is_some_and(|rect| !rect.is_empty() && rect.contains(point))
                })
                .last()
                .cloned()
        };
        under(ElementKind::is_text)
            .or_else(|| under(|k| matches!(k, ElementKind::Image | ElementKind::Video)))
            .or_else(|| under(|k| k == ElementKind::Background))
    }

    /// Select the first element of `kind` on a slide (or just the slide).
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SlideNotFound`] for an unknown index.
    pub fn select(&mut self, slide: usize, kind: Option<ElementKind>) -> EditorResult<bool> {
        self.check_slide(slide)?;
        let elements = self
            .mounts
            .get(&slide)
            .map_or(&[][..], |m| m.discovery.elements.as_slice());
        Ok(self
            .selection
            .select(&mut self.surfaces, elements, slide, kind))
    }

    /// Drop the selection and every highlight.
    pub fn clear_selection(&mut self) {
        self.selection.deselect(&mut self.surfaces);
    }

    /// The logical selection.
    #[must_use]
    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.state()
    }

    /// Record an edited value and write it to the slide if mounted.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SlideNotFound`] for an unknown index.
    pub fn update_edited_value(
        &mut self,
        slide: usize,
        field: Field,
        value: impl Into<String>,
    ) -> EditorResult<()> {
        self.check_slide(slide)?;
        self.store.content.insert(slide, field, value);
        self.resync_slide(slide);
        Ok(())
    }

    /// Override one text style property. Returns `false` for media kinds.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SlideNotFound`] for an unknown index.
    pub fn update_element_style(
        &mut self,
        slide: usize,
        kind: ElementKind,
        property: StyleProperty,
        value: &str,
    ) -> EditorResult<bool> {
        self.check_slide(slide)?;
        if !kind.is_text() {
            return Ok(false);
        }
        self.store
            .styles
            .set(slide, kind, property, property.normalize(value));
        self.resync_slide(slide);
        Ok(true)
    }

    /// Style the property panel shows for a text kind.
    #[must_use]
    pub fn resolved_style(&self, slide: usize, kind: ElementKind) -> Option<TextStyle> {
        self.selection
            .resolved_style(slide, kind, &self.store, &self.config)
    }

    /// Largest non-protected image or background on a mounted slide.
    #[must_use]
    pub fn find_largest_visual(&self, slide: usize) -> Option<LargestVisual> {
        let surface = self.surfaces.get(&slide)?;
        find_largest_visual(surface.as_ref(), self.elements(slide))
    }

    /// Replace media on a slide.
    ///
    /// Highlights are cleared first. The target is the selected media element
    /// when the selection is on this slide, otherwise the largest visual.
    /// Protected targets and targets that cannot show the URL's media kind
    /// are refused. A replaced target's crop returns to the template's
    /// position; committed size and fit are kept.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SlideNotFound`] for an unknown index.
    pub fn replace_media(&mut self, slide: usize, url: &str) -> EditorResult<MediaReplacement> {
        self.check_slide(slide)?;
        SelectionManager::clear_all(&mut self.surfaces);

        let elements = self.elements(slide);
        let selected = self
            .selection
            .selected_element(slide, elements)
            .filter(|e| e.kind.is_media())
            .map(|e| (e.node_id().to_string(), e.kind, e.protected));
        let target = selected.or_else(|| {
            self.find_largest_visual(slide).and_then(|visual| {
                elements
                    .iter()
                    .find(|e| e.element == visual.element)
                    .map(|e| (e.node_id().to_string(), e.kind, e.protected))
            })
        });
        let Some((node_id, kind, protected)) = target else {
            tracing::debug!("No media target on slide {slide}");
            self.resync_slide(slide);
            return Ok(MediaReplacement::NoTarget);
        };

        let is_video = looks_like_video(url);
        if protected || is_video != (kind == ElementKind::Video) {
            tracing::debug!("Refusing to replace {node_id} on slide {slide} with {url}");
            self.resync_slide(slide);
            return Ok(MediaReplacement::Refused { node_id });
        }

        // The crop falls back to the template's own position. Size and fit
        // stay committed.
        let property = if kind == ElementKind::Background {
            "background-position"
        } else {
            "object-position"
        };
        self.store
            .placements
            .remove_property(slide, &node_id, property);
        let original = self.template_inline_style(slide, &node_id, property);
        if let Some(surface) = self.surfaces.get_mut(&slide) {
            if let Some(node) = surface.find_by_attribute(ID_ATTR, &node_id) {
                match original.as_deref() {
                    Some(value) => surface.set_style(node, property, value),
                    None => surface.remove_style(node, property),
                }
            }
        }
        self.store.content.insert(
            slide,
            Field::Media {
                node_id: node_id.clone(),
            },
            url,
        );
        self.resync_slide(slide);
        tracing::info!("Replaced {kind} {node_id} on slide {slide}");
        Ok(MediaReplacement::Replaced { node_id, kind })
    }

    /// Every slide as a standalone HTML document, with all edits applied.
    ///
    /// Mounted slides export their live surface; the rest are rendered on a
    /// headless surface and synchronized first.
    #[must_use]
    pub fn download_all(&self) -> Vec<SlideExport> {
        let exports: Vec<SlideExport> = self
            .slides
            .iter()
            .enumerate()
            .map(|(index, slide)| {
                let markup = match self.surfaces.get(&index) {
                    Some(surface) => surface.markup(),
                    None => self.render_detached(index, slide),
                };
                SlideExport::new(index, &markup)
            })
            .collect();
        tracing::info!("Exported {} slides", exports.len());
        exports
    }

    fn render_detached(&self, index: usize, slide: &Slide) -> String {
        let mut surface = MarkupSurface::parse(slide.augmented());
        let discovery = discover(&surface, self.guard.as_ref(), &self.config);
        discovery.apply_tags(&mut surface);
        SelectionManager::new().resync(&mut surface, &discovery.elements, index, &self.store);
        surface.markup()
    }

    /// Inline value a property has on a freshly rendered copy of the slide.
    fn template_inline_style(&self, slide: usize, node_id: &str, property: &str) -> Option<String> {
        let mut surface = MarkupSurface::parse(self.slides.get(slide)?.augmented());
        let discovery = discover(&surface, self.guard.as_ref(), &self.config);
        discovery.apply_tags(&mut surface);
        let node = surface.find_by_attribute(ID_ATTR, node_id)?;
        surface.inline_style(node, property)
    }

    fn resync_slide(&mut self, slide: usize) {
        let (Some(surface), Some(mount)) = (self.surfaces.get_mut(&slide), self.mounts.get(&slide))
        else {
            return;
        };
        self.selection
            .resync(surface.as_mut(), &mount.discovery.elements, slide, &self.store);
    }

    fn check_slide(&self, slide: usize) -> EditorResult<()> {
        if slide < self.slides.len() {
            Ok(())
        } else {
            Err(EditorError::SlideNotFound(slide))
        }
    }
}

fn looks_like_video(url: &str) -> bool {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
