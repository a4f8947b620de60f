//! The single owner of document, viewport and layout state.

use crate::session_error::{Result, SessionError};
use crate::host::ViewerHost;
use crate::scheduler::FrameScheduler;
use crate::settings::SessionSettings;
use crate::store::DocumentStore;
use mindweave_core::geom::{LogicalBox, center_on, zoom_to_fit};
use mindweave_core::{
    Document, LogicalPoint, ROOT_ID, ScreenPoint, ScreenSize, Viewport, ViewerConfig,
    screen_point, screen_size,
};
use mindweave_interact::{Effect, InputEvent, InteractionController, InteractionSettings};
use mindweave_layout::{
    ForceLayout, LayoutEnd, LayoutSettings, OrganizeStart, RandomSource, TickOutcome,
    place_unpositioned,
};
use mindweave_render::{Damage, Scene, SceneStyle, ViewportTransition};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    transition: ViewportTransition,
    /// Set by the first frame that samples it.
    started_at: Option<Duration>,
}

/// A mind-map viewer bound to a host UI, a frame source and a document store.
///
/// All state changes funnel through here: input effects, organize frames, viewport
/// transitions and edits. Persistence is best effort; store failures are logged and never
/// interrupt interaction.
pub struct ViewerSession<H, S, D> {
    host: H,
    scheduler: S,
    store: D,
    config: ViewerConfig,
    settings: SessionSettings,
    style: SceneStyle,
    document: Option<Document>,
    engine: ForceLayout,
    controller: InteractionController,
    scene: Scene,
    transition: Option<ActiveTransition>,
    surface: ScreenSize,
    frame_pending: bool,
}

impl<H, S, D> ViewerSession<H, S, D>
where
    H: ViewerHost,
    S: FrameScheduler,
    D: DocumentStore,
{
    pub fn new(config: ViewerConfig, host: H, scheduler: S, store: D) -> Self {
        let style = SceneStyle::from_config(&config);
        Self {
            host,
            scheduler,
            store,
            settings: SessionSettings::from_config(&config),
            style,
            document: None,
            engine: ForceLayout::new(LayoutSettings::from_config(&config)),
            controller: InteractionController::new(InteractionSettings::from_config(&config)),
            scene: Scene::new(style),
            transition: None,
            surface: screen_size(800.0, 600.0),
            frame_pending: false,
            config,
        }
    }

    /// Pins the source used to seed unplaced nodes when organizing.
    pub fn with_random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.engine = ForceLayout::new(*self.engine.settings()).with_random_source(source);
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Changes to the scene since the previous call.
    pub fn take_damage(&mut self) -> Vec<Damage> {
        self.scene.take_damage()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.document
            .as_ref()
            .map(|d| d.viewport)
            .unwrap_or_default()
    }

    pub fn surface_size(&self) -> ScreenSize {
        self.surface
    }

    pub fn is_organizing(&self) -> bool {
        self.engine.is_running()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn set_surface_size(&mut self, size: ScreenSize) {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if valid(size.width) && valid(size.height) {
            self.surface = size;
        } else {
            tracing::warn!(?size, "ignoring invalid surface size");
        }
    }

    /// The node drawn under a surface point.
    pub fn hit_test(&self, point: ScreenPoint) -> Option<&str> {
        self.scene.hit_test(point)
    }

    /// Loads a stored module by id and makes it current.
    pub fn open_module(&mut self, id: &str) -> Result<()> {
        match self.store.load(id)? {
            Some(doc) => {
                self.load_document(doc);
                Ok(())
            }
            None => Err(SessionError::ModuleNotFound { id: id.to_string() }),
        }
    }

    /// Replaces the current document.
    ///
    /// Nodes without a position get a tidy-tree placement. A document that arrives with no
    /// positions at all is fitted to the surface and persisted; otherwise its stored viewport
    /// is kept.
    pub fn load_document(&mut self, mut doc: Document) {
        // A run over the outgoing document ends silently; its result is discarded.
        if let Some(old) = self.document.as_mut() {
            self.engine.stop(&mut old.positions);
        }
        self.controller.reset();
        self.cancel_transition();

        let fresh = !doc.has_positions();
        let placed = place_unpositioned(&doc.tree, &mut doc.positions, self.style.node_spacing);
        if fresh {
            if let Some(fit) = zoom_to_fit(
                doc.positions.values(),
                self.style.node_radius,
                self.surface,
                self.settings.fit_margin,
            ) {
                doc.viewport = fit;
            }
        }
        let bounded = self.bounded(doc.viewport);
        if bounded != doc.viewport {
            tracing::debug!(
                document = %doc.id,
                zoom = doc.viewport.zoom,
                clamped = bounded.zoom,
                "viewport zoom outside the allowed band"
            );
            doc.viewport = bounded;
        }
        tracing::debug!(
            document = %doc.id,
            nodes = doc.tree.len(),
            placed,
            fresh,
            "document loaded"
        );

        self.scene.set_active(None);
        self.scene.redraw(&doc.tree, &doc.positions, self.style);
        self.scene.apply_viewport(doc.viewport);
        self.scene.set_active(Some(ROOT_ID));
        self.host.on_pan_zoom(&doc.viewport);
        self.document = Some(doc);

        if fresh {
            self.persist();
        }
    }

    /// Routes one input event through the interaction controller and applies its effects.
    pub fn handle_input(&mut self, event: InputEvent) {
        let Some(doc) = self.document.as_ref() else {
            return;
        };
        let effects = self
            .controller
            .handle(event, &doc.viewport, &doc.positions);
        for effect in effects {
            self.apply_effect(effect);
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Viewport(viewport) => {
                self.cancel_transition();
                self.set_viewport(viewport);
            }
            Effect::CancelOrganize => self.stop_organize(),
            Effect::MoveNode { id, position } => self.move_node(&id, position),
            Effect::Select(id) => self.select_node(&id),
            Effect::DragEnd => {
                self.persist();
                self.host.on_drag_end();
            }
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        doc.viewport = viewport;
        self.scene.apply_viewport(viewport);
        self.host.on_pan_zoom(&viewport);
    }

    fn move_node(&mut self, id: &str, position: LogicalPoint) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        if !doc.tree.contains(id) {
            return;
        }
        doc.positions.insert(id.to_string(), position);
        if self.scene.node(id).is_some() {
            self.scene.update_node_position(&doc.tree, id, position);
        } else {
            self.scene.redraw(&doc.tree, &doc.positions, self.style);
        }
        self.host.on_node_drag(id, position);
    }

    /// Selects a node: nodes with a sub-module hand off to it, others become active.
    /// Unknown ids are ignored.
    pub fn select_node(&mut self, id: &str) {
        let Some(node) = self.document.as_ref().and_then(|d| d.tree.get(id)) else {
            return;
        };
        match node.sub_module.clone() {
            Some(reference) => {
                tracing::debug!(node = %id, %reference, "entering sub-module");
                self.host.on_enter_sub_module(&reference);
            }
            None => {
                self.scene.set_active(Some(id));
                self.host.on_node_select(id);
            }
        }
    }

    /// Starts an organize run over the current document, or boosts the running one.
    ///
    /// Unplaced nodes are seeded inside the currently visible region, which is also where
    /// gravity pulls.
    pub fn start_organize(&mut self) -> Result<OrganizeStart> {
        let visible = self.visible_region();
        let doc = self.document.as_mut().ok_or(SessionError::NoDocument)?;
        let outcome = self.engine.start(&doc.tree, &mut doc.positions, visible);
        if outcome == OrganizeStart::Started {
            self.scene.redraw(&doc.tree, &doc.positions, self.style);
        }
        self.request_frame();
        Ok(outcome)
    }

    /// Cancels a running organize; positions so far are rounded, persisted and reported.
    pub fn stop_organize(&mut self) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        if let Some(end) = self.engine.stop(&mut doc.positions) {
            self.finish_layout(end);
        }
        if !self.has_pending_work() {
            self.cancel_frame();
        }
    }

    fn finish_layout(&mut self, end: LayoutEnd) {
        let Some(doc) = self.document.as_ref() else {
            return;
        };
        tracing::debug!(document = %doc.id, frames = end.frames, reason = ?end.reason, "layout ended");
        self.scene.redraw(&doc.tree, &doc.positions, self.style);
        self.persist();
        if let Some(doc) = self.document.as_ref() {
            self.host.on_layout_end(&doc.positions, &doc.viewport);
        }
    }

    /// Advances the organize run and any viewport transition by one frame.
    ///
    /// `now` is the host's frame timestamp on any monotonic clock. Returns whether another
    /// frame was requested.
    pub fn on_frame(&mut self, now: Duration) -> bool {
        self.frame_pending = false;

        if let Some(active) = self.transition.as_mut() {
            let started = *active.started_at.get_or_insert(now);
            let elapsed = now.saturating_sub(started);
            let viewport = active.transition.sample(elapsed);
            let finished = active.transition.is_finished(elapsed);
            self.set_viewport(viewport);
            if finished {
                self.transition = None;
                self.persist();
            }
        }

        if let Some(doc) = self.document.as_mut() {
            match self.engine.tick(&mut doc.positions) {
                TickOutcome::Idle => {}
                TickOutcome::Running { .. } => {
                    for (id, position) in &doc.positions {
                        self.scene.update_node_position(&doc.tree, id, *position);
                    }
                }
                TickOutcome::Converged(end) => self.finish_layout(end),
            }
        }

        let more = self.has_pending_work();
        if more {
            self.request_frame();
        }
        more
    }

    /// Fits every positioned node into the surface, within the zoom band.
    pub fn zoom_to_fit(&mut self, animate: bool) -> Result<()> {
        let doc = self.document.as_ref().ok_or(SessionError::NoDocument)?;
        let Some(target) = zoom_to_fit(
            doc.positions.values(),
            self.style.node_radius,
            self.surface,
            self.settings.fit_margin,
        ) else {
            return Ok(());
        };
        let target = self.bounded(target);
        self.move_view(target, animate);
        Ok(())
    }

    /// Centers `id` at zoom 1 and selects it. Returns `false` when the node has no position.
    pub fn go_to_node(&mut self, id: &str) -> bool {
        let Some(position) = self
            .document
            .as_ref()
            .and_then(|d| d.positions.get(id).copied())
        else {
            return false;
        };
        let target = self.bounded(center_on(position, self.surface, 1.0));
        self.move_view(target, true);
        self.select_node(id);
        true
    }

    fn move_view(&mut self, target: Viewport, animate: bool) {
        let from = self.viewport();
        if animate && !self.settings.transition.is_zero() && from != target {
            self.transition = Some(ActiveTransition {
                transition: ViewportTransition::new(from, target, self.settings.transition),
                started_at: None,
            });
            self.request_frame();
        } else {
            self.cancel_transition();
            self.set_viewport(target);
            self.persist();
        }
    }

    /// Adds a child under `parent` and places it below its parent. Returns the new id.
    pub fn add_child(
        &mut self,
        parent: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<String> {
        self.stop_organize();
        let doc = self.document.as_mut().ok_or(SessionError::NoDocument)?;
        let id = doc.add_child(parent, title, content)?;
        place_unpositioned(&doc.tree, &mut doc.positions, self.style.node_spacing);
        self.after_edit();
        Ok(id)
    }

    /// Removes a node and its whole subtree. The root cannot be removed.
    pub fn remove_node(&mut self, id: &str) -> Result<Vec<String>> {
        self.stop_organize();
        let doc = self.document.as_mut().ok_or(SessionError::NoDocument)?;
        let removed = doc.remove_subtree(id)?;
        self.controller.reset();
        self.after_edit();
        Ok(removed)
    }

    pub fn rename_node(&mut self, id: &str, title: impl Into<String>) -> Result<()> {
        let doc = self.document.as_mut().ok_or(SessionError::NoDocument)?;
        doc.tree.set_title(id, title)?;
        self.after_edit();
        Ok(())
    }

    /// Replaces a node's rich-text body. The content is stored verbatim.
    pub fn set_content(&mut self, id: &str, content: impl Into<String>) -> Result<()> {
        let doc = self.document.as_mut().ok_or(SessionError::NoDocument)?;
        doc.tree.set_content(id, content)?;
        self.persist();
        Ok(())
    }

    fn after_edit(&mut self) {
        if let Some(doc) = self.document.as_ref() {
            let active = self.scene.active().map(str::to_string);
            self.scene.redraw(&doc.tree, &doc.positions, self.style);
            if active.is_some_and(|a| !doc.tree.contains(&a)) {
                self.scene.set_active(Some(ROOT_ID));
            }
        }
        self.persist();
    }

    fn persist(&mut self) {
        let Some(doc) = self.document.as_ref() else {
            return;
        };
        match self.store.save(doc) {
            Ok(()) => tracing::debug!(document = %doc.id, "document saved"),
            Err(err) => tracing::warn!(document = %doc.id, error = %err, "failed to save document"),
        }
    }

    /// `viewport` with its zoom brought into the interaction band around the surface center.
    fn bounded(&self, viewport: Viewport) -> Viewport {
        let center = screen_point(self.surface.width / 2.0, self.surface.height / 2.0);
        self.controller
            .settings()
            .zoom_bounds
            .clamp_viewport(viewport, center)
    }

    /// Logical region currently visible on the surface.
    fn visible_region(&self) -> LogicalBox {
        let viewport = self.viewport();
        let a = viewport.screen_to_logical(screen_point(0.0, 0.0));
        let b = viewport.screen_to_logical(screen_point(self.surface.width, self.surface.height));
        LogicalBox::new(a.min(b), a.max(b))
    }

    fn has_pending_work(&self) -> bool {
        self.engine.is_running() || self.transition.is_some()
    }

    fn cancel_transition(&mut self) {
        self.transition = None;
    }

    fn request_frame(&mut self) {
        if !self.frame_pending {
            self.frame_pending = true;
            self.scheduler.request_frame();
        }
    }

    fn cancel_frame(&mut self) {
        if self.frame_pending {
            self.frame_pending = false;
            self.scheduler.cancel_frame();
        }
    }
}
