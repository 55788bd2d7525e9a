//! CanvasSession: the composition root.
//!
//! Owns the spatial index, the connection set, the selection, the three
//! gesture controllers and the floating panels. Every input event goes
//! through [`CanvasSession::handle`], which routes it by the single
//! [`GestureMode`]; a second gesture is refused while one is active.
//!
//! Storage is reached only through two queues: an outbox of
//! [`PersistRequest`]s and a list of [`CanvasEffect`]s for the host.

use std::collections::HashMap;

use refmap_core::geometry::{Point, Rect, Size};
use refmap_core::{
    Anchor, AnchorId, AnchorRecord, CanvasConfig, Connection, ConnectionId, ConnectionRecord,
    FloatingPanel, PanelAnchor, ProjectId, SpatialIndex, TooltipPlacer, TopicId, TopicRecord,
};
use refmap_render::{Frame, Hit, Overlay, hit_test, link_at};
use serde::{Deserialize, Serialize};

use crate::connection::{
    ConnectRelease, ConnectionController, DescriptionDraft, DescriptionSave,
};
use crate::drag::{DragController, DragOutcome};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::persist::{self, Collaborator, Outcome, PendingRequest, PersistRequest};
use crate::resize::{ResizeController, ResizeDirection};
use crate::selection::{Selection, SelectionManager};
use crate::shortcuts::{ShortcutAction, ShortcutMap};

/// The one gesture allowed at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureMode {
    #[default]
    Idle,
    Drag,
    Resize,
    Marquee,
    Connect,
}

/// Something the host has to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CanvasEffect {
    /// A gesture started: listen for pointer motion outside the canvas.
    SubscribePointer,
    UnsubscribePointer,
    OpenDescriptionEditor(DescriptionDraft),
    CloseDescriptionEditor,
    ShowReferenceDetails { anchor: AnchorId, topic: TopicId },
    /// Fetch the connection set and pass it to `apply_connections`.
    ReloadConnections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Warning,
    Error,
}

/// A non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    fn warning(message: String) -> Self {
        Self {
            level: Level::Warning,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            level: Level::Error,
            message,
        }
    }
}

// ─── Floating panels ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Reference,
    Link,
    Menu,
}

impl PanelKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reference" => Some(Self::Reference),
            "link" => Some(Self::Link),
            "menu" => Some(Self::Menu),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferencePanel {
    pub anchor: AnchorId,
    pub panel: FloatingPanel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkPanel {
    pub connection: ConnectionId,
    pub panel: FloatingPanel,
}

/// Right-click menu with whatever was under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContextMenu {
    pub panel: FloatingPanel,
    pub topic: Option<TopicId>,
    pub anchor: Option<AnchorId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Panels {
    pub reference: Option<ReferencePanel>,
    pub link: Option<LinkPanel>,
    pub menu: Option<ContextMenu>,
}

impl Panels {
    fn each_mut(&mut self) -> impl Iterator<Item = &mut FloatingPanel> {
        self.reference
            .as_mut()
            .map(|p| &mut p.panel)
            .into_iter()
            .chain(self.link.as_mut().map(|p| &mut p.panel))
            .chain(self.menu.as_mut().map(|p| &mut p.panel))
    }
}

// ─── Session ─────────────────────────────────────────────────────────────

pub struct CanvasSession {
    index: SpatialIndex,
    connections: Vec<Connection>,
    /// Topics were reloaded and the matching connection set has not
    /// arrived yet. No links are drawn or hovered meanwhile.
    connections_stale: bool,
    project: Option<ProjectId>,

    mode: GestureMode,
    selection: SelectionManager,
    drag: DragController,
    resize: ResizeController,
    connect: ConnectionController,

    placer: TooltipPlacer,
    viewport: Rect,
    panels: Panels,
    hovered_link: Option<ConnectionId>,
    link_hide_at: Option<u64>,
    pointer_in_link_panel: bool,
    hide_delay_ms: u64,

    outbox: Vec<PendingRequest>,
    in_flight: HashMap<u64, PersistRequest>,
    next_request: u64,
    effects: Vec<CanvasEffect>,
    notifications: Vec<Notification>,
}

impl CanvasSession {
    pub fn new(config: CanvasConfig) -> Self {
        let placer = TooltipPlacer::new(config.tooltip);
        let viewport = Rect::new(0.0, 0.0, config.canvas.width, config.canvas.height);
        let debounce = config.connect_debounce_ms;
        let hide_delay_ms = config.tooltip_hide_delay_ms;
        Self {
            index: SpatialIndex::new(config),
            connections: Vec::new(),
            connections_stale: false,
            project: None,
            mode: GestureMode::Idle,
            selection: SelectionManager::default(),
            drag: DragController::default(),
            resize: ResizeController::default(),
            connect: ConnectionController::new(debounce),
            placer,
            viewport,
            panels: Panels::default(),
            hovered_link: None,
            link_hide_at: None,
            pointer_in_link_panel: false,
            hide_delay_ms,
            outbox: Vec::new(),
            in_flight: HashMap::new(),
            next_request: 1,
            effects: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn selection(&self) -> &Selection {
        &self.selection.selection
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub fn description_draft(&self) -> Option<&DescriptionDraft> {
        self.connect.draft()
    }

    // ─── Loading ─────────────────────────────────────────────────────────

    /// Forget everything about the current project. Active gestures are
    /// dropped without persisting.
    pub fn switch_project(&mut self, project: ProjectId) {
        self.abort_gesture();
        self.connect.reset();
        self.selection = SelectionManager::default();
        self.panels = Panels::default();
        self.hovered_link = None;
        self.link_hide_at = None;
        self.pointer_in_link_panel = false;
        self.index.clear();
        self.connections.clear();
        self.connections_stale = true;
        self.project = Some(project);
        log::debug!("switched to project {project}");
    }

    /// Load a whole project in order: topics, each topic's anchors, then
    /// connections.
    pub fn load_project(
        &mut self,
        project: ProjectId,
        store: &mut dyn Collaborator,
    ) -> persist::Result<()> {
        self.switch_project(project);
        let result = self.read_project(project, store);
        if let Err(e) = &result {
            log::warn!("loading project {project} failed: {e}");
            self.notifications
                .push(Notification::error(format!("Could not load project: {e}")));
        }
        result
    }

    fn read_project(&mut self, project: ProjectId, store: &mut dyn Collaborator) -> persist::Result<()> {
        let topics = store.list_topics(project)?;
        self.apply_topics(&topics);
        for topic in topics.iter().filter(|t| t.references.is_none()) {
            let anchors = store.list_anchors(topic.id)?;
            self.apply_anchors(topic.id, &anchors);
        }
        let connections = store.list_connections(project)?;
        self.apply_connections(&connections);
        Ok(())
    }

    /// Replace all topics. Connections stay hidden until the next
    /// `apply_connections`, since their anchors may have moved or gone.
    pub fn apply_topics(&mut self, records: &[TopicRecord]) {
        self.abort_gesture();
        self.index
            .replace_topics(records.iter().map(TopicRecord::to_block));
        for record in records {
            if let Some(anchors) = &record.references {
                self.apply_anchors(record.id, anchors);
            }
        }
        self.selection.selection.retain_existing(&self.index);
        self.connections_stale = true;
        self.hovered_link = None;
        self.panels.link = None;
        self.panels.reference = None;
        log::debug!("loaded {} topic(s)", self.index.len());
    }

    /// Set one topic's anchors, in display order.
    pub fn apply_anchors(&mut self, topic: TopicId, records: &[AnchorRecord]) -> bool {
        let anchors: Vec<Anchor> = records.iter().map(Anchor::from).collect();
        match self.index.set_anchors(topic, anchors) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("anchors of {topic} rejected: {e}");
                self.notifications
                    .push(Notification::warning(format!("Some references were not loaded: {e}")));
                false
            }
        }
    }

    /// Replace the connection set. Self-links are dropped.
    pub fn apply_connections(&mut self, records: &[ConnectionRecord]) {
        self.connections = records
            .iter()
            .filter_map(|r| match Connection::try_from(r) {
                Ok(c) => Some(c),
                Err(e) => {
                    log::warn!("skipping connection: {e}");
                    None
                }
            })
            .collect();
        self.connections_stale = false;
        self.connect.connections_reloaded(&self.connections);
        if let Some(id) = self.hovered_link
            && !self.connections.iter().any(|c| c.id == id)
        {
            self.hovered_link = None;
        }
        if let Some(panel) = self.panels.link
            && !self.connections.iter().any(|c| c.id == panel.connection)
        {
            self.panels.link = None;
        }
        log::debug!("loaded {} connection(s)", self.connections.len());
    }

    // ─── Input routing ───────────────────────────────────────────────────

    /// Route one input event. Returns whether the frame needs redrawing.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
                time_ms,
                on_control,
            } => self.pointer_down(Point::new(*x, *y), *button, *modifiers, *time_ms, *on_control),
            InputEvent::PointerMove { x, y, time_ms, .. } => {
                self.pointer_move(Point::new(*x, *y), *time_ms)
            }
            InputEvent::PointerUp { x, y, time_ms, .. } => {
                self.pointer_up(Point::new(*x, *y), *time_ms)
            }
            InputEvent::PointerCancel => self.abort_gesture(),
            InputEvent::KeyDown { key, modifiers } => {
                match ShortcutMap::resolve(
                    key,
                    modifiers.ctrl,
                    modifiers.shift,
                    modifiers.alt,
                    modifiers.meta,
                ) {
                    Some(ShortcutAction::SelectAll) => self.select_all(),
                    Some(ShortcutAction::Cancel) => self.escape(),
                    None => false,
                }
            }
            InputEvent::KeyUp { key, .. } => {
                ShortcutMap::is_multi_select_key(key) && self.selection.modifier_released()
            }
            InputEvent::Tick { time_ms } => self.tick(*time_ms),
        }
    }

    fn pointer_down(
        &mut self,
        p: Point,
        button: PointerButton,
        modifiers: Modifiers,
        now_ms: u64,
        on_control: bool,
    ) -> bool {
        if on_control {
            log::debug!("pointer-down on a host control ignored");
            return false;
        }
        let mut changed = self.panels.menu.take().is_some();
        if self.mode != GestureMode::Idle {
            log::debug!("pointer-down refused: {:?} active", self.mode);
            return changed;
        }
        if self.connect.is_awaiting_description() {
            log::debug!("pointer-down refused: description editor open");
            return changed;
        }

        let hit = hit_test(&self.index, p);
        match button {
            PointerButton::Secondary => {
                self.open_context_menu(p, hit);
                return true;
            }
            PointerButton::Middle => return changed,
            PointerButton::Primary => {}
        }
        changed |= self.panels.reference.take().is_some();

        let mode = match hit {
            Hit::Anchor { anchor, .. } => {
                self.connect.press(anchor, p, now_ms);
                GestureMode::Connect
            }
            Hit::ResizeHandle(topic) => {
                if !self.resize.begin(&self.index, topic, ResizeDirection::SE, p) {
                    return changed;
                }
                GestureMode::Resize
            }
            Hit::Block(topic) => {
                let multi = modifiers.multi_select();
                if !self
                    .drag
                    .begin(&self.index, topic, &self.selection.selection, p, multi)
                {
                    return changed;
                }
                GestureMode::Drag
            }
            Hit::Background => {
                self.selection.begin_marquee(p);
                GestureMode::Marquee
            }
        };
        log::debug!("gesture {mode:?} started");
        self.mode = mode;
        self.effects.push(CanvasEffect::SubscribePointer);
        true
    }

    fn pointer_move(&mut self, p: Point, now_ms: u64) -> bool {
        match self.mode {
            GestureMode::Drag => self.drag.update(&mut self.index, p),
            GestureMode::Resize => self.resize.update(&mut self.index, p),
            GestureMode::Marquee => self.selection.update_marquee(p).is_some(),
            GestureMode::Connect => {
                let hover = self.anchor_at(p);
                self.connect.pointer_move(p, hover, now_ms)
            }
            GestureMode::Idle => self.hover_links(p, now_ms),
        }
    }

    fn pointer_up(&mut self, p: Point, now_ms: u64) -> bool {
        let mode = std::mem::take(&mut self.mode);
        if mode == GestureMode::Idle {
            return false;
        }
        self.effects.push(CanvasEffect::UnsubscribePointer);
        log::debug!("gesture {mode:?} ended");

        match mode {
            GestureMode::Drag => match self.drag.finish(&mut self.index) {
                Some(DragOutcome::Click {
                    topic,
                    multi_select: true,
                }) => {
                    self.selection.toggle(topic);
                }
                Some(DragOutcome::Moved(moves)) => {
                    for (topic, at) in moves {
                        self.enqueue(PersistRequest::UpdateTopicPosition {
                            topic,
                            x: at.x,
                            y: at.y,
                        });
                    }
                }
                _ => {}
            },
            GestureMode::Resize => {
                if let Some(outcome) = self.resize.finish(&self.index) {
                    if let Some(at) = outcome.position {
                        self.enqueue(PersistRequest::UpdateTopicPosition {
                            topic: outcome.topic,
                            x: at.x,
                            y: at.y,
                        });
                    }
                    self.enqueue(PersistRequest::UpdateTopicDimensions {
                        topic: outcome.topic,
                        width: outcome.grid.width,
                        height: outcome.grid.height,
                    });
                }
            }
            GestureMode::Marquee => {
                self.selection.finish_marquee(&self.index);
            }
            GestureMode::Connect => {
                let hover = self.anchor_at(p);
                match self.connect.release(hover, now_ms) {
                    ConnectRelease::Click(anchor) => self.show_reference(anchor),
                    ConnectRelease::AwaitDescription(draft) => {
                        self.effects.push(CanvasEffect::OpenDescriptionEditor(draft));
                    }
                    ConnectRelease::Cancelled => {}
                }
            }
            GestureMode::Idle => {}
        }
        true
    }

    /// Drop the active gesture and undo its local changes. Nothing is
    /// persisted.
    fn abort_gesture(&mut self) -> bool {
        let mode = std::mem::take(&mut self.mode);
        match mode {
            GestureMode::Idle => return false,
            GestureMode::Drag => {
                self.drag.cancel(&mut self.index);
            }
            GestureMode::Resize => {
                self.resize.cancel(&mut self.index);
            }
            GestureMode::Marquee => {
                self.selection.cancel_marquee();
            }
            GestureMode::Connect => {
                self.connect.cancel_gesture();
            }
        }
        log::debug!("gesture {mode:?} cancelled");
        self.effects.push(CanvasEffect::UnsubscribePointer);
        true
    }

    /// Escape unwinds one layer: gesture, editor, menu, details, selection.
    fn escape(&mut self) -> bool {
        if self.abort_gesture() {
            return true;
        }
        if self.cancel_description() {
            return true;
        }
        if self.panels.menu.take().is_some() || self.panels.reference.take().is_some() {
            return true;
        }
        self.selection.selection.clear()
    }

    /// Promote a held anchor press and expire the link tooltip.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        if self.mode == GestureMode::Connect {
            changed |= self.connect.tick(now_ms);
        }
        if let Some(at) = self.link_hide_at
            && now_ms >= at
        {
            self.link_hide_at = None;
            if self.hovered_link.is_none() && !self.pointer_in_link_panel {
                changed |= self.panels.link.take().is_some();
            }
        }
        changed
    }

    pub fn select_all(&mut self) -> bool {
        if self.mode != GestureMode::Idle || self.connect.is_awaiting_description() {
            return false;
        }
        self.selection.select_all(&self.index);
        true
    }

    fn anchor_at(&self, p: Point) -> Option<AnchorId> {
        match hit_test(&self.index, p) {
            Hit::Anchor { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    // ─── Links and panels ────────────────────────────────────────────────

    fn hover_links(&mut self, p: Point, now_ms: u64) -> bool {
        let hit = if self.connections_stale {
            None
        } else {
            link_at(&self.index, &self.connections, p)
        };
        if hit == self.hovered_link {
            return false;
        }
        self.hovered_link = hit;
        match hit {
            Some(id) => {
                self.link_hide_at = None;
                self.open_link_panel(id, p);
            }
            None if self.panels.link.is_some() && !self.pointer_in_link_panel => {
                self.link_hide_at = Some(now_ms + self.hide_delay_ms);
            }
            None => {}
        }
        true
    }

    fn open_link_panel(&mut self, id: ConnectionId, cursor: Point) {
        let Some(link) = self.connections.iter().find(|c| c.id == id) else {
            return;
        };
        if link.label().is_none() {
            self.panels.link = None;
            return;
        }
        let (Some(from), Some(to)) = (
            self.index.anchor_position(link.source),
            self.index.anchor_position(link.target),
        ) else {
            return;
        };
        let panel = FloatingPanel::open(
            &self.placer,
            PanelAnchor::Link { cursor, from, to },
            self.viewport,
        );
        self.panels.link = Some(LinkPanel {
            connection: id,
            panel,
        });
    }

    pub fn pointer_enter_link_panel(&mut self) {
        self.pointer_in_link_panel = true;
        self.link_hide_at = None;
    }

    pub fn pointer_leave_link_panel(&mut self, now_ms: u64) {
        self.pointer_in_link_panel = false;
        if self.hovered_link.is_none() && self.panels.link.is_some() {
            self.link_hide_at = Some(now_ms + self.hide_delay_ms);
        }
    }

    fn show_reference(&mut self, anchor: AnchorId) {
        let (Some(center), Some(topic)) = (
            self.index.anchor_position(anchor),
            self.index.owner_of(anchor),
        ) else {
            return;
        };
        let radius = self.index.config().anchor.node_radius();
        let panel = FloatingPanel::open(
            &self.placer,
            PanelAnchor::Reference { center, radius },
            self.viewport,
        );
        self.panels.reference = Some(ReferencePanel { anchor, panel });
        self.effects
            .push(CanvasEffect::ShowReferenceDetails { anchor, topic });
    }

    fn open_context_menu(&mut self, at: Point, hit: Hit) {
        let anchor = match hit {
            Hit::Anchor { anchor, .. } => Some(anchor),
            _ => None,
        };
        let panel = FloatingPanel::open(&self.placer, PanelAnchor::Cursor { at }, self.viewport);
        self.panels.menu = Some(ContextMenu {
            panel,
            topic: hit.topic(),
            anchor,
        });
    }

    pub fn close_context_menu(&mut self) -> bool {
        self.panels.menu.take().is_some()
    }

    pub fn close_reference_panel(&mut self) -> bool {
        self.panels.reference.take().is_some()
    }

    /// The host measured a panel; re-place it with the real size.
    pub fn measure_panel(&mut self, kind: PanelKind, size: Size) -> bool {
        let panel = match kind {
            PanelKind::Reference => self.panels.reference.as_mut().map(|p| &mut p.panel),
            PanelKind::Link => self.panels.link.as_mut().map(|p| &mut p.panel),
            PanelKind::Menu => self.panels.menu.as_mut().map(|p| &mut p.panel),
        };
        panel.is_some_and(|p| p.measure(&self.placer, size, self.viewport))
    }

    /// The visible region, in canvas coordinates. Open panels are re-placed.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        for panel in self.panels.each_mut() {
            panel.reposition(&self.placer, viewport);
        }
    }

    // ─── Descriptions ────────────────────────────────────────────────────

    pub fn save_description(&mut self, text: &str) -> bool {
        let Some(save) = self.connect.save(text) else {
            return false;
        };
        match save {
            DescriptionSave::Create {
                source,
                target,
                description,
            } => {
                self.enqueue(PersistRequest::CreateConnection {
                    source,
                    target,
                    description,
                });
            }
            DescriptionSave::Update {
                connection,
                description,
            } => {
                if let Some(c) = self.connections.iter_mut().find(|c| c.id == connection) {
                    c.description = description.clone();
                }
                self.enqueue(PersistRequest::UpdateConnection {
                    id: connection,
                    description,
                });
            }
        }
        self.effects.push(CanvasEffect::CloseDescriptionEditor);
        true
    }

    pub fn cancel_description(&mut self) -> bool {
        if !self.connect.cancel_description() {
            return false;
        }
        self.effects.push(CanvasEffect::CloseDescriptionEditor);
        true
    }

    /// Open the description editor for an existing link.
    pub fn edit_connection(&mut self, id: ConnectionId) -> bool {
        if self.mode != GestureMode::Idle {
            return false;
        }
        let Some(link) = self.connections.iter().find(|c| c.id == id) else {
            return false;
        };
        let Some(draft) = self.connect.edit(link) else {
            return false;
        };
        self.panels.link = None;
        self.link_hide_at = None;
        self.effects.push(CanvasEffect::OpenDescriptionEditor(draft));
        true
    }

    /// Remove a link locally and queue its deletion.
    pub fn delete_connection(&mut self, id: ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        if self.connections.len() == before {
            return false;
        }
        if self.hovered_link == Some(id) {
            self.hovered_link = None;
        }
        if self.panels.link.is_some_and(|p| p.connection == id) {
            self.panels.link = None;
        }
        self.enqueue(PersistRequest::DeleteConnection { id });
        true
    }

    // ─── Queues ──────────────────────────────────────────────────────────

    fn enqueue(&mut self, request: PersistRequest) -> u64 {
        let id = self.next_request;
        self.next_request += 1;
        log::debug!("queued request #{id}: {}", request.describe());
        self.outbox.push(PendingRequest { id, request });
        id
    }

    /// Hand queued requests to the host. Each one must be reported back
    /// through [`Self::complete`].
    pub fn take_requests(&mut self) -> Vec<PendingRequest> {
        let requests = std::mem::take(&mut self.outbox);
        for pending in &requests {
            self.in_flight.insert(pending.id, pending.request.clone());
        }
        requests
    }

    /// Record the outcome of a request. Failures become notifications;
    /// local state is left as is.
    pub fn complete(&mut self, id: u64, outcome: Outcome) -> bool {
        let Some(request) = self.in_flight.remove(&id) else {
            log::warn!("outcome for unknown request #{id}");
            return false;
        };
        match outcome {
            Outcome::Done => {}
            Outcome::Created { record } => {
                log::debug!("connection {} created", record.id);
                self.effects.push(CanvasEffect::ReloadConnections);
            }
            Outcome::Failed { message } => {
                log::warn!("request #{id} failed: {message}");
                self.notifications.push(Notification::error(format!(
                    "Could not {}: {message}",
                    request.describe()
                )));
                if let PersistRequest::CreateConnection { source, target, .. } = request {
                    self.connect.create_failed(source, target);
                }
            }
        }
        true
    }

    /// Run every queued request against `store` right away, then reload
    /// connections if a create asked for it. Returns how many ran.
    pub fn flush(&mut self, store: &mut dyn Collaborator) -> usize {
        let requests = self.take_requests();
        let count = requests.len();
        for pending in requests {
            let outcome = pending.request.dispatch(store);
            self.complete(pending.id, outcome);
        }

        let before = self.effects.len();
        self.effects
            .retain(|e| *e != CanvasEffect::ReloadConnections);
        if self.effects.len() != before
            && let Some(project) = self.project
        {
            match store.list_connections(project) {
                Ok(records) => self.apply_connections(&records),
                Err(e) => {
                    log::warn!("reloading connections failed: {e}");
                    self.notifications
                        .push(Notification::error(format!("Could not reload connections: {e}")));
                }
            }
        }
        count
    }

    pub fn take_effects(&mut self) -> Vec<CanvasEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ─── Frame ───────────────────────────────────────────────────────────

    /// Display list for the current state.
    pub fn frame(&self) -> Frame {
        let overlay = Overlay {
            preview: self.connect.preview(),
            retained: self.connect.retained().to_vec(),
            marquee: self.selection.marquee().map(|m| m.rect()),
            hovered_link: self.hovered_link,
            active_block: match self.mode {
                GestureMode::Drag => self.drag.primary(),
                GestureMode::Resize => self.resize.topic(),
                _ => None,
            },
        };
        let connections: &[Connection] = if self.connections_stale {
            &[]
        } else {
            &self.connections
        };
        Frame::build(
            &self.index,
            connections,
            |id| self.selection.selection.contains(id),
            &overlay,
        )
    }
}
