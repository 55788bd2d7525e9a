//! WASM bridge for Refmap: exposes the canvas session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. JavaScript owns the DOM,
//! the network and the clock: it forwards pointer and key events with a
//! `performance.now()` timestamp, drains requests and effects as JSON after
//! each call, runs the requests against its backend, and reports outcomes.

mod render2d;

use refmap_core::geometry::{Rect, Size};
use refmap_core::{
    AnchorRecord, CanvasConfig, ConnectionId, ConnectionRecord, ProjectId, TopicId, TopicRecord,
};
use refmap_editor::persist::Outcome;
use refmap_editor::{CanvasSession, InputEvent, Modifiers, PanelKind, PointerButton};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
///
/// All interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct RefCanvas {
    session: CanvasSession,
    /// Dark mode flag: `false` = light (default), `true` = dark.
    dark_mode: bool,
}

fn mods(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn millis(time_ms: f64) -> u64 {
    time_ms.max(0.0) as u64
}

fn to_json<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serialization failed: {e}");
        fallback.to_string()
    })
}

fn error_json(e: impl std::fmt::Display) -> String {
    let escaped = e.to_string().replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"{{"ok":false,"error":"{escaped}"}}"#)
}

#[wasm_bindgen]
impl RefCanvas {
    /// Create a controller. `config_json` may be empty or a partial
    /// `CanvasConfig`; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            CanvasConfig::default()
        } else {
            serde_json::from_str(config_json).unwrap_or_else(|e| {
                log::warn!("bad canvas config, using defaults: {e}");
                CanvasConfig::default()
            })
        };
        Self {
            session: CanvasSession::new(config),
            dark_mode: false,
        }
    }

    /// Render the current frame to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        render2d::render_frame(ctx, &self.session.frame(), &theme);
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    /// Visible region in canvas coordinates (scroll offset and client size).
    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.session.set_viewport(Rect::new(x, y, width, height));
    }

    // ─── Loading ─────────────────────────────────────────────────────────

    /// Start a new project: drops gestures, selection, panels and data.
    pub fn switch_project(&mut self, project_id: &str) {
        self.session.switch_project(ProjectId::intern(project_id));
    }

    /// Load topic rows. Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn load_topics_json(&mut self, json: &str) -> String {
        match serde_json::from_str::<Vec<TopicRecord>>(json) {
            Ok(records) => {
                self.session.apply_topics(&records);
                r#"{"ok":true}"#.to_string()
            }
            Err(e) => error_json(e),
        }
    }

    /// Load the reference rows of one topic, in display order.
    pub fn load_anchors_json(&mut self, topic_id: &str, json: &str) -> String {
        match serde_json::from_str::<Vec<AnchorRecord>>(json) {
            Ok(records) => {
                if self.session.apply_anchors(TopicId::intern(topic_id), &records) {
                    r#"{"ok":true}"#.to_string()
                } else {
                    error_json(format!("references of topic {topic_id} rejected"))
                }
            }
            Err(e) => error_json(e),
        }
    }

    /// Load connection rows. Call after topics and anchors.
    pub fn load_connections_json(&mut self, json: &str) -> String {
        match serde_json::from_str::<Vec<ConnectionRecord>>(json) {
            Ok(records) => {
                self.session.apply_connections(&records);
                r#"{"ok":true}"#.to_string()
            }
            Err(e) => error_json(e),
        }
    }

    // ─── Pointer and keyboard ────────────────────────────────────────────

    /// Handle pointer down. `button` is `MouseEvent.button`; `on_control`
    /// marks presses on inputs or menus drawn over the canvas. Returns
    /// true if a redraw is needed.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        on_control: bool,
        time_ms: f64,
    ) -> bool {
        self.session.handle(&InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
            modifiers: mods(shift, ctrl, alt, meta),
            time_ms: millis(time_ms),
            on_control,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        time_ms: f64,
    ) -> bool {
        self.session.handle(&InputEvent::from_pointer_move(
            x,
            y,
            mods(shift, ctrl, alt, meta),
            millis(time_ms),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
        time_ms: f64,
    ) -> bool {
        self.session.handle(&InputEvent::from_pointer_up(
            x,
            y,
            mods(shift, ctrl, alt, meta),
            millis(time_ms),
        ))
    }

    /// The pointer left the window or the browser cancelled it.
    pub fn handle_pointer_cancel(&mut self) -> bool {
        self.session.handle(&InputEvent::PointerCancel)
    }

    pub fn handle_key_down(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        self.session.handle(&InputEvent::KeyDown {
            key: key.to_string(),
            modifiers: mods(shift, ctrl, alt, meta),
        })
    }

    pub fn handle_key_up(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.session.handle(&InputEvent::KeyUp {
            key: key.to_string(),
            modifiers: mods(shift, ctrl, alt, meta),
        })
    }

    /// Drive timers (anchor press debounce, link tooltip hiding). Call
    /// from `requestAnimationFrame` while anything is pending.
    pub fn tick(&mut self, time_ms: f64) -> bool {
        self.session.handle(&InputEvent::Tick {
            time_ms: millis(time_ms),
        })
    }

    pub fn select_all(&mut self) -> bool {
        self.session.select_all()
    }

    // ─── Panels ──────────────────────────────────────────────────────────

    /// Report a panel's rendered size (`"reference"`, `"link"`, `"menu"`).
    /// Returns true if it had to move.
    pub fn measure_panel(&mut self, kind: &str, width: f32, height: f32) -> bool {
        match PanelKind::parse(kind) {
            Some(kind) => self.session.measure_panel(kind, Size::new(width, height)),
            None => {
                log::warn!("unknown panel kind {kind:?}");
                false
            }
        }
    }

    pub fn pointer_enter_link_panel(&mut self) {
        self.session.pointer_enter_link_panel();
    }

    pub fn pointer_leave_link_panel(&mut self, time_ms: f64) {
        self.session.pointer_leave_link_panel(millis(time_ms));
    }

    pub fn close_context_menu(&mut self) -> bool {
        self.session.close_context_menu()
    }

    pub fn close_reference_panel(&mut self) -> bool {
        self.session.close_reference_panel()
    }

    /// Open panels with their positions, as JSON.
    pub fn panels_json(&self) -> String {
        to_json(self.session.panels(), "{}")
    }

    // ─── Connections ─────────────────────────────────────────────────────

    pub fn save_description(&mut self, text: &str) -> bool {
        self.session.save_description(text)
    }

    pub fn cancel_description(&mut self) -> bool {
        self.session.cancel_description()
    }

    pub fn edit_connection(&mut self, connection_id: &str) -> bool {
        self.session.edit_connection(ConnectionId::intern(connection_id))
    }

    pub fn delete_connection(&mut self, connection_id: &str) -> bool {
        self.session.delete_connection(ConnectionId::intern(connection_id))
    }

    // ─── Queues ──────────────────────────────────────────────────────────

    /// Drain queued storage requests:
    /// `[{"id":1,"op":"update_topic_position","topic":"3","x":120,"y":80}, ...]`.
    pub fn take_requests_json(&mut self) -> String {
        to_json(&self.session.take_requests(), "[]")
    }

    /// Report a request's outcome: `{"status":"done"}`,
    /// `{"status":"created","record":{...}}` or
    /// `{"status":"failed","message":"..."}`.
    pub fn complete_json(&mut self, request_id: f64, outcome_json: &str) -> bool {
        match serde_json::from_str::<Outcome>(outcome_json) {
            Ok(outcome) => self.session.complete(request_id as u64, outcome),
            Err(e) => {
                log::warn!("bad outcome for request {request_id}: {e}");
                false
            }
        }
    }

    pub fn take_effects_json(&mut self) -> String {
        to_json(&self.session.take_effects(), "[]")
    }

    pub fn take_notifications_json(&mut self) -> String {
        to_json(&self.session.take_notifications(), "[]")
    }

    // ─── Inspection ──────────────────────────────────────────────────────

    /// The display list as JSON, for DOM overlays and debugging.
    pub fn frame_json(&self) -> String {
        to_json(&self.session.frame(), "{}")
    }

    pub fn get_selected_ids(&self) -> String {
        let ids: Vec<String> = self.session.selection().iter().map(|id| id.to_string()).collect();
        to_json(&ids, "[]")
    }

    /// `"idle"`, `"drag"`, `"resize"`, `"marquee"` or `"connect"`.
    pub fn get_mode(&self) -> String {
        to_json(&self.session.mode(), "\"idle\"")
            .trim_matches('"')
            .to_string()
    }
}

// ─── Logging ─────────────────────────────────────────────────────────────

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Route `log` output to the browser console. `level` is `"error"`,
/// `"warn"`, `"info"`, `"debug"` or `"trace"`; anything else means `"warn"`.
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    let filter = level.parse().unwrap_or(log::LevelFilter::Warn);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(filter);
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Refmap WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TOPICS: &str = r##"[
        {"id": 1, "name": "Background", "position_x": 80, "position_y": 80, "grid_width": 5, "grid_height": 3},
        {"id": 2, "name": "Methods", "position_x": 480, "position_y": 80}
    ]"##;

    fn canvas() -> RefCanvas {
        let mut canvas = RefCanvas::new("");
        assert_eq!(canvas.load_topics_json(TOPICS), r#"{"ok":true}"#);
        assert_eq!(canvas.load_connections_json("[]"), r#"{"ok":true}"#);
        canvas
    }

    #[test]
    fn partial_config_is_accepted() {
        let canvas = RefCanvas::new(r#"{"connect_debounce_ms": 300}"#);
        assert_eq!(canvas.get_mode(), "idle");
    }

    #[test]
    fn bad_json_reports_error() {
        let mut canvas = canvas();
        let reply = canvas.load_topics_json("not json");
        assert!(reply.starts_with(r#"{"ok":false,"error":""#));
    }

    #[test]
    fn drag_round_trip_through_json() {
        let mut canvas = canvas();
        assert!(canvas.handle_pointer_down(100.0, 100.0, 0, false, false, false, false, false, 0.0));
        assert_eq!(canvas.get_mode(), "drag");
        canvas.handle_pointer_move(180.0, 140.0, false, false, false, false, 16.0);
        canvas.handle_pointer_up(180.0, 140.0, false, false, false, false, 32.0);

        let requests: serde_json::Value =
            serde_json::from_str(&canvas.take_requests_json()).unwrap();
        assert_eq!(requests[0]["op"], "update_topic_position");
        assert_eq!(requests[0]["topic"], "1");
        assert_eq!(requests[0]["x"], 160.0);
        assert_eq!(requests[0]["y"], 120.0);

        let id = requests[0]["id"].as_f64().unwrap();
        assert!(canvas.complete_json(id, r#"{"status":"failed","message":"offline"}"#));
        let notes: serde_json::Value =
            serde_json::from_str(&canvas.take_notifications_json()).unwrap();
        assert_eq!(notes[0]["level"], "error");
    }

    #[test]
    fn effects_drain_as_tagged_json() {
        let mut canvas = canvas();
        canvas.handle_pointer_down(2000.0, 2000.0, 0, false, false, false, false, false, 0.0);
        let effects: serde_json::Value =
            serde_json::from_str(&canvas.take_effects_json()).unwrap();
        assert_eq!(effects[0]["effect"], "subscribe_pointer");
        assert_eq!(canvas.take_effects_json(), "[]");
    }

    #[test]
    fn context_menu_measures() {
        let mut canvas = canvas();
        canvas.set_viewport(0.0, 0.0, 1024.0, 768.0);
        canvas.handle_pointer_down(1000.0, 700.0, 2, false, false, false, false, false, 0.0);
        let panels: serde_json::Value = serde_json::from_str(&canvas.panels_json()).unwrap();
        assert!(panels["menu"].is_object());
        canvas.measure_panel("menu", 180.0, 120.0);
        let panels: serde_json::Value = serde_json::from_str(&canvas.panels_json()).unwrap();
        let x = panels["menu"]["panel"]["position"]["x"].as_f64().unwrap();
        assert_eq!(x, 1024.0 - 20.0 - 180.0);
    }
}
