//! Integration tests: input events → CanvasSession → requests, effects and
//! the rendered frame, against an in-memory store.

use pretty_assertions::assert_eq;
use refmap_core::geometry::{Point, rects_overlap};
use refmap_core::{
    AnchorId, AnchorRecord, CanvasConfig, ConnectionId, GridSize, ProjectId, TopicId, TopicRecord,
};
use refmap_editor::canvas::Level;
use refmap_editor::connection::DraftTarget;
use refmap_editor::{
    CanvasEffect, CanvasSession, Collaborator, GestureMode, InputEvent, MemoryStore, Modifiers,
    PersistRequest,
};

const PROJECT: u64 = 7;

fn store() -> MemoryStore {
    MemoryStore::from_json(include_str!("fixtures/project.json")).expect("fixture parses")
}

fn loaded() -> (CanvasSession, MemoryStore) {
    let mut store = store();
    let mut session = CanvasSession::new(CanvasConfig::default());
    session
        .load_project(ProjectId::from_raw(PROJECT), &mut store)
        .expect("project loads");
    session.take_effects();
    (session, store)
}

fn topic(id: u64, x: f32, y: f32, w: u32, h: u32) -> TopicRecord {
    TopicRecord {
        id: TopicId::from_raw(id),
        project_id: Some(ProjectId::from_raw(PROJECT)),
        name: format!("Topic {id}"),
        position_x: x,
        position_y: y,
        grid_width: Some(w),
        grid_height: Some(h),
        color: None,
        references: None,
    }
}

fn bare(topics: &[TopicRecord]) -> CanvasSession {
    let mut session = CanvasSession::new(CanvasConfig::default());
    session.apply_topics(topics);
    session.apply_connections(&[]);
    session
}

fn down(s: &mut CanvasSession, x: f32, y: f32, t: u64) -> bool {
    s.handle(&InputEvent::from_pointer_down(x, y, Modifiers::NONE, t))
}

fn moved(s: &mut CanvasSession, x: f32, y: f32, t: u64) -> bool {
    s.handle(&InputEvent::from_pointer_move(x, y, Modifiers::NONE, t))
}

fn up(s: &mut CanvasSession, x: f32, y: f32, t: u64) -> bool {
    s.handle(&InputEvent::from_pointer_up(x, y, Modifiers::NONE, t))
}

fn position(s: &CanvasSession, id: u64) -> Point {
    s.index().block(TopicId::from_raw(id)).unwrap().position
}

/// Press on `from`, hold past the debounce, release on `to`.
fn link_gesture(s: &mut CanvasSession, from: Point, to: Point) {
    down(s, from.x, from.y, 1_000);
    s.handle(&InputEvent::Tick { time_ms: 1_200 });
    moved(s, to.x, to.y, 1_220);
    up(s, to.x, to.y, 1_240);
}

// Anchor centers in the fixture (3 per row in topic 1, 4 in topic 2).
const A101: Point = Point { x: 125.0, y: 170.0 };
const A102: Point = Point { x: 165.0, y: 170.0 };
const A201: Point = Point { x: 445.0, y: 170.0 };
const A202: Point = Point { x: 485.0, y: 170.0 };

// ─── Loading ─────────────────────────────────────────────────────────────

#[test]
fn load_reads_topics_then_anchors_then_connections() {
    let (session, store) = loaded();
    assert_eq!(
        store.reads,
        vec!["topics", "anchors", "anchors", "anchors", "connections"]
    );
    let frame = session.frame();
    assert_eq!(frame.blocks.len(), 3);
    assert_eq!(frame.links.len(), 2);
    assert_eq!(frame.anchor_center(AnchorId::from_raw(201)), Some(A201));
}

#[test]
fn links_hidden_until_connections_arrive() {
    let (mut session, mut store) = loaded();
    let topics = store.list_topics(ProjectId::from_raw(PROJECT)).unwrap();
    session.apply_topics(&topics);
    assert!(session.frame().links.is_empty());

    let connections = store.list_connections(ProjectId::from_raw(PROJECT)).unwrap();
    session.apply_connections(&connections);
    assert_eq!(session.frame().links.len(), 2);
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[test]
fn unaligned_block_snaps_after_small_drag() {
    let mut session = bare(&[topic(1, 100.0, 100.0, 5, 3)]);
    down(&mut session, 150.0, 150.0, 0);
    moved(&mut session, 187.0, 155.0, 16);
    up(&mut session, 187.0, 155.0, 32);
    assert_eq!(position(&session, 1), Point::new(120.0, 100.0));
    assert_eq!(
        session.take_requests()[0].request,
        PersistRequest::UpdateTopicPosition {
            topic: TopicId::from_raw(1),
            x: 120.0,
            y: 100.0
        }
    );
}

#[test]
fn release_off_canvas_still_finishes() {
    let mut session = bare(&[topic(1, 400.0, 400.0, 5, 3)]);
    down(&mut session, 420.0, 420.0, 0);
    moved(&mut session, -300.0, 420.0, 16);
    up(&mut session, -300.0, 420.0, 32);
    assert_eq!(session.mode(), GestureMode::Idle);
    assert_eq!(position(&session, 1), Point::new(40.0, 400.0));
    assert_eq!(session.take_requests().len(), 1);
}

/// Drag topic 1 onto every grid spot in the given cell ranges and check it
/// never comes to rest on topic 2.
fn assert_no_overlap_at_rest(
    fixed_at: Point,
    gxs: std::ops::RangeInclusive<i32>,
    gys: std::ops::RangeInclusive<i32>,
) {
    let mut session = bare(&[
        topic(1, 1600.0, 1600.0, 5, 3),
        topic(2, fixed_at.x, fixed_at.y, 6, 4),
    ]);
    let fixed = session.index().bounds_of(TopicId::from_raw(2)).unwrap();
    for gx in gxs {
        for gy in gys.clone() {
            let start = position(&session, 1);
            let target = Point::new(gx as f32 * 40.0, gy as f32 * 40.0);
            down(&mut session, start.x + 20.0, start.y + 20.0, 0);
            moved(&mut session, target.x + 20.0, target.y + 20.0, 16);
            up(&mut session, target.x + 20.0, target.y + 20.0, 32);

            let rest = session.index().bounds_of(TopicId::from_raw(1)).unwrap();
            assert!(!rects_overlap(&rest, &fixed), "overlap after drag to ({gx}, {gy})");
            assert_eq!(rest.x % 40.0, 0.0);
            assert_eq!(rest.y % 40.0, 0.0);
        }
    }
}

#[test]
fn no_overlap_at_rest_mid_canvas() {
    assert_no_overlap_at_rest(Point::new(1200.0, 1200.0), 25..=36, 26..=35);
}

#[test]
fn no_overlap_at_rest_along_top_left_margin() {
    assert_no_overlap_at_rest(Point::new(40.0, 40.0), 0..=8, 0..=6);
}

#[test]
fn no_overlap_at_rest_at_bottom_right_limit() {
    assert_no_overlap_at_rest(Point::new(3720.0, 2800.0), 87..=100, 66..=75);
}

#[test]
fn drop_beside_block_on_top_row_moves_down() {
    let mut session = bare(&[topic(1, 40.0, 40.0, 5, 3), topic(2, 600.0, 40.0, 5, 3)]);
    down(&mut session, 620.0, 60.0, 0);
    moved(&mut session, 100.0, 60.0, 16);
    up(&mut session, 100.0, 60.0, 32);
    assert_eq!(position(&session, 2), Point::new(80.0, 160.0));
}

// ─── Selection ───────────────────────────────────────────────────────────

#[test]
fn marquee_selects_only_intersecting_blocks() {
    let mut session = bare(&[topic(1, 10.0, 10.0, 5, 3), topic(2, 300.0, 300.0, 5, 3)]);
    down(&mut session, 0.0, 0.0, 0);
    assert_eq!(session.mode(), GestureMode::Marquee);
    moved(&mut session, 250.0, 150.0, 16);
    assert!(session.frame().marquee.is_some());
    up(&mut session, 250.0, 150.0, 32);
    assert_eq!(session.selection().as_slice(), &[TopicId::from_raw(1)]);
    assert!(session.frame().marquee.is_none());
}

#[test]
fn background_click_clears_selection() {
    let mut session = bare(&[topic(1, 80.0, 80.0, 5, 3)]);
    session.select_all();
    down(&mut session, 1000.0, 1000.0, 0);
    up(&mut session, 1000.0, 1000.0, 10);
    assert!(session.selection().is_empty());
}

#[test]
fn group_drag_persists_every_member() {
    let mut session = bare(&[topic(1, 80.0, 80.0, 5, 3), topic(2, 400.0, 80.0, 5, 3)]);
    session.select_all();
    down(&mut session, 100.0, 100.0, 0);
    moved(&mut session, 100.0, 340.0, 16);
    up(&mut session, 100.0, 340.0, 32);
    assert_eq!(position(&session, 1), Point::new(80.0, 320.0));
    assert_eq!(position(&session, 2), Point::new(400.0, 320.0));
    assert_eq!(session.take_requests().len(), 2);
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[test]
fn twelve_anchors_keep_seven_cells_of_height() {
    let mut record = topic(1, 80.0, 80.0, 5, 7);
    record.references = Some(
        (0..12)
            .map(|i| AnchorRecord {
                id: AnchorId::from_raw(500 + i),
                topic_id: TopicId::from_raw(1),
                title: format!("Paper {i}"),
                doi: None,
                authors: None,
                abstract_text: None,
                notes: None,
            })
            .collect(),
    );
    let mut session = bare(&[record]);
    // Handle spans (260..280, 340..360).
    down(&mut session, 270.0, 350.0, 0);
    assert_eq!(session.mode(), GestureMode::Resize);
    moved(&mut session, 270.0, 100.0, 16);
    let block = session.index().block(TopicId::from_raw(1)).unwrap();
    assert_eq!(block.grid, GridSize::new(5, 7));

    // Three columns wider: six per row, two rows, five cells.
    moved(&mut session, 390.0, 100.0, 32);
    up(&mut session, 390.0, 100.0, 48);
    assert_eq!(
        session.take_requests()[0].request,
        PersistRequest::UpdateTopicDimensions {
            topic: TopicId::from_raw(1),
            width: 8,
            height: 5
        }
    );
}

// ─── Connections ─────────────────────────────────────────────────────────

#[test]
fn quick_release_on_anchor_shows_details() {
    let (mut session, _) = loaded();
    down(&mut session, A201.x, A201.y, 0);
    up(&mut session, A201.x, A201.y, 80);
    let effects = session.take_effects();
    assert!(effects.contains(&CanvasEffect::ShowReferenceDetails {
        anchor: AnchorId::from_raw(201),
        topic: TopicId::from_raw(2)
    }));
    let panel = session.panels().reference.unwrap();
    assert_eq!(panel.panel.position.y, A201.y + 15.0 + 8.0);
    assert!(session.take_requests().is_empty());
}

#[test]
fn held_press_released_on_other_anchor_opens_editor() {
    let (mut session, _) = loaded();
    down(&mut session, A101.x, A101.y, 0);
    moved(&mut session, A202.x, A202.y, 60);
    up(&mut session, A202.x, A202.y, 400);
    let effects = session.take_effects();
    assert!(effects.iter().any(|e| matches!(
        e,
        CanvasEffect::OpenDescriptionEditor(d) if d.target == DraftTarget::Create {
            source: AnchorId::from_raw(101),
            target: AnchorId::from_raw(202),
        }
    )));
    assert!(session.description_draft().is_some());
}

#[test]
fn link_released_over_background_cancels() {
    let (mut session, _) = loaded();
    down(&mut session, A101.x, A101.y, 0);
    session.handle(&InputEvent::Tick { time_ms: 200 });
    moved(&mut session, A202.x, A202.y, 220);
    up(&mut session, 1000.0, 1000.0, 240);
    assert_eq!(session.mode(), GestureMode::Idle);
    assert!(session.description_draft().is_none());
    assert!(session.take_requests().is_empty());
}

#[test]
fn link_back_to_source_creates_nothing() {
    let (mut session, _) = loaded();
    down(&mut session, A101.x, A101.y, 0);
    moved(&mut session, 300.0, 300.0, 200);
    assert_eq!(session.mode(), GestureMode::Connect);
    assert!(session.frame().preview.is_some());
    moved(&mut session, A101.x, A101.y, 260);
    up(&mut session, A101.x, A101.y, 300);

    assert_eq!(session.mode(), GestureMode::Idle);
    assert!(session.description_draft().is_none());
    assert!(session.frame().preview.is_none());
    assert!(session.take_requests().is_empty());
}

#[test]
fn created_link_stays_visible_until_reload() {
    let (mut session, mut store) = loaded();
    link_gesture(&mut session, A102, A202);
    let draft = session.description_draft().cloned().unwrap();
    assert_eq!(
        draft.target,
        DraftTarget::Create {
            source: AnchorId::from_raw(102),
            target: AnchorId::from_raw(202)
        }
    );
    assert!(session.take_effects().contains(&CanvasEffect::OpenDescriptionEditor(draft)));

    assert!(session.save_description("fine-tunes"));
    let frame = session.frame();
    assert_eq!(frame.links.len(), 3);
    assert_eq!(frame.links.iter().filter(|l| l.id.is_none()).count(), 1);

    assert_eq!(session.flush(&mut store), 1);
    let frame = session.frame();
    assert_eq!(frame.links.len(), 3);
    assert!(frame.links.iter().all(|l| l.id.is_some()));
    assert_eq!(session.connections().len(), 3);
}

#[test]
fn failed_create_drops_preview_and_notifies() {
    let (mut session, mut store) = loaded();
    store.fail_writes = true;
    link_gesture(&mut session, A102, A202);
    session.save_description("");
    session.flush(&mut store);

    assert_eq!(session.frame().links.len(), 2);
    let notes = session.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, Level::Error);
    assert!(notes[0].message.starts_with("Could not create connection"));
}

#[test]
fn failed_move_keeps_local_position() {
    let (mut session, mut store) = loaded();
    store.fail_writes = true;
    down(&mut session, 100.0, 460.0, 0);
    moved(&mut session, 180.0, 460.0, 16);
    up(&mut session, 180.0, 460.0, 32);
    session.flush(&mut store);

    assert_eq!(position(&session, 3), Point::new(160.0, 440.0));
    assert_eq!(store.topics[2].position_x, 80.0);
    assert_eq!(session.take_notifications().len(), 1);
}

#[test]
fn edit_prefills_and_updates_locally() {
    let (mut session, mut store) = loaded();
    let id = ConnectionId::from_raw(900);
    assert!(session.edit_connection(id));
    assert_eq!(session.description_draft().unwrap().text, "optimizer used");
    assert!(session.save_description("optimizer for all runs"));

    let link = session.connections().iter().find(|c| c.id == id).unwrap();
    assert_eq!(link.label(), Some("optimizer for all runs"));
    session.flush(&mut store);
    let stored = store.connections.iter().find(|c| c.id == id).unwrap();
    assert_eq!(stored.description.as_deref(), Some("optimizer for all runs"));
}

#[test]
fn delete_removes_link_and_queues_request() {
    let (mut session, _) = loaded();
    assert!(session.delete_connection(ConnectionId::from_raw(900)));
    assert_eq!(session.frame().links.len(), 1);
    assert_eq!(
        session.take_requests()[0].request,
        PersistRequest::DeleteConnection {
            id: ConnectionId::from_raw(900)
        }
    );
}

#[test]
fn link_tooltip_hides_after_delay() {
    let (mut session, _) = loaded();
    // On link 900, between the two topics.
    assert!(moved(&mut session, 300.0, 172.0, 0));
    let panel = session.panels().link.unwrap();
    assert_eq!(panel.connection, ConnectionId::from_raw(900));
    assert!(session.frame().links.iter().any(|l| l.hovered));

    moved(&mut session, 300.0, 400.0, 10);
    session.handle(&InputEvent::Tick { time_ms: 60 });
    assert!(session.panels().link.is_some());
    session.handle(&InputEvent::Tick { time_ms: 110 });
    assert!(session.panels().link.is_none());
}

#[test]
fn link_tooltip_stays_while_pointer_inside() {
    let (mut session, _) = loaded();
    moved(&mut session, 300.0, 172.0, 0);
    moved(&mut session, 300.0, 400.0, 10);
    session.pointer_enter_link_panel();
    session.handle(&InputEvent::Tick { time_ms: 500 });
    assert!(session.panels().link.is_some());
    session.pointer_leave_link_panel(600);
    session.handle(&InputEvent::Tick { time_ms: 700 });
    assert!(session.panels().link.is_none());
}
