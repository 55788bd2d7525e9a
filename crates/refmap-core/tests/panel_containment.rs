//! Integration tests: every placement routine keeps panels inside the
//! viewport margins, whatever the anchor position.

use refmap_core::geometry::{Point, Rect, Size};
use refmap_core::{FloatingPanel, PanelAnchor, TooltipPlacer};

const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1280.0, 720.0);

fn assert_contained(placer: &TooltipPlacer, pos: Point, size: Size, what: &str) {
    let m = placer.config.margin;
    assert!(
        pos.x >= VIEWPORT.x + m - 1e-3 && pos.x + size.width <= VIEWPORT.right() - m + 1e-3,
        "{what}: x {pos:?} with {size:?} escapes"
    );
    assert!(
        pos.y >= VIEWPORT.y + m - 1e-3 && pos.y + size.height <= VIEWPORT.bottom() - m + 1e-3,
        "{what}: y {pos:?} with {size:?} escapes"
    );
}

fn probe_points() -> impl Iterator<Item = Point> {
    // Corners, edges, centre, and points outside the viewport.
    let xs = [-50.0, 0.0, 5.0, 300.0, 640.0, 1000.0, 1275.0, 1280.0, 1400.0];
    let ys = [-50.0, 0.0, 5.0, 200.0, 360.0, 600.0, 715.0, 720.0, 900.0];
    xs.into_iter()
        .flat_map(move |x| ys.into_iter().map(move |y| Point::new(x, y)))
}

fn sizes() -> [Size; 4] {
    [
        Size::new(120.0, 40.0),
        Size::new(300.0, 100.0),
        Size::new(600.0, 400.0),
        // Exactly the viewport minus both margins.
        Size::new(1240.0, 680.0),
    ]
}

#[test]
fn reference_tooltips_stay_inside() {
    let placer = TooltipPlacer::default();
    for size in sizes() {
        for p in probe_points() {
            let pos = placer.place_reference_tooltip(p, 15.0, Some(size), VIEWPORT);
            assert_contained(&placer, pos, size, "reference");
        }
    }
}

#[test]
fn link_tooltips_stay_inside_for_any_direction() {
    let placer = TooltipPlacer::default();
    let directions = [
        (1.0, 0.0),
        (0.0, 1.0),
        (-1.0, 0.0),
        (0.0, -1.0),
        (0.7, 0.7),
        (-0.3, 0.9),
        (0.0, 0.0),
    ];
    for size in sizes() {
        for p in probe_points() {
            for (dx, dy) in directions {
                let from = Point::new(p.x - dx * 100.0, p.y - dy * 100.0);
                let to = Point::new(p.x + dx * 100.0, p.y + dy * 100.0);
                let pos = placer.place_connection_tooltip(p, from, to, Some(size), VIEWPORT);
                assert_contained(&placer, pos, size, "link");
            }
        }
    }
}

#[test]
fn context_menus_stay_inside() {
    let placer = TooltipPlacer::default();
    for size in sizes() {
        for p in probe_points() {
            let pos = placer.place_context_menu(p, Some(size), VIEWPORT);
            assert_contained(&placer, pos, size, "menu");
        }
    }
}

#[test]
fn unmeasured_panel_uses_estimate_then_settles() {
    let placer = TooltipPlacer::default();
    for p in probe_points() {
        let mut panel = FloatingPanel::open(&placer, PanelAnchor::Cursor { at: p }, VIEWPORT);
        assert_contained(&placer, panel.position, placer.config.estimated_size, "estimate");

        let real = Size::new(220.0, 260.0);
        panel.measure(&placer, real, VIEWPORT);
        assert_contained(&placer, panel.position, real, "measured");
        assert_eq!(panel.rect(&placer).size(), real);
    }
}
