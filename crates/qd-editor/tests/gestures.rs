//! Integration tests: gesture behaviour through the composer (qd-editor).
//!
//! Drives the composer with normalized input over a retained `SurfaceLayout`
//! and checks the interaction invariants end to end.

use pretty_assertions::assert_eq;
use qd_core::{
    BackgroundCatalog, EditorConfig, ElementId, OverflowPolicy, Point, QuoteDesign, Size,
    SurfaceLayout,
};
use qd_editor::{Composer, Dispatch, ElementChange, GestureRejected, InputEvent};
use qd_render::HitPart;

const ORIGIN: Point = Point::new(30.0, 70.0);

fn composer_with(config: EditorConfig) -> Composer<SurfaceLayout> {
    let mut composer = Composer::new(
        SurfaceLayout::new(ORIGIN, Size::new(800.0, 600.0)),
        QuoteDesign::default(),
        config,
        BackgroundCatalog::builtin(),
    );
    let layout = composer.geometry_mut();
    layout.mount_at(ElementId::quote(), Point::new(40.0, 40.0), Size::new(300.0, 60.0));
    layout.mount_at(ElementId::author(), Point::new(40.0, 150.0), Size::new(200.0, 30.0));
    composer.take_notices();
    composer
}

fn composer() -> Composer<SurfaceLayout> {
    composer_with(EditorConfig::default())
}

fn position(c: &Composer<SurfaceLayout>, id: ElementId) -> Point {
    c.controller(id).map(|e| e.position()).unwrap()
}

fn rotation(c: &Composer<SurfaceLayout>, id: ElementId) -> f64 {
    c.controller(id).map(|e| e.rotation()).unwrap()
}

/// Viewport point `(dx, dy)` inside the quote's body.
fn on_quote(dx: f64, dy: f64) -> (f64, f64) {
    (ORIGIN.x + 40.0 + dx, ORIGIN.y + 40.0 + dy)
}

// ─── Move ───────────────────────────────────────────────────────────────

#[test]
fn drag_stays_inside_surface() {
    let mut c = composer();
    let (x, y) = on_quote(20.0, 20.0);
    assert!(matches!(
        c.dispatch(&InputEvent::from_mouse_down(x, y)),
        Dispatch::Began {
            part: HitPart::Body,
            ..
        }
    ));

    let path = [
        (-400.0, -400.0),
        (100.0, 900.0),
        (2000.0, 300.0),
        (450.0, -20.0),
        (10_000.0, 10_000.0),
        (333.3, 222.2),
    ];
    for (px, py) in path {
        c.dispatch(&InputEvent::from_mouse_move(px, py));
        let p = position(&c, ElementId::quote());
        assert!((0.0..=500.0).contains(&p.x), "x out of range: {}", p.x);
        assert!((0.0..=540.0).contains(&p.y), "y out of range: {}", p.y);
    }
}

#[test]
fn drag_keeps_grab_point_under_pointer() {
    let mut c = composer();
    let (x, y) = on_quote(25.0, 12.0);
    c.dispatch(&InputEvent::from_mouse_down(x, y));

    for (px, py) in [(200.0, 200.0), (310.0, 260.0), (400.0, 180.0)] {
        c.dispatch(&InputEvent::from_mouse_move(px, py));
        let p = position(&c, ElementId::quote());
        let grab = Point::new(px, py) - (ORIGIN + p.to_vec2());
        assert!((grab.x - 25.0).abs() < 1e-9 && (grab.y - 12.0).abs() < 1e-9);
    }
}

#[test]
fn move_gesture_never_rotates() {
    let mut c = composer();
    c.set_rotation(ElementId::quote(), 12.0);
    let (x, y) = on_quote(150.0, 30.0);
    assert!(matches!(
        c.begin_move(ElementId::quote(), Point::new(x, y)),
        Dispatch::Began { .. }
    ));
    c.dispatch(&InputEvent::from_mouse_move(500.0, 400.0));
    c.dispatch(&InputEvent::from_mouse_move(100.0, 120.0));
    assert_eq!(rotation(&c, ElementId::quote()), 12.0);
}

#[test]
fn oversized_element_follows_overflow_policy() {
    let grab = Point::new(ORIGIN.x + 50.0, ORIGIN.y + 50.0);

    let mut pinned = composer();
    pinned
        .geometry_mut()
        .mount_at(ElementId::quote(), Point::new(0.0, 40.0), Size::new(1000.0, 60.0));
    pinned.begin_move(ElementId::quote(), grab);
    pinned.dispatch(&InputEvent::from_mouse_move(600.0, 300.0));
    assert_eq!(position(&pinned, ElementId::quote()), Point::new(0.0, 220.0));

    let mut centred = composer_with(EditorConfig {
        overflow: OverflowPolicy::Center,
        ..EditorConfig::default()
    });
    centred
        .geometry_mut()
        .mount_at(ElementId::quote(), Point::new(0.0, 40.0), Size::new(1000.0, 60.0));
    centred.begin_move(ElementId::quote(), grab);
    centred.dispatch(&InputEvent::from_mouse_move(600.0, 300.0));
    assert_eq!(position(&centred, ElementId::quote()), Point::new(-100.0, 220.0));
}

// ─── Rotate ─────────────────────────────────────────────────────────────

#[test]
fn rotation_follows_atan2_plus_ninety() {
    let mut c = composer();
    assert!(c.begin_rotate(ElementId::quote()).stops_propagation());

    // Quote centre in viewport space.
    let (cx, cy) = (ORIGIN.x + 190.0, ORIGIN.y + 70.0);
    for (px, py) in [(cx, cy - 100.0), (cx + 50.0, cy + 50.0), (cx - 30.0, cy - 10.0)] {
        c.dispatch(&InputEvent::from_mouse_move(px, py));
        let expected = (py - cy).atan2(px - cx) * 180.0 / std::f64::consts::PI + 90.0;
        assert!((rotation(&c, ElementId::quote()) - expected).abs() < 1e-9);
    }
    // Straight up reads 0°; pointer up-left stays raw rather than wrapping.
    c.dispatch(&InputEvent::from_mouse_move(cx, cy - 100.0));
    assert!(rotation(&c, ElementId::quote()).abs() < 1e-9);
    c.dispatch(&InputEvent::from_mouse_move(cx - 100.0, cy - 100.0));
    assert!((rotation(&c, ElementId::quote()) - (-45.0)).abs() < 1e-9);
    assert!((c.design().quote_rotation - (-45.0)).abs() < 1e-9);
}

#[test]
fn rotate_gesture_never_moves() {
    let mut c = composer();
    c.begin_rotate(ElementId::author());
    for (px, py) in [(0.0, 0.0), (900.0, 700.0), (400.0, 20.0)] {
        c.dispatch(&InputEvent::from_mouse_move(px, py));
    }
    assert_eq!(position(&c, ElementId::author()), Point::new(40.0, 150.0));
}

// ─── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn release_ends_gesture_and_is_idempotent() {
    let mut c = composer();
    let (x, y) = on_quote(5.0, 5.0);
    c.dispatch(&InputEvent::from_mouse_down(x, y));
    assert_eq!(c.active_element(), Some(ElementId::quote()));

    assert_eq!(
        c.dispatch(&InputEvent::from_mouse_up()),
        Dispatch::Ended(ElementId::quote())
    );
    assert_eq!(c.dispatch(&InputEvent::from_mouse_up()), Dispatch::Ignored);
    assert!(!c.gesture_active());
    assert!(c.controller(ElementId::quote()).unwrap().state().is_idle());

    // Moves after release change nothing.
    let before = position(&c, ElementId::quote());
    assert_eq!(c.dispatch(&InputEvent::from_mouse_move(500.0, 500.0)), Dispatch::Ignored);
    assert_eq!(position(&c, ElementId::quote()), before);
}

#[test]
fn second_gesture_is_rejected_while_one_is_active() {
    let mut c = composer();
    let (x, y) = on_quote(5.0, 5.0);
    c.dispatch(&InputEvent::from_mouse_down(x, y));

    assert_eq!(
        c.begin_rotate(ElementId::author()),
        Dispatch::Rejected(GestureRejected::Busy(ElementId::quote()))
    );
    assert!(c.controller(ElementId::author()).unwrap().state().is_idle());

    c.dispatch(&InputEvent::from_touch_cancel());
    assert!(matches!(
        c.begin_rotate(ElementId::author()),
        Dispatch::Began { .. }
    ));
}

#[test]
fn move_is_dropped_while_surface_is_detached() {
    let mut c = composer();
    let (x, y) = on_quote(5.0, 5.0);
    c.dispatch(&InputEvent::from_mouse_down(x, y));
    c.dispatch(&InputEvent::from_mouse_move(300.0, 300.0));
    let committed = position(&c, ElementId::quote());

    c.geometry_mut().detach();
    assert_eq!(c.dispatch(&InputEvent::from_mouse_move(10.0, 10.0)), Dispatch::Ignored);
    assert_eq!(position(&c, ElementId::quote()), committed);

    c.geometry_mut().attach();
    assert!(matches!(
        c.dispatch(&InputEvent::from_mouse_move(310.0, 300.0)),
        Dispatch::Changed(ElementChange::Moved { .. })
    ));
}

#[test]
fn unmounted_element_cannot_start() {
    let mut c = composer();
    c.geometry_mut().unmount(ElementId::author());
    assert_eq!(
        c.begin_move(ElementId::author(), Point::new(100.0, 100.0)),
        Dispatch::Rejected(GestureRejected::NotMounted(ElementId::author()))
    );
    assert!(!c.gesture_active());
}

// ─── Touch ──────────────────────────────────────────────────────────────

#[test]
fn touch_and_mouse_produce_identical_trajectories() {
    let start = on_quote(30.0, 15.0);
    let path = [(120.0, 140.0), (700.0, 90.0), (-50.0, 400.0), (260.0, 260.0)];

    let mut mouse = composer();
    let mut touch = composer();
    mouse.dispatch(&InputEvent::from_mouse_down(start.0, start.1));
    touch.dispatch(&InputEvent::from_touch_start(&[start, (1.0, 1.0)]).unwrap());

    for p in path {
        let a = mouse.dispatch(&InputEvent::from_mouse_move(p.0, p.1));
        let b = touch.dispatch(&InputEvent::from_touch_move(&[p]).unwrap());
        assert_eq!(a, b);
    }
    mouse.dispatch(&InputEvent::from_mouse_up());
    touch.dispatch(&InputEvent::from_touch_end());

    mouse.begin_rotate(ElementId::author());
    touch.begin_rotate(ElementId::author());
    for p in path {
        let a = mouse.dispatch(&InputEvent::from_mouse_move(p.0, p.1));
        let b = touch.dispatch(&InputEvent::from_touch_move(&[p]).unwrap());
        assert_eq!(a, b);
    }
    assert_eq!(
        position(&mouse, ElementId::quote()),
        position(&touch, ElementId::quote())
    );
    assert_eq!(
        rotation(&mouse, ElementId::author()),
        rotation(&touch, ElementId::author())
    );
}

// ─── Design updates ─────────────────────────────────────────────────────

/// Composer whose boxes come only from measuring the design.
fn measured_composer() -> Composer<SurfaceLayout> {
    let mut composer = Composer::new(
        SurfaceLayout::new(ORIGIN, Size::new(800.0, 600.0)),
        QuoteDesign::default(),
        EditorConfig::default(),
        BackgroundCatalog::builtin(),
    );
    composer.take_notices();
    composer
}

fn assert_layout_matches_controllers(c: &Composer<SurfaceLayout>) {
    for id in [ElementId::quote(), ElementId::author()] {
        let placed = c.geometry().element(id).map(|b| (b.position, b.rotation));
        assert_eq!(placed, Some((position(c, id), rotation(c, id))), "{id:?}");
    }
}

#[test]
fn reshown_author_keeps_grab_offset() {
    let mut c = measured_composer();
    let shown = c.design().clone();
    c.update_design(QuoteDesign {
        author_name: String::new(),
        ..shown.clone()
    });
    assert!(c.geometry().element(ElementId::author()).is_none());
    c.update_design(shown);

    let start = position(&c, ElementId::author());
    assert_eq!(start, Point::new(40.0, 150.0));
    let grab = Point::new(ORIGIN.x + start.x + 5.0, ORIGIN.y + start.y + 5.0);
    assert!(matches!(
        c.begin_move(ElementId::author(), grab),
        Dispatch::Began { .. }
    ));
    assert_eq!(
        c.dispatch(&InputEvent::from_mouse_move(grab.x + 1.0, grab.y + 1.0)),
        Dispatch::Changed(ElementChange::Moved {
            id: ElementId::author(),
            position: Point::new(41.0, 151.0),
        })
    );
}

#[test]
fn layout_follows_controllers_across_design_updates() {
    let mut c = measured_composer();
    assert_layout_matches_controllers(&c);

    c.set_position(ElementId::quote(), Point::new(120.0, 260.0));
    c.set_rotation(ElementId::author(), -30.0);
    assert_layout_matches_controllers(&c);

    let mut design = c.design().clone();
    design.quote_style.size = 48.0;
    design.quote_text = "Longer words take more room on the surface".to_string();
    c.update_design(design.clone());
    assert_layout_matches_controllers(&c);

    design.author_name.clear();
    c.update_design(design.clone());
    assert!(c.geometry().element(ElementId::author()).is_none());

    design.author_name = "Maya Angelou".to_string();
    c.update_design(design);
    assert_layout_matches_controllers(&c);
    assert_eq!(rotation(&c, ElementId::author()), -30.0);
}
