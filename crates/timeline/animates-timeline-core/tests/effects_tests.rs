use animates_property_core::{PropertyBag, TypeRegistry};
use animates_timeline_core::{
    Effect, FiniteEffect, MoveEffect, MultiPointRotateEffect, Position, TimelineConfig,
    TimelineError, NEW_POINT_SIGNAL, OPEN_ENDED,
};
use serde_json::{json, Map, Value};

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn mk_move(start: i64, end: i64) -> MoveEffect {
    MoveEffect::new(
        &json!({
            "startTick": start,
            "endTick": end,
            "path": {
                "startPosition": {"x": 0.0, "y": 0.0},
                "endPosition": {"x": 100.0, "y": 50.0},
            },
        }),
        &TypeRegistry::with_builtins(),
        &TimelineConfig::default(),
    )
    .unwrap()
}

fn mk_rotate(start: i64, end: i64) -> MultiPointRotateEffect {
    MultiPointRotateEffect::new(
        &json!({"startTick": start, "endTick": end}),
        &TypeRegistry::with_builtins(),
        &TimelineConfig::default(),
    )
    .unwrap()
}

fn edits(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn frame_at(effect: &dyn Effect, tick: i64) -> PropertyBag {
    let mut frame = PropertyBag::from_value(json!({"position": {"x": -1.0, "y": -1.0}}));
    effect.properties_at(tick, &mut frame);
    frame
}

#[test]
fn test_finite_effect_defaults() {
    let reg = TypeRegistry::with_builtins();
    let cfg = TimelineConfig::default();
    let fx = FiniteEffect::new(&json!({}), &reg, &cfg).unwrap();
    assert_eq!(fx.start_tick(), 0);
    assert_eq!(fx.end_tick(), 100);
    assert!(!fx.is_infinite());
    assert!(fx.affected_properties().is_empty());
    assert!(!fx.guid().is_empty());

    let open = FiniteEffect::new(&json!({"startTick": 5, "endTick": -1}), &reg, &cfg).unwrap();
    assert!(open.is_infinite());
    assert!(open.is_active_at(1_000_000));
    assert_eq!(open.clamp_tick(1_000_000), 1_000_000);
}

#[test]
fn test_finite_effect_out_of_order_bounds_use_default_span() {
    let reg = TypeRegistry::with_builtins();
    let cfg = TimelineConfig {
        default_span: 30,
        ..TimelineConfig::default()
    };
    let fx = FiniteEffect::new(&json!({"startTick": 50, "endTick": 10}), &reg, &cfg).unwrap();
    assert_eq!(fx.end_tick(), 80);
}

#[test]
fn test_bound_edits_are_validated() {
    let mut fx = mk_move(10, 20);
    assert!(matches!(
        fx.set_option("startTick", json!(25)),
        Err(TimelineError::InvalidBounds { .. })
    ));
    assert!(fx.set_option("startTick", json!(-3)).is_err());
    assert!(fx.set_option("endTick", json!(5)).is_err());
    fx.set_option("endTick", json!(OPEN_ENDED)).unwrap();
    assert!(fx.is_infinite());
    fx.set_option("startTick", json!(500)).unwrap();
    assert_eq!(fx.start_tick(), 500);
}

#[test]
fn test_conflict_detection() {
    let fx = mk_move(0, 10);
    assert!(fx.has_conflict_with_list_of_properties(&["position"], true));
    assert!(fx.has_conflict_with_list_of_properties(&["position.x"], false));
    assert!(!fx.has_conflict_with_list_of_properties(&["position.x"], true));
    assert!(!fx.has_conflict_with_list_of_properties(&["positional"], false));
    assert!(!fx.has_conflict_with_list_of_properties(&[], false));

    let spin = mk_rotate(0, 10);
    assert!(!fx.has_conflict_with_properties(&spin));
    assert!(fx.has_conflict_with_properties(&mk_move(50, 60)));
}

#[test]
fn test_move_effect_defaults() {
    let fx = MoveEffect::new(
        &json!({}),
        &TypeRegistry::with_builtins(),
        &TimelineConfig::default(),
    )
    .unwrap();
    assert_eq!(fx.start_position(), Position::new(0.0, 0.0));
    assert_eq!(fx.end_position(), Position::new(0.0, 0.0));
    assert_eq!(fx.option("path.kind"), Some(&json!("Straight")));
    assert_eq!(fx.affected_properties(), vec!["position"]);
}

#[test]
fn test_move_effect_rejects_unknown_path_kind() {
    let res = MoveEffect::new(
        &json!({"path": {"kind": "Zigzag"}}),
        &TypeRegistry::with_builtins(),
        &TimelineConfig::default(),
    );
    assert!(res.is_err());
}

#[test]
fn test_move_effect_interpolates_position() {
    let fx = mk_move(10, 20);

    let before = frame_at(&fx, 5);
    assert_eq!(before.get_f64("position.x"), Some(-1.0));

    let mid = frame_at(&fx, 15);
    approx(mid.get_f64("position.x").unwrap(), 50.0, 1e-9);
    approx(mid.get_f64("position.y").unwrap(), 25.0, 1e-9);

    let after = frame_at(&fx, 90);
    approx(after.get_f64("position.x").unwrap(), 100.0, 1e-9);
    approx(after.get_f64("position.y").unwrap(), 50.0, 1e-9);
}

#[test]
fn test_open_ended_move_keeps_going() {
    let mut fx = mk_move(0, 10);
    fx.set_option("endTick", json!(OPEN_ENDED)).unwrap();
    // Reference span is the default 100 ticks
    let frame = frame_at(&fx, 150);
    approx(frame.get_f64("position.x").unwrap(), 150.0, 1e-9);
    approx(frame.get_f64("position.y").unwrap(), 75.0, 1e-9);
}

#[test]
fn test_move_effect_updates_endpoints() {
    let mut fx = mk_move(10, 20);

    let outcome = fx.update_properties(10, &edits(json!({"position.x": 5.0, "opacity": 0.5})));
    assert_eq!(outcome.updated_properties, vec!["position.x"]);
    assert_eq!(fx.start_position(), Position::new(5.0, 0.0));

    let outcome = fx.update_properties(20, &edits(json!({"position.x": 7.0, "position.y": 8.0})));
    assert_eq!(outcome.updated_properties, vec!["position.x", "position.y"]);
    assert_eq!(fx.end_position(), Position::new(7.0, 8.0));
    assert!(outcome.new_properties.is_empty());
}

#[test]
fn test_move_effect_ignores_mid_span_and_inactive_edits() {
    let mut fx = mk_move(10, 20);
    let input = edits(json!({"position.x": 5.0}));
    assert!(fx.update_properties(15, &input).updated_properties.is_empty());
    assert!(fx.update_properties(30, &input).updated_properties.is_empty());
    assert_eq!(fx.start_position(), Position::new(0.0, 0.0));
    assert_eq!(fx.end_position(), Position::new(100.0, 50.0));
}

#[test]
fn test_move_effect_rejected_value_is_not_consumed() {
    let mut fx = mk_move(10, 20);
    let outcome = fx.update_properties(10, &edits(json!({"position.x": "left"})));
    assert!(outcome.updated_properties.is_empty());
    assert_eq!(fx.start_position(), Position::new(0.0, 0.0));
}

#[test]
fn test_rejected_endpoint_object_leaves_path_unchanged() {
    let mut fx = mk_move(10, 20);
    let res = fx.set_option("path.startPosition", json!({"x": 5.0, "y": "bad"}));
    assert!(res.is_err());
    assert_eq!(fx.start_position(), Position::new(0.0, 0.0));

    fx.set_option("path.startPosition", json!({"x": 5.0, "y": 6.0})).unwrap();
    assert_eq!(fx.start_position(), Position::new(5.0, 6.0));
}

#[test]
fn test_rejected_point_rewrite_keeps_existing_point() {
    let mut fx = mk_rotate(0, 100);
    fx.add_point("p1", 30, 10.0, "clockwise").unwrap();
    assert!(fx.add_point("p1", 60, 80.0, "sideways").is_err());

    let points = fx.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].tick, 30);
    assert_eq!(points[0].get_f64("angle"), Some(10.0));
}

#[test]
fn test_rotate_effect_without_points_writes_nothing() {
    let fx = mk_rotate(0, 100);
    assert!(fx.points().is_empty());
    let mut frame = PropertyBag::from_value(json!({"angle": 12.0}));
    fx.properties_at(50, &mut frame);
    assert_eq!(frame.get_f64("angle"), Some(12.0));
}

#[test]
fn test_rotate_effect_points_are_sorted() {
    let mut fx = mk_rotate(0, 100);
    fx.add_point("late", 80, 10.0, "clockwise").unwrap();
    fx.add_point("early", 20, 5.0, "counter-clockwise").unwrap();
    let ticks: Vec<i64> = fx.points().iter().map(|p| p.tick).collect();
    assert_eq!(ticks, vec![20, 80]);
    assert_eq!(fx.points()[0].get("motion"), Some(&json!("counter-clockwise")));
}

#[test]
fn test_rotate_effect_rejects_unknown_motion() {
    let mut fx = mk_rotate(0, 100);
    assert!(fx.add_point("p", 10, 1.0, "sideways").is_err());
}

#[test]
fn test_rotate_effect_interpolation() {
    let mut fx = mk_rotate(0, 200);
    fx.add_point("p1", 0, 0.0, "clockwise").unwrap();
    fx.add_point("p2", 100, 90.0, "clockwise").unwrap();

    let mut frame = PropertyBag::new();
    fx.properties_at(50, &mut frame);
    approx(frame.get_f64("angle").unwrap(), 45.0, 1e-9);

    // Past the last point the angle holds
    fx.properties_at(150, &mut frame);
    approx(frame.get_f64("angle").unwrap(), 90.0, 1e-9);
}

#[test]
fn test_rotate_slope_uses_absolute_tick() {
    let mut fx = mk_rotate(0, 300);
    fx.add_point("p1", 100, 0.0, "clockwise").unwrap();
    fx.add_point("p2", 200, 100.0, "clockwise").unwrap();

    let mut frame = PropertyBag::new();
    fx.properties_at(150, &mut frame);
    approx(frame.get_f64("angle").unwrap(), 150.0, 1e-9);

    // Before the first point nothing is written
    let mut early = PropertyBag::new();
    fx.properties_at(50, &mut early);
    assert!(early.get("angle").is_none());
}

#[test]
fn test_rotate_update_drops_mistyped_values_but_consumes() {
    let mut fx = mk_rotate(0, 100);
    fx.add_point("p1", 30, 10.0, "clockwise").unwrap();
    let outcome = fx.update_properties(30, &edits(json!({"angle": "steep", "motion": 4})));
    assert_eq!(outcome.updated_properties, vec!["angle", "motion"]);

    let points = fx.points();
    assert_eq!(points[0].get_f64("angle"), Some(10.0));
    assert_eq!(points[0].get("motion"), Some(&json!("clockwise")));
}

#[test]
fn test_rotate_update_ignores_unrelated_edits() {
    let mut fx = mk_rotate(0, 100);
    let outcome = fx.update_properties(10, &edits(json!({"position.x": 1.0})));
    assert!(outcome.updated_properties.is_empty());
    assert!(fx.points().is_empty());
}

#[test]
fn test_rotate_update_creates_point_and_signals() {
    let mut fx = mk_rotate(0, 100);
    let outcome = fx.update_properties(30, &edits(json!({"angle": 45.0})));
    assert_eq!(outcome.updated_properties, vec!["angle", "motion"]);

    let points = fx.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].tick, 30);
    assert_eq!(points[0].get_f64("angle"), Some(45.0));
    assert_eq!(points[0].get("motion"), Some(&json!("clockwise")));

    let signal = &outcome.new_properties[NEW_POINT_SIGNAL];
    assert_eq!(signal["guid"], json!(points[0].guid));
    assert_eq!(signal["target"], json!(fx.guid().as_str()));
}

#[test]
fn test_rotate_update_edits_existing_point() {
    let mut fx = mk_rotate(0, 100);
    fx.add_point("p1", 30, 10.0, "clockwise").unwrap();
    let outcome = fx.update_properties(30, &edits(json!({"motion": "counter-clockwise"})));
    assert_eq!(outcome.updated_properties, vec!["angle", "motion"]);
    assert!(outcome.new_properties.is_empty());

    let points = fx.points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].get_f64("angle"), Some(10.0));
    assert_eq!(points[0].get("motion"), Some(&json!("counter-clockwise")));
}

#[test]
fn test_rotate_update_honours_signal_for_this_effect() {
    let mut fx = mk_rotate(0, 100);
    let target = fx.guid().to_string();
    let input = edits(json!({
        "angle": 20.0,
        NEW_POINT_SIGNAL: {"guid": "shared-point", "target": target},
    }));
    let outcome = fx.update_properties(40, &input);
    assert_eq!(outcome.updated_properties, vec!["angle", "motion"]);
    assert!(outcome.new_properties.is_empty());
    assert_eq!(fx.points()[0].guid, "shared-point");
}

#[test]
fn test_rotate_update_ignores_signal_for_other_effect() {
    let mut fx = mk_rotate(0, 100);
    let input = edits(json!({
        "angle": 20.0,
        NEW_POINT_SIGNAL: {"guid": "shared-point", "target": "someone-else"},
    }));
    let outcome = fx.update_properties(40, &input);
    let points = fx.points();
    assert_eq!(points.len(), 1);
    assert_ne!(points[0].guid, "shared-point");
    assert!(outcome.new_properties.contains_key(NEW_POINT_SIGNAL));
}
