use serde_json::json;

use super::*;
use crate::foundation::core::{Point, Vec2};
use crate::scene::kinds::BuiltinKind;
use crate::scene::object::EntityKind;

fn built(doc: serde_json::Value) -> Registry {
    let mut r = Registry::new();
    r.register_document(&doc).unwrap();
    r.build_all().unwrap();
    r
}

fn build_err(doc: serde_json::Value) -> StagehandError {
    let mut r = Registry::new();
    r.register_document(&doc).unwrap();
    r.build_all().unwrap_err()
}

fn sized(value: Option<Value>, properties: Properties) -> StagehandResult<SceneObject> {
    let side = match value {
        Some(v) => v.as_f64().map_err(|e| StagehandError::object_with("bad side", e))?,
        None => 1.0,
    };
    Ok(SceneObject::new(
        EntityKind::User(String::new()),
        None,
        properties,
        kurbo::Size::new(side, side),
    ))
}

#[test]
fn duplicate_names_are_rejected() {
    let mut r = Registry::new();
    r.add("title", json!("a")).unwrap();
    let err = r.add("title", json!("b")).unwrap_err();
    assert!(err.is_object());
    assert!(err.to_string().contains("already exists"));

    // Different raw keys that normalize to the same name collide too.
    let mut r = Registry::new();
    r.add_key("1.box", json!("a")).unwrap();
    assert!(r.add_key("box_1", json!("b")).unwrap_err().is_object());
}

#[test]
fn unknown_names_fail_lookup() {
    let r = Registry::new();
    let err = r.get("nope").unwrap_err();
    assert!(err.is_object());
    assert!(err.to_string().contains("cannot find object"));
    assert!(r.resolve("nope").unwrap_err().is_object());
}

#[test]
fn pending_entries_are_visible_until_built() {
    let mut r = Registry::new();
    r.add("t", json!("hello")).unwrap();
    assert!(matches!(r.get("t").unwrap(), Binding::Pending(_)));
    assert!(r.entity("t").unwrap_err().to_string().contains("before it is built"));
    r.build_all().unwrap();
    assert!(matches!(r.get("t").unwrap(), Binding::Built(_)));
}

#[test]
fn text_round_trip() {
    let r = built(json!({ "greeting": { "type": "text", "value": "hello" } }));
    let e = r.entity("greeting").unwrap();
    let e = e.borrow();
    assert_eq!(e.kind(), &EntityKind::Builtin(BuiltinKind::Text));
    assert_eq!(e.text(), Some("hello"));
    assert_eq!(e.name(), "greeting");
}

#[test]
fn strings_become_text_and_type_defaults_to_text() {
    let r = built(json!({ "a": "plain", "b": { "value": "implicit" } }));
    assert_eq!(r.entity("a").unwrap().borrow().text(), Some("plain"));
    assert_eq!(r.entity("b").unwrap().borrow().text(), Some("implicit"));
}

#[test]
fn composite_keys_are_normalized_and_keep_their_index() {
    let r = built(json!({ "2.box-big": "x", "title": "y" }));
    assert_eq!(r.names().collect::<Vec<_>>(), ["box_big_2", "title"]);
    assert_eq!(r.index_of("box_big_2"), Some(2));
    assert_eq!(r.index_of("title"), None);
    assert!(r.resolve("2.box-big").is_ok());
}

#[test]
fn differently_written_indices_name_different_objects() {
    let r = built(json!({ "1.box": "a", "01.box": "b" }));
    assert_eq!(r.names().collect::<Vec<_>>(), ["box_1", "box_01"]);
    assert_eq!(r.index_of("box_01"), Some(1));
    assert_eq!(r.resolve("01.box").unwrap().borrow().text(), Some("b"));
}

#[test]
fn groups_are_referential() {
    let r = built(json!({
        "a": { "type": "square" },
        "b": { "type": "square", "shift": [4, 0] },
        "pair": ["a", "b"]
    }));
    let pair = r.entity("pair").unwrap();
    assert_eq!(pair.borrow().members().len(), 2);
    assert_eq!(pair.borrow().center(), Point::new(2.0, 0.0));

    r.entity("a").unwrap().borrow_mut().shift(Vec2::new(-2.0, 0.0));
    assert_eq!(pair.borrow().width(), 8.0);
}

#[test]
fn groups_keep_repeated_members_once() {
    let r = built(json!({
        "a": { "type": "dot" },
        "twice": ["a", "a"]
    }));
    let twice = r.entity("twice").unwrap();
    assert_eq!(twice.borrow().members().len(), 1);

    twice.borrow_mut().shift(Vec2::new(3.0, 0.0));
    assert_eq!(r.entity("a").unwrap().borrow().center(), Point::new(3.0, 0.0));
}

#[test]
fn groups_must_reference_built_names() {
    let err = build_err(json!({ "pair": ["a"], "a": "x" }));
    assert!(err.is_object());
    assert!(err.to_string().contains("before it is built"));

    let err = build_err(json!({ "pair": ["ghost"] }));
    assert!(err.to_string().contains("cannot find object"));
}

#[test]
fn value_is_required_unless_the_kind_allows_it() {
    let err = build_err(json!({ "r": { "type": "rectangle" } }));
    assert!(err.is_object());
    assert!(err.to_string().contains("should have a value"));

    let r = built(json!({ "ax": { "type": "axes" }, "c": { "type": "circle" } }));
    assert_eq!(r.len(), 2);
}

#[test]
fn unsupported_attributes_are_rejected() {
    let err = build_err(json!({ "t": { "value": "x", "rotate": 90 } }));
    assert!(err.is_object());
    assert!(err.to_string().contains("unsupported attribute `rotate`"));
}

#[test]
fn unknown_type_wraps_as_creation_failure() {
    let err = build_err(json!({ "h": { "type": "hexagon", "value": 1 } }));
    assert!(err.to_string().contains("failed to create object `h`"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn expression_values_are_evaluated() {
    let r = built(json!({
        "c": { "type": "circle", "value": "=1 + 1" },
        "d": { "type": "dot", "value": "=UP * 3" }
    }));
    assert_eq!(r.entity("c").unwrap().borrow().width(), 4.0);
    assert_eq!(r.entity("d").unwrap().borrow().center(), Point::new(0.0, 3.0));
}

#[test]
fn failing_expressions_keep_their_cause() {
    let err = build_err(json!({ "c": { "type": "circle", "value": "=1 +" } }));
    assert!(err.is_object());
    assert!(err.to_string().contains("failed to create object `c`"));
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.starts_with("expr error"), "{cause}");
}

#[test]
fn bare_strings_in_values_stay_literal() {
    let r = built(json!({ "t": { "value": "1 + 1" } }));
    assert_eq!(r.entity("t").unwrap().borrow().text(), Some("1 + 1"));
}

#[test]
fn references_resolve_built_entities() {
    let r = built(json!({
        "anchor": { "type": "dot", "value": [2, 2] },
        "copy": { "type": "dot", "value": "@anchor" }
    }));
    assert_eq!(r.entity("copy").unwrap().borrow().center(), Point::new(2.0, 2.0));
    let anchor = r.entity("anchor").unwrap();
    assert_eq!(
        r.entity("copy").unwrap().borrow().value(),
        Some(&Value::Entity(anchor))
    );
}

#[test]
fn properties_are_evaluated_and_must_be_a_mapping() {
    let r = built(json!({
        "t": { "value": "x", "properties": { "color": "RED", "font_size": "=12 * 2" } }
    }));
    let t = r.entity("t").unwrap();
    assert_eq!(t.borrow().color(), Some("RED"));
    assert_eq!(t.borrow().property("font_size"), Some(&Value::Number(24.0)));

    let err = build_err(json!({ "t": { "value": "x", "properties": [1] } }));
    assert!(err.to_string().contains("must be a mapping"));
}

#[test]
fn qualified_kinds_see_the_registry() {
    let mut r = Registry::new();
    r.register_kind("shapes.Tile", ValueRule::Optional, sized).unwrap();
    r.register_document(&json!({
        "base": { "type": "square", "value": 3 },
        "tile": { "type": "shapes.Tile", "value": "=objects.base.width" },
        "plain": { "type": "shapes.Tile" }
    }))
    .unwrap();
    r.build_all().unwrap();
    assert_eq!(r.entity("tile").unwrap().borrow().width(), 3.0);
    assert_eq!(
        r.entity("tile").unwrap().borrow().kind(),
        &EntityKind::User("shapes.Tile".to_owned())
    );
    assert_eq!(r.entity("plain").unwrap().borrow().width(), 1.0);

    // Builtin kinds evaluate without registry access.
    let err = build_err(json!({
        "base": { "type": "square", "value": 3 },
        "c": { "type": "circle", "value": "=objects.base.width" }
    }));
    assert!(err.to_string().contains("failed to create object `c`"));
}

#[test]
fn updaters_move_entities_each_frame() {
    let r = built(json!({
        "target": { "type": "dot", "value": [3, 0] },
        "follower": { "type": "dot", "associate-updater": "=lerp(this.center, objects.target.center, 0.5)" },
        "drifter": { "type": "dot", "associate-updater": "this.center + RIGHT * dt" }
    }));
    r.run_updaters(2.0).unwrap();
    assert_eq!(r.entity("follower").unwrap().borrow().center(), Point::new(1.5, 0.0));
    assert_eq!(r.entity("drifter").unwrap().borrow().center(), Point::new(2.0, 0.0));
    r.run_updaters(2.0).unwrap();
    assert_eq!(r.entity("follower").unwrap().borrow().center(), Point::new(2.25, 0.0));
}

#[test]
fn failing_updaters_report_their_owner() {
    let r = built(json!({ "d": { "type": "dot", "associate-updater": "this.x" } }));
    let err = r.run_updaters(0.1).unwrap_err();
    assert!(err.is_object());
    assert!(err.to_string().contains("of `d` failed"));
}

#[test]
fn first_error_aborts_the_pass() {
    let mut r = Registry::new();
    r.register_document(&json!({ "ok": "x", "bad": { "type": "nope", "value": 1 }, "later": "y" }))
        .unwrap();
    assert!(r.build_all().is_err());
    assert!(matches!(r.get("ok").unwrap(), Binding::Built(_)));
    assert!(matches!(r.get("later").unwrap(), Binding::Pending(_)));
}
