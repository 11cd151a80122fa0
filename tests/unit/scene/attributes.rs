use serde_json::json;

use super::*;
use crate::foundation::core::Point;

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

#[test]
fn keys_map_to_directives() {
    for key in ["shift", "color", "scale", "move-to", "associate-updater"] {
        let d = AttributeDirective::from_key(key).unwrap();
        assert_eq!(d.key(), key);
    }
    assert_eq!(AttributeDirective::from_key("move_to"), None);
    assert_eq!(AttributeDirective::from_key("value"), None);
}

#[test]
fn shift_accepts_literals_and_expressions() {
    let r = built(json!({
        "a": { "type": "dot", "shift": [1, 2] },
        "b": { "type": "dot", "shift": "UP * 2 + LEFT" },
        "c": { "type": "dot", "shift": "=DR" }
    }));
    assert_eq!(r.entity("a").unwrap().borrow().center(), Point::new(1.0, 2.0));
    assert_eq!(r.entity("b").unwrap().borrow().center(), Point::new(-1.0, 2.0));
    assert_eq!(r.entity("c").unwrap().borrow().center(), Point::new(1.0, -1.0));
}

#[test]
fn shift_substitutes_the_owner_index() {
    let r = built(json!({
        "0.slot": { "type": "square", "shift": "RIGHT * {index} * 2" },
        "1.slot": { "type": "square", "shift": "RIGHT * {index} * 2" },
        "2.slot": { "type": "square", "shift": "RIGHT * {index} * 2" }
    }));
    for i in 0..3 {
        let e = r.entity(&format!("slot_{i}")).unwrap();
        assert_eq!(e.borrow().center(), Point::new(2.0 * i as f64, 0.0));
    }
}

#[test]
fn index_placeholder_needs_an_index() {
    let err = build_err(json!({ "slot": { "type": "square", "shift": "RIGHT * {index}" } }));
    assert!(err.is_object());
    assert!(err.to_string().contains("has no index"));
}

#[test]
fn shift_rejects_non_vectors() {
    let err = build_err(json!({ "d": { "type": "dot", "shift": "1 + 1" } }));
    assert!(err.is_object());
    assert!(err.to_string().contains("`shift` on `d`"));
}

#[test]
fn color_is_literal() {
    let r = built(json!({ "t": { "value": "x", "color": "=not an expression" } }));
    assert_eq!(r.entity("t").unwrap().borrow().color(), Some("=not an expression"));
    assert!(build_err(json!({ "t": { "value": "x", "color": 3 } })).is_object());
}

#[test]
fn inverse_scales_cancel() {
    let r = built(json!({ "s": { "type": "square", "scale": 2 } }));
    let s = r.entity("s").unwrap();
    assert_eq!(s.borrow().width(), 4.0);

    AttributeDirective::Scale
        .apply(
            &r,
            &s,
            &json!(0.5),
            &Owner {
                name: "s".to_owned(),
                index: None,
            },
        )
        .unwrap();
    assert_eq!(s.borrow().width(), 2.0);
    assert_eq!(s.borrow().scale_factor(), 1.0);
}

#[test]
fn scale_evaluates_strings() {
    let r = built(json!({ "s": { "type": "square", "scale": "max(1.5, 0.5) * 2" } }));
    assert_eq!(r.entity("s").unwrap().borrow().width(), 6.0);

    let err = build_err(json!({ "s": { "type": "square", "scale": "UP" } }));
    assert!(err.to_string().contains("`scale` on `s`"));
    assert!(build_err(json!({ "s": { "type": "square", "scale": [2] } })).is_object());
}

#[test]
fn directive_expressions_see_the_entity() {
    let r = built(json!({
        "s": { "type": "square", "scale": 2, "shift": "RIGHT * this.width" },
        "t": { "type": "square", "scale": "3 / this.width" }
    }));
    assert_eq!(r.entity("s").unwrap().borrow().center(), Point::new(4.0, 0.0));
    assert_eq!(r.entity("t").unwrap().borrow().width(), 3.0);

    let err = build_err(json!({ "u": { "type": "dot", "shift": "objects.s.center" } }));
    assert!(err.is_object());
}

#[test]
fn move_to_uses_the_named_center() {
    let r = built(json!({
        "anchor": { "type": "dot", "value": [3, -1] },
        "2.label": { "value": "hi", "move-to": "anchor" },
        "badge": { "type": "circle", "move-to": "2.label" }
    }));
    assert_eq!(r.entity("label_2").unwrap().borrow().center(), Point::new(3.0, -1.0));
    assert_eq!(r.entity("badge").unwrap().borrow().center(), Point::new(3.0, -1.0));

    let err = build_err(json!({ "t": { "value": "x", "move-to": "ghost" } }));
    assert!(err.to_string().contains("cannot find object `ghost`"));
}

#[test]
fn directives_apply_in_document_order() {
    let r = built(json!({
        "anchor": { "type": "dot", "value": [2, 2] },
        "a": { "type": "dot", "shift": [1, 0], "move-to": "anchor" },
        "b": { "type": "dot", "move-to": "anchor", "shift": [1, 0] }
    }));
    assert_eq!(r.entity("a").unwrap().borrow().center(), Point::new(2.0, 2.0));
    assert_eq!(r.entity("b").unwrap().borrow().center(), Point::new(3.0, 2.0));
}

#[test]
fn updaters_are_parsed_once() {
    let r = built(json!({ "d": { "type": "dot", "associate-updater": "this.center + UP" } }));
    let d = r.entity("d").unwrap();
    assert_eq!(d.borrow().updaters().len(), 1);

    let err = build_err(json!({ "d": { "type": "dot", "associate-updater": "this.center +" } }));
    assert!(err.to_string().contains("does not parse"));
    assert!(build_err(json!({ "d": { "type": "dot", "associate-updater": 1 } })).is_object());
}
