use serde_json::json;

use super::*;
use crate::action::table::Tag;

#[test]
fn dispatch_needs_a_known_action() {
    let raw = json!({ "target": "x" });
    let err = Descriptor::dispatch(&raw).unwrap_err();
    assert!(err.is_execution());
    assert!(err.to_string().contains("an action must be specified"));

    let raw = json!({ "action": "explode" });
    let err = Descriptor::dispatch(&raw).unwrap_err();
    assert!(err.to_string().contains("action `explode` is unsupported"));

    assert!(Descriptor::dispatch(&json!(["write"])).is_err());
    assert!(Descriptor::dispatch(&json!({ "action": 3 })).is_err());

    let raw = json!({ "action": "select" });
    assert_eq!(Descriptor::dispatch(&raw).unwrap().spec.tag, Tag::Selection);
}

#[test]
fn config_keys_are_allowlisted() {
    let raw = json!({ "action": "write", "target": "t", "duration": 2, "speed": 3 });
    let d = Descriptor::dispatch(&raw).unwrap();
    let err = d.check_config(&["action", "target"]).unwrap_err();
    assert!(err.to_string().contains("config `speed` is invalid"));

    let raw = json!({ "action": "add", "target": "t", "duration": 2 });
    let d = Descriptor::dispatch(&raw).unwrap();
    assert!(d.check_config(&["action", "target"]).is_ok());
    assert!(d.check_keys(&["action", "target"], false).is_err());
}

#[test]
fn duration_becomes_run_time() {
    let raw = json!({ "action": "write", "duration": 1.5 });
    assert_eq!(Descriptor::dispatch(&raw).unwrap().run_time().unwrap(), Some(1.5));

    let raw = json!({ "action": "write" });
    assert_eq!(Descriptor::dispatch(&raw).unwrap().run_time().unwrap(), None);

    for bad in [json!(-1), json!("fast")] {
        let raw = json!({ "action": "write", "duration": bad });
        assert!(Descriptor::dispatch(&raw).unwrap().run_time().is_err());
    }
}

#[test]
fn params_and_properties_have_fixed_shapes() {
    let raw = json!({ "action": "write", "params": 1, "properties": [] });
    let d = Descriptor::dispatch(&raw).unwrap();
    assert!(d.params().is_err());
    assert!(d.properties().is_err());

    let raw = json!({ "action": "write", "params": [1, 2], "properties": { "k": 1 } });
    let d = Descriptor::dispatch(&raw).unwrap();
    assert_eq!(d.params().unwrap().map(<[_]>::len), Some(2));
    assert_eq!(d.properties().unwrap().map(|m| m.len()), Some(1));
}

#[test]
fn target_must_be_a_string() {
    let raw = json!({ "action": "write", "target": ["a"] });
    assert!(Descriptor::dispatch(&raw).unwrap().target().is_err());
    let raw = json!({ "action": "write" });
    let err = Descriptor::dispatch(&raw).unwrap().target().unwrap_err();
    assert!(err.to_string().contains("an action target must be specified"));
}
