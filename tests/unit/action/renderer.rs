use super::*;
use crate::action::node::animate;
use crate::foundation::core::{Point, UP};
use crate::scene::kinds::BuiltinKind;
use crate::scene::object::{Properties, share};

fn dot(name: &str) -> EntityRef {
    let mut obj = BuiltinKind::Dot.construct(None, Properties::new()).unwrap();
    obj.set_name(name);
    share(obj)
}

#[test]
fn records_calls_in_order() {
    let d = dot("d");
    let mut r = RecordingRenderer::new();
    r.add(d.clone()).unwrap();
    r.wait(0.5).unwrap();
    r.play(animate(&d).shift(UP), &PlayConfig { run_time: Some(2.0) })
        .unwrap();

    assert_eq!(r.calls().len(), 3);
    assert_eq!(r.calls()[0], RenderCall::Add("d".to_owned()));
    assert_eq!(r.calls()[1], RenderCall::Wait(0.5));
    assert!(matches!(
        &r.calls()[2],
        RenderCall::Play { config, .. } if config.run_time == Some(2.0)
    ));
    // A plain recorder leaves the scene alone.
    assert_eq!(d.borrow().center(), Point::ORIGIN);

    assert_eq!(r.take_calls().len(), 3);
    assert!(r.calls().is_empty());
}

#[test]
fn finishing_recorder_applies_end_states() {
    let d = dot("d");
    let mut r = RecordingRenderer::finishing();
    r.play(animate(&d).shift(UP), &PlayConfig::default()).unwrap();
    assert_eq!(d.borrow().center(), Point::new(0.0, 1.0));
}

#[test]
fn calls_describe_themselves() {
    let d = dot("d");
    let play = RenderCall::Play {
        animation: animate(&d).shift(UP),
        config: PlayConfig { run_time: Some(1.0) },
    };
    let json = play.describe();
    assert_eq!(json["play"]["target"], "d");
    assert_eq!(json["config"]["run_time"], 1.0);
    assert_eq!(RenderCall::Wait(2.0).describe()["wait"], 2.0);
    assert_eq!(
        RenderCall::Play {
            animation: animate(&d).scale(2.0),
            config: PlayConfig::default(),
        }
        .describe()["config"],
        serde_json::json!({})
    );
}
