use super::*;

fn eval(src: &str) -> Value {
    evaluate(src, &Scope::new()).unwrap()
}

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(eval("=1 + 2 * 3"), Value::Number(7.0));
    assert_eq!(eval("(1 + 2) * 3"), Value::Number(9.0));
    assert_eq!(eval("-2 * 3 % 4"), Value::Number(-2.0));
}

#[test]
fn vectors_combine_with_scalars() {
    assert_eq!(eval("UP * 2 + RIGHT"), Value::Vector(Vec2::new(1.0, 2.0)));
    assert_eq!(eval("-UL"), Value::Vector(Vec2::new(1.0, -1.0)));
    assert_eq!(eval("vec(4, 2) / 2"), Value::Vector(Vec2::new(2.0, 1.0)));
}

#[test]
fn logic_short_circuits() {
    assert_eq!(eval("false && unknown_name"), Value::Bool(false));
    assert_eq!(eval("true || unknown_name"), Value::Bool(true));
    assert_eq!(eval("!(1 < 2)"), Value::Bool(false));
}

#[test]
fn builtins_cover_numbers_and_lists() {
    assert_eq!(eval("clamp(5, 0, 3)"), Value::Number(3.0));
    assert_eq!(eval("lerp(0, 10, 0.25)"), Value::Number(2.5));
    assert_eq!(eval("norm(vec(3, 4))"), Value::Number(5.0));
    assert_eq!(eval("len(range(2, 8, 2))"), Value::Number(3.0));
    assert_eq!(eval("len('abc')"), Value::Number(3.0));
    assert_eq!(
        eval("['a', 2]"),
        Value::List(vec![Value::Str("a".to_owned()), Value::Number(2.0)])
    );
}

#[test]
fn range_is_bounded() {
    let err = evaluate("range(0, 1e9)", &Scope::new()).unwrap_err();
    assert!(err.message.contains("more than"));
    assert!(evaluate("range(0, 1, 0)", &Scope::new()).is_err());
}

#[test]
fn clamp_rejects_unordered_or_nan_bounds() {
    for src in ["clamp(1, 3, 2)", "clamp(1, sqrt(-1), 2)", "clamp(2, 0, sqrt(-1))"] {
        let err = evaluate(src, &Scope::new()).unwrap_err();
        assert!(err.message.contains("lo <= hi"), "{src}: {err}");
    }
}

#[test]
fn unknown_names_do_not_resolve() {
    for src in ["HOME", "env.PATH", "system('ls')", "objects.title"] {
        assert!(evaluate(src, &Scope::new()).is_err(), "{src}");
    }
}

#[test]
fn this_and_dt_need_bindings() {
    assert!(evaluate("this.x", &Scope::new()).is_err());
    assert!(evaluate("dt", &Scope::new()).is_err());
    assert_eq!(
        evaluate("dt * 2", &Scope::new().with_dt(0.5)).unwrap(),
        Value::Number(1.0)
    );
}

#[test]
fn registry_lookups_read_entity_fields() {
    let registry = Registry::from_document_str(
        r#"{ "dot": { "type": "dot", "value": [1, 2] }, "label": "hi" }"#,
    )
    .unwrap();
    let scope = Scope::new().with_registry(&registry);

    assert_eq!(
        evaluate("objects.dot.center", &scope).unwrap(),
        Value::Vector(Vec2::new(1.0, 2.0))
    );
    assert_eq!(evaluate("objects.dot.y", &scope).unwrap(), Value::Number(2.0));
    assert_eq!(
        evaluate("center(find('dot')) + UP", &scope).unwrap(),
        Value::Vector(Vec2::new(1.0, 3.0))
    );
    let label = registry.entity("label").unwrap();
    assert_eq!(
        evaluate("find('label')", &scope).unwrap(),
        Value::Entity(label)
    );
    assert!(evaluate("objects.missing", &scope).is_err());
    assert!(evaluate("objects.dot.colour", &scope).is_err());
}

#[test]
fn this_reads_the_bound_entity() {
    let registry = Registry::from_document_str(r#"{ "c": { "type": "circle", "value": 2 } }"#)
        .unwrap();
    let c = registry.entity("c").unwrap();
    let scope = Scope::new().with_this(&c);
    assert_eq!(evaluate("this.width", &scope).unwrap(), Value::Number(4.0));
    assert_eq!(evaluate("this.scale", &scope).unwrap(), Value::Number(1.0));
}

#[test]
fn programs_are_reusable() {
    let p = Program::parse("=x_offset").unwrap();
    assert_eq!(p.source(), "=x_offset");
    assert!(p.eval(&Scope::new()).is_err());

    let p = Program::parse("TAU / 2").unwrap();
    let a = p.eval(&Scope::new()).unwrap();
    let b = p.eval(&Scope::new()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, Value::Number(PI));
}
