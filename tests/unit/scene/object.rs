use super::*;

fn square(side: f64) -> EntityRef {
    share(SceneObject::new(
        EntityKind::Builtin(BuiltinKind::Square),
        Some(Value::Number(side)),
        Properties::new(),
        Size::new(side, side),
    ))
}

#[test]
fn leaf_geometry_follows_position_and_scale() {
    let s = square(2.0);
    s.borrow_mut().shift(Vec2::new(1.0, -1.0));
    s.borrow_mut().scale(1.5);

    let s = s.borrow();
    assert_eq!(s.center(), Point::new(1.0, -1.0));
    assert_eq!(s.width(), 3.0);
    assert_eq!(s.scale_factor(), 1.5);
}

#[test]
fn inverse_scales_restore_the_size() {
    let s = square(2.0);
    s.borrow_mut().scale(2.0);
    s.borrow_mut().scale(0.5);
    assert_eq!(s.borrow().width(), 2.0);
    assert_eq!(s.borrow().scale_factor(), 1.0);
}

#[test]
fn groups_reference_their_members() {
    let a = square(2.0);
    let b = square(2.0);
    b.borrow_mut().shift(Vec2::new(4.0, 0.0));
    let group = share(SceneObject::group(vec![a.clone(), b.clone()]));

    assert_eq!(group.borrow().center(), Point::new(2.0, 0.0));
    assert_eq!(group.borrow().width(), 6.0);

    // Moving a member later is visible through the group.
    a.borrow_mut().shift(Vec2::new(-2.0, 0.0));
    assert_eq!(group.borrow().width(), 8.0);

    group.borrow_mut().shift(Vec2::new(0.0, 1.0));
    assert_eq!(a.borrow().center(), Point::new(-2.0, 1.0));
    assert_eq!(b.borrow().center(), Point::new(4.0, 1.0));
}

#[test]
fn group_scale_is_about_the_group_center() {
    let a = square(2.0);
    let b = square(2.0);
    b.borrow_mut().shift(Vec2::new(4.0, 0.0));
    let group = share(SceneObject::group(vec![a.clone(), b.clone()]));

    group.borrow_mut().scale(2.0);
    assert_eq!(group.borrow().center(), Point::new(2.0, 0.0));
    assert_eq!(a.borrow().center(), Point::new(-2.0, 0.0));
    assert_eq!(b.borrow().width(), 4.0);
}

#[test]
fn empty_group_has_empty_bounds() {
    let g = SceneObject::group(Vec::new());
    assert_eq!(g.center(), Point::ORIGIN);
    assert_eq!(g.width(), 0.0);
}

#[test]
fn color_reaches_members_and_reads_back() {
    let a = square(1.0);
    let mut props = Properties::new();
    props.insert("color".to_owned(), Value::Str("RED".to_owned()));
    let tinted = SceneObject::new(EntityKind::Builtin(BuiltinKind::Circle), None, props, Size::new(2.0, 2.0));
    assert_eq!(tinted.color(), Some("RED"));

    let mut g = SceneObject::group(vec![a.clone()]);
    g.set_color("BLUE");
    assert_eq!(g.color(), Some("BLUE"));
    assert_eq!(a.borrow().color(), Some("BLUE"));
}

#[test]
fn move_to_centers_on_a_point() {
    let s = square(2.0);
    s.borrow_mut().move_to(Point::new(3.0, 4.0));
    assert_eq!(s.borrow().center(), Point::new(3.0, 4.0));
}

#[test]
fn updaters_accumulate() {
    let s = square(1.0);
    s.borrow_mut().add_updater(Updater::new(Program::parse("this.center + RIGHT").unwrap()));
    s.borrow_mut().add_updater(Updater::new(Program::parse("ORIGIN").unwrap()));
    let s = s.borrow();
    assert_eq!(s.updaters().len(), 2);
    assert_eq!(s.updaters()[0].program().source(), "this.center + RIGHT");
}

#[test]
fn kind_names_are_document_names() {
    assert_eq!(EntityKind::Builtin(BuiltinKind::NumberPlane).name(), "NumberPlane");
    assert_eq!(EntityKind::User("shapes.Badge".to_owned()).name(), "shapes.Badge");
}
