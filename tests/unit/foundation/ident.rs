use super::*;

#[test]
fn plain_names_pass_through() {
    assert_eq!(normalize("title").unwrap(), "title");
}

#[test]
fn qualifiers_join_with_underscores() {
    assert_eq!(normalize("title-sub-main").unwrap(), "title_sub_main");
}

#[test]
fn index_is_appended() {
    for (n, base, q1, q2) in [(0, "box", "red", "big"), (7, "label", "x", "y"), (42, "a", "b", "c")]
    {
        let key = format!("{n}.{base}-{q1}-{q2}");
        assert_eq!(normalize(&key).unwrap(), format!("{base}_{q1}_{q2}_{n}"));
    }
}

#[test]
fn parse_exposes_index() {
    let id = Identifier::parse("3.dot").unwrap();
    assert_eq!(id.base, "dot");
    assert_eq!(id.index, Some(3));
    assert_eq!(id.canonical(), "dot_3");
}

#[test]
fn index_text_is_kept_as_written() {
    assert_eq!(normalize("01.box").unwrap(), "box_01");
    assert_eq!(normalize("+1.box").unwrap(), "box_+1");
    assert_eq!(normalize("-2.box").unwrap(), "box_-2");

    let id = Identifier::parse("007.agent").unwrap();
    assert_eq!(id.index, Some(7));
    assert_eq!(id.index_text.as_deref(), Some("007"));
}

#[test]
fn more_than_one_dot_is_rejected() {
    for key in ["1.2.box", "a.b.c", "..", "1.box.x-y"] {
        let err = normalize(key).unwrap_err();
        assert!(err.is_load(), "{key}: {err}");
        assert!(err.to_string().contains("invalid dot usage"));
    }
}

#[test]
fn non_integer_index_is_rejected() {
    let err = normalize("one.box").unwrap_err();
    assert!(err.is_load());
    assert!(err.to_string().contains("invalid index format"));
}
