#![cfg(feature = "serde")]

use std::collections::BTreeMap;

use serde::Serialize;

use stencil::{data, to_value, ErrorKind, Value};

#[test]
fn to_value_scalars() {
    assert_eq!(to_value(true).unwrap(), Value::Bool(true));
    assert_eq!(to_value(7_u8).unwrap(), Value::Integer(7));
    assert_eq!(to_value(1.5_f32).unwrap(), Value::Float(1.5));
    assert_eq!(to_value('a').unwrap(), Value::from("a"));
    assert_eq!(to_value("lorem").unwrap(), Value::from("lorem"));
    assert_eq!(to_value(()).unwrap(), Value::None);
}

#[test]
fn to_value_option() {
    assert_eq!(to_value(None::<i32>).unwrap(), Value::None);
    assert_eq!(to_value(Some("lorem")).unwrap(), Value::from("lorem"));
}

#[test]
fn to_value_u64_out_of_range() {
    let err = to_value(u64::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
    assert_eq!(err.message(), "out of range integral type conversion attempted");
}

#[test]
fn to_value_struct() {
    #[derive(Serialize)]
    struct User {
        name: &'static str,
        age: u32,
        tags: Vec<&'static str>,
        nickname: Option<String>,
    }
    let user = User {
        name: "John Smith",
        age: 42,
        tags: vec!["a", "b"],
        nickname: None,
    };
    assert_eq!(
        to_value(user).unwrap(),
        data! { name: "John Smith", age: 42, tags: ["a", "b"], nickname: None }
    );
}

#[test]
fn to_value_enum() {
    #[derive(Serialize)]
    enum E {
        Unit,
        Newtype(i32),
        Tuple(i32, i32),
        Struct { a: i32 },
    }
    assert_eq!(to_value(E::Unit).unwrap(), Value::from("Unit"));
    assert_eq!(to_value(E::Newtype(1)).unwrap(), data! { Newtype: 1 });
    assert_eq!(to_value(E::Tuple(1, 2)).unwrap(), data! { Tuple: [1, 2] });
    assert_eq!(to_value(E::Struct { a: 1 }).unwrap(), data! { Struct: { a: 1 } });
}

#[test]
fn to_value_map_keys() {
    let map = BTreeMap::from([(1, "one"), (2, "two")]);
    let expected = Value::from(BTreeMap::from([("1", "one"), ("2", "two")]));
    assert_eq!(to_value(map).unwrap(), expected);
}

#[test]
fn to_value_map_key_err() {
    let map = BTreeMap::from([(vec![1], "one")]);
    let err = to_value(map).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
    assert_eq!(err.message(), "map key must be a string");
}
