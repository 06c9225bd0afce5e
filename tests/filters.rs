use std::collections::BTreeMap;

use stencil::{data, Engine, ErrorKind, Value};

fn render(engine: &Engine, source: &str, data: Value) -> String {
    engine.compile(source).unwrap().render_from(&data).unwrap()
}

#[test]
fn filter_custom_no_args() {
    let mut engine = Engine::new();
    engine.add_filter("shout", |s: String| format!("{}!", s.to_uppercase()));
    assert_eq!(render(&engine, "{{ x|shout }}", data! { x: "hi" }), "HI!");
}

#[test]
fn filter_custom_args() {
    let mut engine = Engine::new();
    engine.add_filter("repeat", |s: String, n: usize| s.repeat(n));
    assert_eq!(render(&engine, "{{ x|repeat:3 }}", data! { x: "ab" }), "ababab");
    assert_eq!(render(&engine, "{{ x|repeat(2) }}", data! { x: "ab" }), "abab");
}

#[test]
fn filter_custom_optional_args() {
    let mut engine = Engine::new();
    engine.add_filter("pad", |s: String, width: usize, fill: Option<String>| {
        let fill = fill.unwrap_or_else(|| String::from(" "));
        let missing = width.saturating_sub(s.chars().count());
        format!("{}{s}", fill.repeat(missing))
    });
    assert_eq!(render(&engine, "[{{ x|pad:4 }}]", data! { x: "ab" }), "[  ab]");
    assert_eq!(render(&engine, "[{{ x|pad:4:'0' }}]", data! { x: "ab" }), "[00ab]");
}

#[test]
fn filter_custom_result() {
    let mut engine = Engine::new();
    engine.add_filter("parse", |s: String| s.parse::<i64>().map_err(|e| e.to_string()));
    assert_eq!(render(&engine, "{{ x|parse }}", data! { x: "42" }), "42");

    let err = engine
        .compile("{{ x|parse }}")
        .unwrap()
        .render_from(&data! { x: "nope" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Filter);
    assert_eq!(
        err.message(),
        "error applying filter [parse] in [x|parse]: invalid digit found in string"
    );
}

#[test]
fn filter_custom_value_types() {
    let mut engine = Engine::new();
    engine.add_filter("count", |list: Vec<Value>| list.len());
    engine.add_filter("keys", |map: BTreeMap<String, Value>| {
        map.into_keys().collect::<Vec<_>>().join(",")
    });
    engine.add_filter("negate", |b: bool| !b);
    engine.add_filter("half", |f: f64| f / 2.0);
    let data = data! { xs: [1, 2], m: { a: 1, b: 2 }, t: true, n: 3 };
    assert_eq!(
        render(&engine, "{{ xs|count }} {{ m|keys }} {{ t|negate }} {{ n|half }}", data),
        "2 a,b false 1.5"
    );
}

#[test]
fn filter_chain() {
    let mut engine = Engine::new();
    engine.add_filter("append", |s: String, t: String| s + &t);
    assert_eq!(
        render(&engine, "{{ x|append:'b'|append:'c'|upper }}", data! { x: "a" }),
        "ABC"
    );
}

#[test]
fn filter_replaces_existing() {
    let mut engine = Engine::new();
    engine.add_filter("upper", |_: Value| "custom");
    assert_eq!(render(&engine, "{{ x|upper }}", data! { x: "a" }), "custom");
}

#[test]
fn filter_escape_and_spaceless() {
    let engine = Engine::new();
    assert_eq!(
        render(&engine, "{{ x|escape }}", data! { x: "<b>" }),
        "&lt;b&gt;"
    );
    assert_eq!(
        render(&engine, "{{ x|spaceless }}", data! { x: "<p> <b>y</b>\n</p>" }),
        "<p><b>y</b></p>"
    );
}

#[test]
fn filter_err_arity() {
    let mut engine = Engine::new();
    engine.add_filter("repeat", |s: String, n: usize| s.repeat(n));
    let err = engine
        .compile("{{ x|repeat }}")
        .unwrap()
        .render_from(&data! { x: "ab" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Filter);
    assert_eq!(
        err.message(),
        "error applying filter [repeat] in [x|repeat]: filter expected 1 arguments, found 0"
    );
}

#[test]
fn filter_err_value_type() {
    let mut engine = Engine::new();
    engine.add_filter("repeat", |s: String, n: usize| s.repeat(n));
    let err = engine
        .compile("{{ x|repeat:2 }}")
        .unwrap()
        .render_from(&data! { x: 1 })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Filter);
    assert_eq!(
        err.message(),
        "error applying filter [repeat] in [x|repeat:2]: filter expected string value, found integer"
    );
}

#[test]
fn filter_err_integer_range() {
    let mut engine = Engine::new();
    engine.add_filter("repeat", |s: String, n: u8| s.repeat(usize::from(n)));
    let err = engine
        .compile("{{ x|repeat:300 }}")
        .unwrap()
        .render_from(&data! { x: "a" })
        .unwrap_err();
    assert_eq!(
        err.message(),
        "error applying filter [repeat] in [x|repeat:300]: filter expected u8 argument, but 300 is out of range"
    );
}

#[cfg(feature = "builtins")]
mod builtins {
    use super::*;

    fn check(source: &str, data: Value, expected: &str) {
        assert_eq!(render(&Engine::new(), source, data), expected, "{source}");
    }

    #[test]
    fn filter_default() {
        check("{{ x|default:'n/a' }}", data! {}, "n/a");
        check("{{ x|default:'n/a' }}", data! { x: "" }, "n/a");
        check("{{ x|default:'n/a' }}", data! { x: "y" }, "y");
    }

    #[test]
    fn filter_first_last() {
        let data = data! { xs: [1, 2, 3], s: "abc", e: [] };
        check("{{ xs|first }}{{ xs|last }}", data.clone(), "13");
        check("{{ s|first }}{{ s|last }}", data.clone(), "ac");
        check("[{{ e|first }}]", data, "[]");
    }

    #[test]
    fn filter_len() {
        let data = data! { xs: [1, 2, 3], s: "héllo", m: { a: 1 } };
        check("{{ xs|len }} {{ s|len }} {{ m|len }} {{ missing|len }}", data, "3 5 1 0");
    }

    #[test]
    fn filter_case() {
        let data = data! { s: "hello wORLD" };
        check("{{ s|lower }}|{{ s|upper }}|{{ s|title }}", data, "hello world|HELLO WORLD|Hello World");
    }

    #[test]
    fn filter_join() {
        let data = data! { xs: ["a", 1, true] };
        check("{{ xs|join }}", data.clone(), "a1true");
        check("{{ xs|join:', ' }}", data, "a, 1, true");
    }

    #[test]
    fn filter_reversed() {
        let data = data! { xs: [1, 2, 3], s: "abc" };
        check("{{ xs|reversed|join }} {{ s|reversed }}", data, "321 cba");
    }

    #[test]
    fn filter_items() {
        let data = data! { m: { b: 2, a: 1 } };
        check("{{ m|items }}", data, "[['a', 1], ['b', 2]]");
    }

    #[test]
    fn filter_pluralize() {
        let source = "{{ n }} item{{ n|pluralize }}, {{ n }} berr{{ n|pluralize:'ies':'y' }}";
        check(source, data! { n: 1 }, "1 item, 1 berry");
        check(source, data! { n: 2 }, "2 items, 2 berries");
        check("{{ xs|pluralize }}", data! { xs: [1, 2] }, "s");
    }

    #[test]
    fn filter_truncate() {
        let data = data! { s: "lorem ipsum dolor sit amet" };
        check("{{ s|truncatechars:8 }}", data.clone(), "lorem...");
        check("{{ s|truncatechars:100 }}", data.clone(), "lorem ipsum dolor sit amet");
        check("{{ s|truncatewords:2 }}", data.clone(), "lorem ipsum ...");
        check("{{ s|truncatewords:2:'!' }}", data, "lorem ipsum!");
    }

    #[test]
    fn filter_startswith_endswith() {
        let data = data! { s: "lorem" };
        check("{{ s|startswith:'lo' }} {{ s|endswith:'lo' }}", data.clone(), "true false");
        check("{% if s|endswith:'em' %}yes{% endif %}", data, "yes");
    }

    #[test]
    fn filter_even_odd() {
        check(
            "{% for i in xs %}{{ i|even ?? 'e' :: 'o' }}{% endfor %}",
            data! { xs: [1, 2, 3, 4] },
            "oeoe",
        );
        check("{{ 3|odd }}", data! {}, "true");
    }

    #[test]
    fn filter_wrap() {
        check("{{ s|wrap:'b' }}", data! { s: "bold" }, "<b>bold</b>");
    }

    #[test]
    fn filter_random() {
        let result = render(&Engine::new(), "{{ xs|random }}", data! { xs: ["a", "b", "c"] });
        assert!(["a", "b", "c"].contains(&result.as_str()), "{result}");
    }

    #[test]
    fn filter_err_random_empty() {
        let err = Engine::new()
            .compile("{{ xs|random }}")
            .unwrap()
            .render_from(&data! { xs: [] })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Filter);
        assert_eq!(
            err.message(),
            "error applying filter [random] in [xs|random]: cannot choose from an empty sequence"
        );
    }

    #[test]
    fn filter_on_literal() {
        check("{{ 'lorem ipsum'|title }}", data! {}, "Lorem Ipsum");
        check("{{ [3, 1, 2]|reversed|join:'-' }}", data! {}, "2-1-3");
    }
}
