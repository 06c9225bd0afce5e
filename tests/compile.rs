use stencil::{Engine, ErrorKind};

#[test]
fn compile_empty() {
    Engine::new().compile("").unwrap();
}

#[test]
fn compile_raw() {
    Engine::new().compile("lorem ipsum dolor sit amet").unwrap();
}

#[test]
fn compile_comment() {
    Engine::new()
        .compile("lorem {# ipsum {{ dolor }} #} sit amet")
        .unwrap();
}

#[test]
fn compile_print_exprs() {
    let engine = Engine::new();
    for source in [
        "{{ ipsum.dolor }}",
        "{{ ipsum.123.dolor }}",
        "{{ ipsum|upper|lower }}",
        "{{ ipsum|truncatechars:10 }}",
        "{{ ipsum|truncatechars(10, '..') }}",
        "{{ ipsum or dolor or 'sit' }}",
        "{{ ipsum || dolor }}",
        "{{ ipsum ?? 'a' :: 'b' }}",
        "{{ f(1, 'two', [3]) }}",
        "{{ f:1:'two' }}",
        "{{ 'a|b' }}",
        "{{ [1, 2, 3] }}",
        "{{ {'a': 1} }}",
    ] {
        engine.compile(source).unwrap();
    }
}

#[test]
fn compile_conditions() {
    let engine = Engine::new();
    for test in [
        "x",
        "not x",
        "x == 1",
        "x != 'a'",
        "x < 1 and y > 2",
        "x <= 1 or y >= 2",
        "x in [1, 2] && y not in 'abc'",
        "not x in y || z",
        "defined('x.y')",
    ] {
        engine
            .compile(&format!("{{% if {test} %}}yes{{% endif %}}"))
            .unwrap();
    }
}

#[cfg(feature = "unicode")]
#[test]
fn compile_unicode_ident() {
    Engine::new().compile("{{ café.naïve }}").unwrap();
}

#[test]
fn compile_err_unclosed_tag() {
    let err = Engine::new()
        .compile("lorem {% if ipsum %} dolor")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Nesting);
    assert_eq!(err.message(), "expecting [endif]");
}

#[test]
fn compile_err_unexpected_end_tag() {
    let err = Engine::new().compile("lorem {% endfor %}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Nesting);
    assert_eq!(err.message(), "not expecting [endfor]");
}

#[test]
fn compile_err_mismatched_end_tag() {
    let err = Engine::new()
        .compile("{% for x in y %}{% if x %}{% endfor %}{% endif %}")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Nesting);
    assert_eq!(err.message(), "expecting [endif], found [endfor]");
}

#[test]
fn compile_err_unknown_tag() {
    let err = Engine::new().compile("{% lorem ipsum %}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTag);
    assert_eq!(err.message(), "[lorem] is not a recognised template tag");
}

#[test]
fn compile_err_unknown_filter() {
    let err = Engine::new().compile("{{ ipsum|nope }}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFilter);
    assert_eq!(err.message(), "[nope] is not a recognised filter");
}

#[test]
fn compile_err_malformed_for() {
    let err = Engine::new()
        .compile("{% for x of xs %}{% endfor %}")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "malformed [for] tag: [for x of xs]");
}

#[test]
fn compile_err_missing_argument() {
    let err = Engine::new().compile("{% if %}{% endif %}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "malformed [if] tag: [if]");
}

#[test]
fn compile_err_malformed_with() {
    let err = Engine::new()
        .compile("{% with x %}{% endwith %}")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "malformed [with] tag: [with x]");
}

#[test]
fn compile_err_unparsable_argument() {
    let err = Engine::new()
        .compile("{{ x|truncatechars:foo }}")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(
        err.message(),
        "unparsable argument: [foo] in [x|truncatechars:foo]"
    );
}

#[test]
fn compile_err_invalid_expression() {
    let err = Engine::new().compile("{{ x.-y }}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "invalid expression [x.-y]");
}

#[test]
fn compile_err_deeply_nested_literal() {
    let depth = 10_000;
    let source = format!("{{{{ {}1{} }}}}", "[".repeat(depth), "]".repeat(depth));
    let err = Engine::new().compile(&source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().starts_with("invalid expression [[[["));
}

#[test]
fn compile_err_literal_filter() {
    let err = Engine::new()
        .compile("{{ 'abc'|truncatechars:'x' }}")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Filter);
    assert_eq!(
        err.message(),
        "error applying filter [truncatechars] in ['abc'|truncatechars:'x']: \
         filter expected integer argument, found string"
    );
}

#[test]
fn compile_err_extends_requires_literal() {
    let err = Engine::new().compile("{% extends base %}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "malformed [extends] tag: [extends base]");
}

#[test]
fn compile_err_include_not_found() {
    let err = Engine::new()
        .compile("{% include 'missing' %}")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    assert_eq!(err.message(), "template not found: [missing]");
}

#[test]
fn compile_err_display() {
    let err = Engine::new().compile("lorem {{ ipsum|nope }}").unwrap_err();
    assert_eq!(
        err.to_string(),
        "[nope] is not a recognised filter between bytes 6 and 22"
    );
}

#[test]
fn compile_err_pretty() {
    let err = Engine::new().compile("lorem {{ ipsum|nope }}").unwrap_err();
    assert_eq!(
        format!("{err:#}"),
        "
   |
 1 | lorem {{ ipsum|nope }}
   |       ^^^^^^^^^^^^^^^^ [nope] is not a recognised filter
"
    );
}

#[test]
fn compile_err_pretty_named() {
    let mut engine = Engine::new();
    let err = engine
        .add_template("page", "lorem\n{% if ipsum %}")
        .unwrap_err();
    assert_eq!(err.template_name(), Some("page"));
    assert_eq!(
        format!("{err:#}"),
        "
  --> page:2:1
   |
 2 | {% if ipsum %}
   | ^^^^^^^^^^^^^^ expecting [endif]
"
    );
}
