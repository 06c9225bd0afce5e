use stencil::{data, Engine, ErrorKind};

fn engine() -> Engine {
    let mut engine = Engine::new();
    engine
        .add_template(
            "base",
            "<title>{% block title %}Site{% endblock %}</title>\
             <main>{% block main %}{% endblock %}</main>",
        )
        .unwrap();
    engine
}

#[test]
fn extends_overrides_blocks() {
    let mut engine = engine();
    engine
        .add_template(
            "page",
            "{% extends 'base' %}{% block main %}Hello {{ name }}{% endblock %}",
        )
        .unwrap();
    let result = engine
        .get_template("page")
        .unwrap()
        .render_from(&data! { name: "World" })
        .unwrap();
    assert_eq!(result, "<title>Site</title><main>Hello World</main>");
}

#[test]
fn extends_super() {
    let mut engine = engine();
    engine
        .add_template(
            "page",
            "{% extends 'base' %}{% block title %}Page | {{ super() }}{% endblock %}",
        )
        .unwrap();
    let result = engine
        .get_template("page")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "<title>Page | Site</title><main></main>");
}

#[test]
fn extends_super_without_call() {
    let mut engine = engine();
    engine
        .add_template(
            "page",
            "{% extends 'base' %}{% block title %}{{ super }}!{% endblock %}",
        )
        .unwrap();
    let result = engine
        .get_template("page")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "<title>Site!</title><main></main>");
}

#[test]
fn extends_multiple_levels() {
    let mut engine = Engine::new();
    engine
        .add_template("a", "[{% block x %}A{% endblock %}]")
        .unwrap();
    engine
        .add_template("b", "{% extends 'a' %}{% block x %}B{{ super() }}{% endblock %}")
        .unwrap();
    engine
        .add_template("c", "{% extends 'b' %}{% block x %}C{{ super() }}{% endblock %}")
        .unwrap();
    let result = engine
        .get_template("c")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "[CBA]");
}

#[test]
fn extends_super_walks_up_the_chain() {
    let mut engine = Engine::new();
    engine
        .add_template("a", "[{% block x %}A{% endblock %}]")
        .unwrap();
    engine
        .add_template("b", "{% extends 'a' %}{% block x %}B{% endblock %}")
        .unwrap();
    engine
        .add_template(
            "c",
            "{% extends 'b' %}{% block x %}{{ super() }}|{{ super() }}{% endblock %}",
        )
        .unwrap();
    let result = engine
        .get_template("c")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "[B|A]");
}

#[test]
fn extends_skipped_level() {
    let mut engine = Engine::new();
    engine
        .add_template("a", "[{% block x %}A{% endblock %}|{% block y %}Y{% endblock %}]")
        .unwrap();
    engine
        .add_template("b", "{% extends 'a' %}{% block y %}Z{% endblock %}")
        .unwrap();
    engine
        .add_template("c", "{% extends 'b' %}{% block x %}C{% endblock %}")
        .unwrap();
    let result = engine
        .get_template("c")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "[C|Z]");
}

#[test]
fn extends_candidate_names() {
    let mut engine = engine();
    engine
        .add_template(
            "page",
            "{% extends ['missing', 'base'] %}{% block main %}M{% endblock %}",
        )
        .unwrap();
    let result = engine
        .get_template("page")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "<title>Site</title><main>M</main>");
}

#[test]
fn block_without_parent() {
    let result = Engine::new()
        .compile("{% block x %}{{ super() }}X{% endblock %}")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "X");
}

#[test]
fn block_in_loop() {
    let result = Engine::new()
        .compile("{% for i in xs %}{% block x %}{{ i }}{% endblock %}{% endfor %}")
        .unwrap()
        .render_from(&data! { xs: [1, 2, 3] })
        .unwrap();
    assert_eq!(result, "123");
}

#[test]
fn include_static() {
    let mut engine = Engine::new();
    engine.add_template("nav", "<nav>{{ user }}</nav>").unwrap();
    engine
        .add_template("page", "{% include 'nav' %}<p>{{ user }}</p>")
        .unwrap();
    let result = engine
        .get_template("page")
        .unwrap()
        .render_from(&data! { user: "john" })
        .unwrap();
    assert_eq!(result, "<nav>john</nav><p>john</p>");
}

#[test]
fn include_sees_local_scope() {
    let mut engine = Engine::new();
    engine.add_template("item", "<li>{{ x }}</li>").unwrap();
    let result = engine
        .compile("{% for x in xs %}{% include 'item' %}{% endfor %}")
        .unwrap()
        .render_from(&data! { xs: [1, 2] })
        .unwrap();
    assert_eq!(result, "<li>1</li><li>2</li>");
}

#[test]
fn include_dynamic() {
    let mut engine = Engine::new();
    engine.add_template("a", "A{{ x }}").unwrap();
    engine.add_template("b", "B{{ x }}").unwrap();
    let template = engine.compile("{% include name %}").unwrap();
    assert_eq!(template.render_from(&data! { name: "a", x: 1 }).unwrap(), "A1");
    assert_eq!(template.render_from(&data! { name: "b", x: 2 }).unwrap(), "B2");
    assert_eq!(
        template
            .render_from(&data! { name: ["missing", "b"], x: 3 })
            .unwrap(),
        "B3"
    );
}

#[test]
fn include_err_dynamic_not_found() {
    let err = Engine::new()
        .compile("{% include name %}")
        .unwrap()
        .render_from(&data! { name: "missing" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    assert_eq!(err.message(), "template not found: [missing]");
}

#[test]
fn super_failing_in_condition_restores_scope() {
    let mut engine = Engine::new();
    engine
        .add_template(
            "base",
            "{% block a %}{% for x in [1] %}{% for p, q in [1] %}{% endfor %}{% endfor %}{% endblock %}",
        )
        .unwrap();
    engine
        .add_template(
            "page",
            "{% extends 'base' %}{% block a %}{% if super() %}yes{% endif %}[{{ x }}]{% endblock %}",
        )
        .unwrap();
    let result = engine
        .get_template("page")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "[]");
}

#[test]
fn include_err_dynamic_not_a_name() {
    let err = Engine::new()
        .compile("{% include name %}")
        .unwrap()
        .render_from(&data! { name: 1 })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(err.message(), "include expected a template name, found integer");
}

#[test]
fn include_err_max_depth() {
    let mut engine = Engine::new();
    engine.set_max_include_depth(4);
    engine.add_template("loop", "x{% include name %}").unwrap();
    let err = engine
        .get_template("loop")
        .unwrap()
        .render_from(&data! { name: "loop" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(err.message(), "reached maximum include depth (4)");
    assert_eq!(err.template_name(), Some("loop"));
}
