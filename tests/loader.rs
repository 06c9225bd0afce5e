use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use stencil::{data, DictLoader, Engine, ErrorKind, FileLoader, FileReloader, Program};

#[test]
fn dict_loader() {
    let mut engine = Engine::new();
    engine.set_loader(DictLoader::new([
        ("base", "<h1>{% block title %}{% endblock %}</h1>{% include 'footer' %}"),
        ("footer", "<footer>{{ year }}</footer>"),
        ("page", "{% extends 'base' %}{% block title %}Hi{% endblock %}"),
    ]));
    let result = engine
        .get_template("page")
        .unwrap()
        .render_from(&data! { year: 2024 })
        .unwrap();
    assert_eq!(result, "<h1>Hi</h1><footer>2024</footer>");
}

#[test]
fn dict_loader_caches() {
    let mut engine = Engine::new();
    engine.set_loader(DictLoader::new([("a", "A")]));
    let first = engine.get_template("a").unwrap();
    let second = engine.get_template("a").unwrap();
    assert!(Arc::ptr_eq(first.program(), second.program()));
}

#[test]
fn dict_loader_candidates() {
    let mut engine = Engine::new();
    engine.set_loader(DictLoader::new([("b", "B")]));
    let template = engine.load(&["a", "b"]).unwrap();
    assert_eq!(template.source(), "B");
    assert_eq!(template.program().name(), Some("b"));
}

#[test]
fn dict_loader_not_found() {
    let mut engine = Engine::new();
    engine.set_loader(DictLoader::new([("a", "A")]));
    let err = engine.load(&["x", "y"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    assert_eq!(err.message(), "template not found: [x, y]");
}

#[test]
fn dict_loader_compile_error_is_named() {
    let mut engine = Engine::new();
    engine.set_loader(DictLoader::new([("bad", "{% if x %}")]));
    let err = engine.get_template("bad").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Nesting);
    assert_eq!(err.template_name(), Some("bad"));
}

#[test]
fn dict_loader_recursive_extends() {
    let mut engine = Engine::new();
    engine.set_max_include_depth(8);
    engine.set_loader(DictLoader::new([
        ("a", "{% extends 'b' %}"),
        ("b", "{% extends 'a' %}"),
    ]));
    let err = engine.get_template("a").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
    assert_eq!(err.message(), "reached maximum include depth (8)");
}

#[test]
fn dict_loader_self_extends() {
    let mut engine = Engine::new();
    engine.set_max_include_depth(8);
    engine.set_loader(DictLoader::new([("a", "{% extends 'a' %}")]));
    let err = engine.get_template("a").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
}

#[test]
fn closure_loader() {
    let mut engine = Engine::new();
    engine.set_loader(|engine: &Engine, names: &[&str]| -> stencil::Result<Arc<Program>> {
        let name = names[0];
        engine.named_program(name, &format!("<{name}>"))
    });
    let result = engine
        .get_template("x")
        .unwrap()
        .render_from(&data! {})
        .unwrap();
    assert_eq!(result, "<x>");
}

#[test]
fn file_loader() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("partials")).unwrap();
    fs::write(dir.path().join("partials/nav.html"), "<nav>{{ user }}</nav>").unwrap();
    fs::write(
        dir.path().join("page.html"),
        "{% include 'partials/nav.html' %}<p>{{ user }}</p>",
    )
    .unwrap();

    let mut engine = Engine::new();
    engine.set_loader(FileLoader::new(dir.path()));
    let result = engine
        .get_template("page.html")
        .unwrap()
        .render_from(&data! { user: "john" })
        .unwrap();
    assert_eq!(result, "<nav>john</nav><p>john</p>");
}

#[test]
fn file_loader_caches_forever() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.html");
    fs::write(&path, "one").unwrap();

    let mut engine = Engine::new();
    engine.set_loader(FileLoader::new(dir.path()));
    assert_eq!(engine.get_template("a.html").unwrap().source(), "one");
    fs::write(&path, "two").unwrap();
    assert_eq!(engine.get_template("a.html").unwrap().source(), "one");
}

#[test]
fn file_loader_not_found() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("dir.html")).unwrap();

    let mut engine = Engine::new();
    engine.set_loader(FileLoader::new(dir.path()));
    let err = engine.get_template("dir.html").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
}

#[test]
fn file_loader_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.html"), [0xff, 0xfe, 0xfd]).unwrap();

    let mut engine = Engine::new();
    engine.set_loader(FileLoader::new(dir.path()));
    let err = engine.get_template("bad.html").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
    assert!(
        err.message().starts_with("error loading template file ["),
        "{}",
        err.message()
    );
}

#[test]
fn file_reloader_picks_up_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.html");
    fs::write(&path, "one").unwrap();

    let mut engine = Engine::new();
    engine.set_loader(FileReloader::new(dir.path()));
    assert_eq!(engine.get_template("a.html").unwrap().source(), "one");
    let cached = engine.get_template("a.html").unwrap();

    fs::write(&path, "two").unwrap();
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();

    let reloaded = engine.get_template("a.html").unwrap();
    assert_eq!(reloaded.source(), "two");
    assert!(!Arc::ptr_eq(cached.program(), reloaded.program()));
}

#[test]
fn no_loader_uses_added_templates() {
    let mut engine = Engine::new();
    engine.add_template("a", "A").unwrap();
    assert_eq!(engine.load(&["missing", "a"]).unwrap().source(), "A");
    assert_eq!(
        engine.get_template("missing").unwrap_err().kind(),
        ErrorKind::TemplateNotFound
    );
}
