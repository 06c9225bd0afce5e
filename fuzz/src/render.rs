#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, Vec<(&str, &str)>, BTreeMap<String, Value>)| {
    let (root, partials, value) = data;
    let mut engine = stencil::Engine::new();
    engine.set_max_include_depth(8);
    engine.set_loader(stencil::DictLoader::new(partials));
    let Ok(template) = engine.compile(root) else {
        return;
    };
    let _ = template.render(&value);
});
