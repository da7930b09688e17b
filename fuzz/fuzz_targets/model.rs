#![no_main]
use libfuzzer_sys::fuzz_target;
use parsers::languages::java::parse_java;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(parsed) = parse_java(s, "/fuzz/Fuzz.java") else {
        return;
    };
    let resolver = parsed.resolve(&[]);
    let model = builder::build_model(&parsed.tree, &resolver, "/fuzz/Fuzz.java");
    for (id, _) in model.types() {
        for method in model.methods_of(id) {
            assert!(method.is_balanced());
        }
    }
    let _ = writer::render(&mut std::io::sink(), &model);
});
