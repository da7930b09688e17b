#![no_main]
use ir::SymbolResolver;
use libfuzzer_sys::fuzz_target;
use parsers::languages::java::parse_java;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(parsed) = parse_java(s, "/fuzz/Fuzz.java") {
            let resolver = parsed.resolve(&[]);
            assert_eq!(resolver.line_count(), parsed.line_count);
        }
    }
});
