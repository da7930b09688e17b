/// Escapes angle brackets only. Used for class and operation names, where
/// generic arguments and `<init>` are the only markup-looking text.
pub fn escape_name(s: &str) -> String {
    s.replace('>', "&gt;").replace('<', "&lt;")
}

/// Full entity escaping for free text in the statement stream.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '>' => out.push_str("&gt;"),
            '<' => out.push_str("&lt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
