//! Quoting of strings and characters for display.

/// Appends `c`, escaped for a literal delimited by `quote`.
///
/// Control characters become a backslash followed by their octal code.
fn push_escaped(out: &mut String, c: char, quote: char) {
    if c < ' ' || c == '\u{7f}' {
        out.push_str(&format!("\\{:o}", u32::from(c)));
    } else if c == '\\' || c == quote {
        out.push('\\');
        out.push(c);
    } else {
        out.push(c);
    }
}

/// Quotes a string as a double-quoted literal.
#[must_use]
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(2 + ((5 * s.len()) >> 2));
    out.push('"');
    for c in s.chars() {
        push_escaped(&mut out, c, '"');
    }
    out.push('"');
    out
}

/// Quotes a character as a single-quoted literal.
#[must_use]
pub fn quote_char(c: char) -> String {
    let mut out = String::with_capacity(8);
    out.push('\'');
    push_escaped(&mut out, c, '\'');
    out.push('\'');
    out
}
