//! XML text escaping for TABLEDATA output.

use std::borrow::Cow;

/// Escapes `&`, `<` and `>` so `value` can be placed in element content.
///
/// Borrows the input when nothing needs escaping.
pub fn escape_cdata(value: &str) -> Cow<'_, str> {
    if !value.contains(&['&', '<', '>'][..]) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Reverses [`escape_cdata`], turning `&amp;`, `&lt;` and `&gt;` back
/// into the characters they stand for. Other text is left as is.
pub fn unescape_cdata(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }

    let mut unescaped = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('&') {
        unescaped.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        let (c, len) = if tail.starts_with("&amp;") {
            ('&', 5)
        } else if tail.starts_with("&lt;") {
            ('<', 4)
        } else if tail.starts_with("&gt;") {
            ('>', 4)
        } else {
            ('&', 1)
        };
        unescaped.push(c);
        rest = &tail[len..];
    }
    unescaped.push_str(rest);
    Cow::Owned(unescaped)
}
