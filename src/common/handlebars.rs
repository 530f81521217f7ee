use handlebars::{handlebars_helper, Handlebars};

/// Escape text for embedding in a single-quoted JavaScript string literal.
pub fn escape_js_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '<' => escaped.push_str("\\u003C"),
            '>' => escaped.push_str("\\u003E"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Handlebars registry with the helpers used by the admin fragments.
///
/// Strict mode is on so a missing template variable fails loudly instead of
/// rendering an empty attribute.
pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);

    handlebars_helper!(js_string: |s: String| escape_js_string(&s));
    handlebars.register_helper("js_string", Box::new(js_string));

    handlebars
}
