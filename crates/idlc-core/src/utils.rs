//! ASCII-only case helpers. Never locale dependent.

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Lower-case the first character, leave the rest untouched.
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.push(first.to_ascii_lowercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Dotted module name to a slash-separated path (`a.b.c` -> `a/b/c`).
pub fn module_path(module: &str) -> String {
    module.replace('.', "/")
}

/// Last segment of a dotted module name.
pub fn module_leaf(module: &str) -> &str {
    module.rsplit('.').next().unwrap_or(module)
}
