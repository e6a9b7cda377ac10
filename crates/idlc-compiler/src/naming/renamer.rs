use idlc_core::utils::{capitalize, decapitalize};

/// Words rendered fully upper-cased when they form a camel-case word.
pub const INITIALISMS: &[&str] = &[
    "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP", "JSON",
    "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SSH", "TCP", "TLS", "TTL", "UDP", "UI",
    "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XSRF", "XSS",
];

/// Names that cannot be used as Go variables or parameters.
pub const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "error",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

const CONSTRUCTOR_PREFIX: &str = "New";
const HELPER_SUFFIXES: [&str; 2] = ["Args", "Result"];

/// Exported Go identifier for an IDL name.
///
/// A `pkg.` qualifier is kept verbatim. Names starting with `New` or ending
/// with `Args`/`Result` get a trailing `_` so they cannot collide with
/// generated constructors and per-function helper structs.
pub fn publicize(name: &str) -> String {
    publicize_inner(name, false)
}

/// Name of a per-function helper struct (`<fn>_args`, `<fn>_result`),
/// scoped by the owning service.
pub fn helper_struct_name(service: &str, helper: &str) -> String {
    format!("{}{}", publicize(service), publicize_inner(helper, true))
}

/// Unexported Go identifier for an IDL name.
pub fn privatize(name: &str) -> String {
    let (qualifier, local) = split_qualifier(name);
    format!("{qualifier}{}", camel_merge(&decapitalize(local)))
}

/// Constructor of an exported Go type (`NewFoo`), keeping any `pkg.`
/// qualifier in front.
pub fn new_prefix(go_name: &str) -> String {
    let (qualifier, local) = split_qualifier(go_name);
    format!("{qualifier}{CONSTRUCTOR_PREFIX}{local}")
}

/// Local variable or parameter name. Keywords (any case) get `_a1`.
pub fn go_variable(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if GO_KEYWORDS.contains(&lower.as_str()) {
        format!("{lower}_a1")
    } else {
        name.to_owned()
    }
}

/// Contract `_x` into `X`; a contracted word matching an initialism is
/// upper-cased entirely. Leading and trailing underscores are kept.
pub fn camel_merge(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let merges = c == '_' && i > 0 && i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase();
        if !merges {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i + 1;
        let end = chars[start..]
            .iter()
            .position(|&c| c == '_')
            .map_or(chars.len(), |offset| start + offset);
        let word: String = chars[start..end].iter().collect();
        let upper = word.to_ascii_uppercase();
        if INITIALISMS.contains(&upper.as_str()) {
            out.push_str(&upper);
        } else {
            out.push_str(&capitalize(&word));
        }
        i = end;
    }
    out
}

fn publicize_inner(name: &str, is_helper: bool) -> String {
    let (qualifier, local) = split_qualifier(name);
    if local.is_empty() {
        return name.to_owned();
    }

    let mut ident = camel_merge(&capitalize(local));
    if ident.starts_with(CONSTRUCTOR_PREFIX) {
        ident.push('_');
    }
    if !is_helper && HELPER_SUFFIXES.iter().any(|s| ident.ends_with(s)) {
        ident.push('_');
    }
    format!("{qualifier}{ident}")
}

/// `pkg.Name` -> (`pkg.`, `Name`). The qualifier keeps its dot.
fn split_qualifier(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) => name.split_at(dot + 1),
        None => ("", name),
    }
}
