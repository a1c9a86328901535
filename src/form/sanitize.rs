/// Characters that must be backslash-escaped before a caller-supplied string
/// is spliced into a selector.
pub const RESERVED_SELECTOR_CHARS: [char; 25] = [
    ' ', '#', ';', '?', '%', '&', ',', '.', '+', '*', '~', '\'', '"', '!', '^', '$', '[', ']',
    '(', ')', '=', '>', '|', '/', '@',
];

/// Escape every reserved character in `raw` with a leading backslash.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if RESERVED_SELECTOR_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
