//! Text cleanup applied before structural parsing

/// Clean the model's top-level reply
///
/// Strips surrounding whitespace and a wrapping Markdown code fence
/// (```` ```json ... ``` ```` or a bare ```` ``` ````). Quotes are left alone.
pub fn normalize_response(text: &str) -> String {
    strip_code_fence(text.trim()).trim().to_string()
}

/// Clean a string pulled out of a `data` envelope
///
/// Models often emit Python-style dicts inside the envelope, so every single
/// quote becomes a double quote. Apostrophes inside titles are not protected.
pub fn normalize_candidate(text: &str) -> String {
    text.trim().replace('\'', "\"")
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the info string (e.g. "json") on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end().strip_suffix("```").unwrap_or(body)
}
