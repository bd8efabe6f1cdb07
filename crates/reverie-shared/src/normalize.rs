//! Cleanup of raw completion text before it is parsed.
//!
//! Providers routinely wrap answers in markdown code fences, and some emit
//! raw newlines inside JSON string bodies.  Both normalizers are pure and
//! idempotent.

/// Strip code fences and surrounding whitespace, keeping newlines.
///
/// Used for content that is parsed line by line or decoded as JSON where
/// newlines are already properly escaped.
pub fn normalize_text(raw: &str) -> String {
    let mut current = strip_fences_once(raw);
    loop {
        let next = strip_fences_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Strict-JSON variant: strip fences, then collapse raw newlines and `\n`
/// escapes to single spaces.
pub fn normalize_json(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = collapse_newlines(&normalize_text(&current)).trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_fences_once(raw: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for line in raw.trim().lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("```") {
            if is_fence_tag(rest) {
                continue;
            }
            // Fence glued to content, e.g. ```json {"a": 1}```
            let body = strip_glued_tag(rest);
            let body = body.strip_suffix("```").unwrap_or(body).trim();
            if !body.is_empty() {
                kept.push(body);
            }
            continue;
        }

        match trimmed.strip_suffix("```") {
            Some(body) if !body.trim().is_empty() => kept.push(body.trim_end()),
            Some(_) => {}
            None => kept.push(line),
        }
    }

    kept.join("\n").trim().to_string()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+'
}

fn is_fence_tag(rest: &str) -> bool {
    rest.chars().all(is_tag_char)
}

/// Drop a language tag only when JSON follows it on the same line; any
/// other leading word is content.
fn strip_glued_tag(rest: &str) -> &str {
    let after_tag = rest.trim_start_matches(is_tag_char);
    let body = after_tag.trim_start();
    if after_tag.len() < rest.len() && (body.starts_with('{') || body.starts_with('[')) {
        body
    } else {
        rest
    }
}

/// Replace raw line breaks and `\n` escape sequences with spaces.
///
/// Escaped backslashes (`\\`) are copied through as a pair so that `\\n`
/// keeps meaning "backslash followed by n".
fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(' ');
            }
            '\n' => out.push(' '),
            '\\' => match chars.peek() {
                Some('n') => {
                    chars.next();
                    out.push(' ');
                }
                Some(&next) => {
                    chars.next();
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }

    out
}
