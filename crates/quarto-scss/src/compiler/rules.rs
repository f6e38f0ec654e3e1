//! Lexical scan for the URLs a stylesheet loads.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This is not a parser. It skips comments and string literals, finds
//! `@import`, `@use` and `@forward` rules and collects their URLs. It works
//! for both the SCSS and the indented syntax. URLs it misses are still
//! resolved, just through grass's own probing.

/// URLs named by load rules in `source`, in source order.
///
/// Built-in modules (`sass:math`) and remote URLs are left out.
pub(super) fn load_urls(source: &str) -> Vec<String> {
    let bytes = source.as_bytes();
    let mut urls = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = source[i..].find('\n').map_or(bytes.len(), |end| i + end);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = source[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |end| i + 2 + end + 2);
            }
            b'"' | b'\'' => i = string_end(bytes, i),
            b'@' => {
                let name_end = ident_end(bytes, i + 1);
                let name = &source[i + 1..name_end];
                if matches!(name, "import" | "use" | "forward") {
                    let end = rule_end(bytes, name_end);
                    collect(&source[name_end..end], name == "import", &mut urls);
                    i = end;
                } else {
                    i = name_end;
                }
            }
            _ => i += 1,
        }
    }

    urls.retain(|url| {
        !url.is_empty()
            && !url.starts_with("sass:")
            && !url.starts_with("http://")
            && !url.starts_with("https://")
            && !url.starts_with("//")
    });
    urls
}

/// Index just past the string literal starting at `start`.
///
/// An unterminated literal ends at the line break.
fn string_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    let mut j = start;
    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'-' || bytes[j] == b'_') {
        j += 1;
    }
    j
}

/// End of the rule body starting at `start`: `;`, a block delimiter, or a
/// line break that does not follow a comma (indented syntax).
fn rule_end(bytes: &[u8], start: usize) -> usize {
    let mut j = start;
    let mut last = None;
    while j < bytes.len() {
        match bytes[j] {
            b'"' | b'\'' => {
                j = string_end(bytes, j);
                last = Some(b'"');
                continue;
            }
            b';' | b'{' | b'}' => return j,
            b'\n' if last.is_some() && last != Some(b',') => return j,
            b if !b.is_ascii_whitespace() => last = Some(b),
            _ => {}
        }
        j += 1;
    }
    j
}

/// Pull URLs out of one rule body.
///
/// `@import` may list several URLs and, in the indented syntax, leave them
/// unquoted. `@use` and `@forward` take exactly one quoted URL.
fn collect(body: &str, is_import: bool, urls: &mut Vec<String>) {
    let bytes = body.as_bytes();
    let mut quoted = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' || bytes[i] == b'\'' {
            let end = string_end(bytes, i);
            if end > i + 1 && bytes[end - 1] == bytes[i] {
                quoted.push(body[i + 1..end - 1].to_string());
            }
            i = end;
        } else {
            i += 1;
        }
    }

    if !is_import {
        urls.extend(quoted.into_iter().take(1));
    } else if !quoted.is_empty() {
        urls.extend(quoted);
    } else {
        urls.extend(
            body.split(',')
                .map(str::trim)
                .filter(|url| !url.starts_with("url("))
                .map(str::to_string),
        );
    }
}
