/// Primitive value extractors for record lines
///
/// Every extractor locates a `Key:` prefix by substring search and reads the
/// token up to the next `;`. Failures never escape: a missing key or an
/// unparseable token yields the documented default so that hand-edited files
/// keep loading.

/// Raw token that follows `key`, trimmed, up to the next `;` (or end of line).
pub fn token_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let end = rest.find(';').unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Same as [`token_after`] but the key must start a token: it sits at the
/// beginning of the line or right after whitespace, `;` or a closing brace.
///
/// Short keys such as `X:` or `S:` need this so they are not found inside
/// longer keys.
pub fn token_after_boundary<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(offset) = line[search_from..].find(key) {
        let at = search_from + offset;
        let at_boundary = at == 0
            || line[..at]
                .chars()
                .next_back()
                .map(|c| matches!(c, ' ' | '\t' | ';' | '}'))
                .unwrap_or(true);
        if at_boundary {
            let rest = &line[at + key.len()..];
            let end = rest.find(';').unwrap_or(rest.len());
            return Some(rest[..end].trim());
        }
        search_from = at + key.len();
    }
    None
}

/// `true` when `key` occurs at a token boundary in `line`.
pub fn has_key(line: &str, key: &str) -> bool {
    token_after_boundary(line, key).is_some()
}

/// Parse a float token, accepting `,` as the decimal separator.
pub fn parse_float_token(token: &str) -> Option<f32> {
    let normalized = token.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f32>().ok().filter(|value| value.is_finite())
}

pub fn extract_int_value(line: &str, key: &str) -> i32 {
    token_after_boundary(line, key)
        .and_then(|token| token.parse::<i32>().ok())
        .unwrap_or(0)
}

pub fn extract_float_value(line: &str, key: &str) -> f32 {
    token_after_boundary(line, key)
        .and_then(parse_float_token)
        .unwrap_or(0.0)
}

/// Boolean codes: `2` is true, `1` is false, anything else is `default`.
pub fn extract_bool_value(line: &str, key: &str, default: bool) -> bool {
    match token_after_boundary(line, key).and_then(|token| token.parse::<i32>().ok()) {
        Some(2) => true,
        Some(1) => false,
        _ => default,
    }
}

/// Text strictly between the first `{` and the first `}`.
///
/// Returns an empty string when either brace is missing or the closing brace
/// comes first.
pub fn extract_text_within_braces(line: &str) -> String {
    brace_span(line)
        .map(|(open, close)| line[open + 1..close].to_string())
        .unwrap_or_default()
}

/// Removes the first `{...}` span, braces included. Lines without a valid
/// span are returned unchanged.
pub fn remove_content_within_braces(line: &str) -> String {
    match brace_span(line) {
        Some((open, close)) => {
            let mut result = String::with_capacity(line.len());
            result.push_str(&line[..open]);
            result.push_str(&line[close + 1..]);
            result
        }
        None => line.to_string(),
    }
}

/// `true` when the line carries a valid `{...}` span.
pub fn has_braced_text(line: &str) -> bool {
    brace_span(line).is_some()
}

fn brace_span(line: &str) -> Option<(usize, usize)> {
    let open = line.find('{')?;
    let close = line.find('}')?;
    if close < open {
        return None;
    }
    Some((open, close))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_defaults_to_zero() {
        assert_eq!(extract_int_value("no key here", "X:"), 0);
        assert_eq!(extract_int_value("S:abc;", "S:"), 0);
        assert_eq!(extract_int_value("id:1; S:14; CType:1;", "S:"), 14);
    }

    #[test]
    fn float_accepts_decimal_comma() {
        assert_eq!(extract_float_value("X:abc;", "X:"), 0.0);
        assert_eq!(extract_float_value("X:1,5; Y:2;", "X:"), 1.5);
        assert_eq!(extract_float_value("X:-0.25;", "X:"), -0.25);
        assert_eq!(extract_float_value("X:NaN;", "X:"), 0.0);
    }

    #[test]
    fn short_keys_respect_token_boundaries() {
        let line = "id:3; XPivot:0.5; YPivot:0.25; X:10; Y:-4;";
        assert_eq!(extract_float_value(line, "X:"), 10.0);
        assert_eq!(extract_float_value(line, "Y:"), -4.0);
        assert!(!has_key("id:3; XPivot:0.5;", "X:"));
        assert!(has_key("id:3; XPivot:0.5;", "XPivot:"));
    }

    #[test]
    fn key_directly_after_text_is_found() {
        assert_eq!(extract_int_value("id:1; {Hi}CType:3;", "CType:"), 3);
    }

    #[test]
    fn token_without_terminator_runs_to_end() {
        assert_eq!(token_after("CType:7", "CType:"), Some("7"));
        assert_eq!(extract_int_value("CType:7", "CType:"), 7);
    }

    #[test]
    fn bool_codes_fall_back_to_default() {
        assert!(extract_bool_value("R:3;", "R:", true));
        assert!(!extract_bool_value("R:3;", "R:", false));
        assert!(extract_bool_value("Rev:2;", "Rev:", false));
        assert!(!extract_bool_value("Rev:1;", "Rev:", true));
        assert!(extract_bool_value("nothing", "Rev:", true));
    }

    #[test]
    fn brace_extraction() {
        assert_eq!(extract_text_within_braces("id:1; {Hello} CType:1;"), "Hello");
        assert_eq!(extract_text_within_braces("id:1; CType:1;"), "");
        assert_eq!(extract_text_within_braces("id:1; }oops{ CType:1;"), "");
        assert_eq!(extract_text_within_braces("{a; b: c}"), "a; b: c");
    }

    #[test]
    fn brace_removal() {
        assert_eq!(
            remove_content_within_braces("id:1; {X:5; S:9;} CType:1;"),
            "id:1;  CType:1;"
        );
        assert_eq!(remove_content_within_braces("id:1; CType:1;"), "id:1; CType:1;");
        assert_eq!(remove_content_within_braces("} {"), "} {");
    }
}
