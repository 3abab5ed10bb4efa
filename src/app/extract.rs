use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ExtractError {
    #[error("assignment not found in page content")]
    NeedleNotFound,
    #[error("no JSON value follows the assignment")]
    NoJsonValue,
    #[error("value opened but never closed")]
    UnterminatedValue,
}

/// Slice one JSON value out of raw page bytes.
///
/// The page is markup, not JSON; the value of interest sits on the right-hand
/// side of an inline assignment such as `var ytInitialData = {...};`. A JSON
/// parser cannot be pointed into the middle of arbitrary markup, so the value
/// boundaries are found with a quote- and bracket-aware scan and the exact
/// source bytes are returned, ready to be parsed on their own.
///
/// The needle is `prefix + name + postfix`; the value starts at the nearest
/// `"`, `{` or `[` after it, which also decides the value kind.
pub(crate) fn json_slice<'a>(
    content: &'a [u8],
    prefix: &[u8],
    name: &[u8],
    postfix: &[u8],
) -> Result<&'a [u8], ExtractError> {
    let needle = [prefix, name, postfix].concat();
    let at = find(content, &needle).ok_or(ExtractError::NeedleNotFound)?;
    let rest = &content[at + needle.len()..];

    let open = rest
        .iter()
        .position(|byte| matches!(byte, b'"' | b'{' | b'['))
        .ok_or(ExtractError::NoJsonValue)?;
    let value = &rest[open..];

    let len = match value[0] {
        b'"' => string_len(value)?,
        _ => delimited_len(value)?,
    };
    Ok(&value[..len])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Length of the string starting at `value[0] == b'"'`, closing quote
/// included. A backslash suppresses interpretation of the following byte, so
/// `\"` does not terminate the string.
fn string_len(value: &[u8]) -> Result<usize, ExtractError> {
    let mut escape = false;
    for (pos, &byte) in value.iter().enumerate().skip(1) {
        if escape {
            escape = false;
        } else if byte == b'\\' {
            escape = true;
        } else if byte == b'"' {
            return Ok(pos + 1);
        }
    }
    Err(ExtractError::UnterminatedValue)
}

/// Length of the object or array starting at `value[0]`, matching closer
/// included. Nested strings are skipped whole; a closer that does not match
/// the innermost open delimiter counts as plain content.
fn delimited_len(value: &[u8]) -> Result<usize, ExtractError> {
    let mut open: Vec<u8> = Vec::new();
    let mut pos = 0;
    while pos < value.len() {
        match value[pos] {
            b'"' => {
                pos += string_len(&value[pos..])?;
                continue;
            }
            byte @ (b'{' | b'[') => open.push(byte),
            b'}' if open.last() == Some(&b'{') => {
                open.pop();
            }
            b']' if open.last() == Some(&b'[') => {
                open.pop();
            }
            _ => {}
        }
        pos += 1;
        if open.is_empty() {
            return Ok(pos);
        }
    }
    Err(ExtractError::UnterminatedValue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_an_object_and_drops_the_trailing_semicolon() {
        let content = br#"var ytInitialData = {"a": "x\"y", "b": [1,2]};"#;
        let got = json_slice(content, b"", b"var ytInitialData = ", b"").expect("object present");
        assert_eq!(got, br#"{"a": "x\"y", "b": [1,2]}"#);
    }

    #[test]
    fn sliced_object_is_parseable_on_its_own() {
        let content = br#"<script>window.data = {"deep": {"list": [true, null, "}\\"]}} ;</script>"#;
        let got = json_slice(content, b"window.", b"data", b" = ").expect("object present");
        let value: serde_json::Value = serde_json::from_slice(got).expect("valid JSON");
        assert_eq!(value["deep"]["list"][2], serde_json::json!("}\\"));
    }

    #[test]
    fn slices_a_string_value() {
        let content = br#"var name = "hel\"lo world"; rest"#;
        let got = json_slice(content, b"var ", b"name", b" = ").expect("string present");
        assert_eq!(got, br#""hel\"lo world""#);
    }

    #[test]
    fn slices_an_array_value() {
        let content = b"config = [1, [2, 3], {\"k\": \"]\"}] trailing";
        let got = json_slice(content, b"", b"config", b" = ").expect("array present");
        assert_eq!(got, b"[1, [2, 3], {\"k\": \"]\"}]");
    }

    #[test]
    fn nearest_delimiter_decides_the_value_kind() {
        // The array opens before the later object does.
        let content = b"x = noise [1,2] {\"a\":1}";
        let got = json_slice(content, b"", b"x", b" = ").expect("value present");
        assert_eq!(got, b"[1,2]");
    }

    #[test]
    fn stray_closer_inside_an_object_is_plain_content() {
        let content = b"x = {\"a\": ]} done";
        let got = json_slice(content, b"", b"x", b" = ").expect("value present");
        assert_eq!(got, b"{\"a\": ]}");
    }

    #[test]
    fn missing_needle_fails() {
        let content = b"nothing to see here";
        let err = json_slice(content, b"var ", b"ytInitialData", b" = ").expect_err("no needle");
        assert_eq!(err, ExtractError::NeedleNotFound);
    }

    #[test]
    fn needle_at_end_of_content_has_no_value() {
        let content = b"var data = ";
        let err = json_slice(content, b"var ", b"data", b" = ").expect_err("nothing follows");
        assert_eq!(err, ExtractError::NoJsonValue);
    }

    #[test]
    fn truncated_object_fails() {
        let content = br#"var data = {"a": [1, 2"#;
        let err = json_slice(content, b"var ", b"data", b" = ").expect_err("never closed");
        assert_eq!(err, ExtractError::UnterminatedValue);
    }

    #[test]
    fn truncated_string_fails() {
        let content = br#"var data = "abc\""#;
        let err = json_slice(content, b"var ", b"data", b" = ").expect_err("never closed");
        assert_eq!(err, ExtractError::UnterminatedValue);
    }

    #[test]
    fn only_the_first_needle_occurrence_counts() {
        let content = br#"var data = {"first": 1}; var data = {"second": 2};"#;
        let got = json_slice(content, b"var ", b"data", b" = ").expect("first assignment");
        assert_eq!(got, br#"{"first": 1}"#);
    }
}
