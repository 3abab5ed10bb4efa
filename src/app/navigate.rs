use serde_json::Value;
use thiserror::Error;

/// One move through nested playlist JSON.
///
/// The upstream format nests target fields under lists that hold exactly one
/// populated variant at a time (tab layouts, section lists); the cardinality
/// steps assert that shape on every walk instead of taking the first match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step<'a> {
    /// Select `name` out of an object.
    Key(&'a str),
    /// Select the sole element of a one-element list.
    ExactlyOne,
    /// Scan a list of objects and select the value under `name` from the
    /// single element that has it.
    ExactlyOneChildWithKey(&'a str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum NavigateError {
    #[error("step {step}: expected {expected}")]
    TypeMismatch { step: usize, expected: &'static str },
    #[error("step {step}: key {key:?} not found")]
    KeyNotFound { step: usize, key: String },
    #[error("step {step}: expected exactly one match, found {actual}")]
    Cardinality { step: usize, actual: usize },
}

/// Apply `path` left to right against `value`. Pure; the input is never
/// mutated and the returned reference points into it.
pub(crate) fn navigate<'v>(
    value: &'v Value,
    path: &[Step<'_>],
) -> Result<&'v Value, NavigateError> {
    let mut cursor = value;
    for (step, op) in path.iter().enumerate() {
        cursor = match *op {
            Step::Key(name) => cursor
                .as_object()
                .ok_or(NavigateError::TypeMismatch {
                    step,
                    expected: "an object",
                })?
                .get(name)
                .ok_or_else(|| NavigateError::KeyNotFound {
                    step,
                    key: name.to_string(),
                })?,
            Step::ExactlyOne => {
                let items = cursor.as_array().ok_or(NavigateError::TypeMismatch {
                    step,
                    expected: "a list",
                })?;
                match items.as_slice() {
                    [only] => only,
                    _ => {
                        return Err(NavigateError::Cardinality {
                            step,
                            actual: items.len(),
                        });
                    }
                }
            }
            Step::ExactlyOneChildWithKey(name) => {
                let items = cursor.as_array().ok_or(NavigateError::TypeMismatch {
                    step,
                    expected: "a list",
                })?;
                let mut matched = None;
                let mut count = 0;
                for item in items {
                    let child = item.as_object().ok_or(NavigateError::TypeMismatch {
                        step,
                        expected: "a list of objects",
                    })?;
                    if let Some(value) = child.get(name) {
                        matched = Some(value);
                        count += 1;
                    }
                }
                match (matched, count) {
                    (Some(value), 1) => value,
                    _ => return Err(NavigateError::Cardinality { step, actual: count }),
                }
            }
        };
    }
    Ok(cursor)
}
