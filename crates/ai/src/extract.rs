//! Locating the JSON object in a model reply
//!
//! Models often wrap the requested JSON in prose or code fences. The object
//! is taken to span from the first `{` to the last `}` of the reply.

use formai_core::{FormError, FormResult};

/// Return the `{ ... }` span of `text`, or `NoJsonFound` if there is none
pub fn extract_json_span(text: &str) -> FormResult<&str> {
    let start = text.find('{');
    let end = text.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(FormError::NoJsonFound {
            raw: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignores_surrounding_prose() {
        let reply = "Sure! Here you go: {\"title\":\"T\",\"elements\":[]}\nEnjoy!";
        assert_eq!(
            extract_json_span(reply).unwrap(),
            "{\"title\":\"T\",\"elements\":[]}"
        );
    }

    #[test]
    fn test_code_fence() {
        let reply = "```json\n{\"elements\": [{\"a\": {}}]}\n```";
        assert_eq!(
            extract_json_span(reply).unwrap(),
            "{\"elements\": [{\"a\": {}}]}"
        );
    }

    #[test]
    fn test_no_braces() {
        let err = extract_json_span("I cannot help with that.").unwrap_err();
        assert!(matches!(err, FormError::NoJsonFound { .. }));
        assert_eq!(err.raw_response(), Some("I cannot help with that."));
    }

    #[test]
    fn test_degenerate_span() {
        assert!(extract_json_span("} backwards {").is_err());
        assert!(extract_json_span("{ \"title\": \"x\" ").is_err());
    }
}
