/// Pull the JSON document out of a model response.
///
/// Models with native structured output return bare JSON; others wrap it
/// in a fenced block or surround it with prose.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    // Already a complete document; fences inside string values stay untouched
    if serde_json::from_str::<serde::de::IgnoredAny>(trimmed).is_ok() {
        return trimmed;
    }

    // Handle ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Handle ``` ... ``` blocks
    if let Some(start) = trimmed.find("```") {
        let json_start = start + 3;
        // Skip past any language identifier on the same line
        let after_tick = &trimmed[json_start..];
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_tick[content_start..].find("```") {
            return after_tick[content_start..content_start + end].trim();
        }
    }

    // Raw object or array, whichever opens first
    let open = trimmed.find(['{', '[']);
    if let Some(start) = open {
        let close = if trimmed.as_bytes()[start] == b'{' { '}' } else { ']' };
        if let Some(end) = trimmed.rfind(close) {
            if end > start {
                return &trimmed[start..=end];
            }
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_object() {
        let input = r#"{"score": 7}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn fenced_block() {
        let input = "Here is the evaluation:\n```json\n{\"score\": 7}\n```\nDone.";
        assert_eq!(extract_json(input), r#"{"score": 7}"#);
    }

    #[test]
    fn untagged_fence() {
        let input = "```\n[\"What is a closure?\"]\n```";
        assert_eq!(extract_json(input), r#"["What is a closure?"]"#);
    }

    #[test]
    fn fence_inside_string_value_is_not_unwrapped() {
        let input = r#"{"defaultCode": "```tsx\nexport function Widget() {}\n```"}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn array_with_prose() {
        let input = "Sure! [{\"question\": \"Q\", \"category\": \"teamwork\"}] Good luck.";
        assert_eq!(
            extract_json(input),
            r#"[{"question": "Q", "category": "teamwork"}]"#
        );
    }

    #[test]
    fn object_containing_arrays() {
        let input = "Result: {\"strengths\": [\"a\"], \"score\": 5}";
        assert_eq!(extract_json(input), r#"{"strengths": ["a"], "score": 5}"#);
    }
}
