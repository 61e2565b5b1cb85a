use crate::error::ApiError;

/// Maximum text length for narration requests. The script provider truncates
/// further before calling the LLM; this just keeps payloads sane.
const MAX_TEXT_LENGTH: usize = 20_000;
/// Maximum chapter title length
const MAX_TITLE_LENGTH: usize = 300;

/// Validate a narration request
pub fn validate_narration_request(text: &str, chapter_title: Option<&str>) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Text too long (max {} characters)",
            MAX_TEXT_LENGTH
        )));
    }

    if let Some(title) = chapter_title {
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ApiError::InvalidInput(format!(
                "Chapter title too long (max {} characters)",
                MAX_TITLE_LENGTH
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_narration_request_valid() {
        assert!(validate_narration_request("নিউটনের গতিসূত্র", Some("পদার্থবিজ্ঞান")).is_ok());
        assert!(validate_narration_request("Some text", None).is_ok());
    }

    #[test]
    fn test_validate_narration_request_empty_text() {
        let result = validate_narration_request("", None);
        assert!(result.is_err());
        if let Err(ApiError::InvalidInput(msg)) = result {
            assert!(msg.contains("empty"));
        }

        assert!(validate_narration_request("   ", None).is_err());
    }

    #[test]
    fn test_validate_narration_request_too_long() {
        let long_text = "ক".repeat(MAX_TEXT_LENGTH + 1);
        let result = validate_narration_request(&long_text, None);
        assert!(result.is_err());
        if let Err(ApiError::InvalidInput(msg)) = result {
            assert!(msg.contains("too long"));
        }
    }

    #[test]
    fn test_validate_narration_request_title_too_long() {
        let long_title = "t".repeat(MAX_TITLE_LENGTH + 1);
        assert!(validate_narration_request("Text", Some(&long_title)).is_err());
        let ok_title = "t".repeat(MAX_TITLE_LENGTH);
        assert!(validate_narration_request("Text", Some(&ok_title)).is_ok());
    }
}
