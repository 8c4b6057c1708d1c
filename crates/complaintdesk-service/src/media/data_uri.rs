//! `data:<mime>;base64,<payload>` parsing and validation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use complaintdesk_core::error::AppError;

/// A decoded and size-checked data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared media type.
    pub mime: String,
    /// Decoded size in bytes.
    pub size: usize,
    raw: String,
}

impl DataUri {
    /// Parse `input`, rejecting anything over `max_bytes` once decoded.
    pub fn parse(input: &str, max_bytes: usize) -> Result<Self, AppError> {
        let rest = input
            .strip_prefix("data:")
            .ok_or_else(|| AppError::validation("Attachment must be a data URI"))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| AppError::validation("Attachment must be base64 encoded"))?;
        if mime.is_empty() || !mime.contains('/') {
            return Err(AppError::validation("Attachment has no media type"));
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| AppError::validation(format!("Attachment is not valid base64: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::validation("Attachment is empty"));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::validation(format!(
                "Attachment exceeds the {max_bytes} byte limit"
            )));
        }

        Ok(Self {
            mime: mime.to_string(),
            size: bytes.len(),
            raw: input.to_string(),
        })
    }

    /// The original URI, as sent to the media host.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use complaintdesk_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_parses_png() {
        let uri = DataUri::parse("data:image/png;base64,iVBORw0KGgo=", 1024).unwrap();
        assert_eq!(uri.mime, "image/png");
        assert_eq!(uri.size, 8);
        assert!(uri.as_str().starts_with("data:image/png"));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        for input in [
            "https://example.com/a.png",
            "data:image/png,plain",
            "data:;base64,AAAA",
            "data:image/png;base64,***",
            "data:image/png;base64,",
        ] {
            let err = DataUri::parse(input, 1024).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{input}");
        }
    }

    #[test]
    fn test_enforces_size_limit() {
        assert!(DataUri::parse("data:text/plain;base64,aGVsbG8=", 5).is_ok());
        assert!(DataUri::parse("data:text/plain;base64,aGVsbG8=", 4).is_err());
    }
}
