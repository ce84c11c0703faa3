//! Upload request validation. Pure: no store access, no side effects.

use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MalformedRequest(String),
    #[error("file_content is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("File is {size} bytes, exceeding the maximum upload size of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },
}

#[derive(Deserialize)]
struct UploadBody {
    file_name: String,
    file_content: String,
    #[serde(default)]
    content_type: Option<String>,
}

/// A validated upload with its content decoded.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub file_name: String,
    pub content: Bytes,
    pub content_type: String,
}

/// Parse and check an upload body: `{file_name, file_content (base64), content_type?}`.
/// `max_size` bounds the decoded length, inclusive.
pub fn validate_upload(body: &[u8], max_size: u64) -> Result<ValidatedUpload, ValidationError> {
    let upload: UploadBody = serde_json::from_slice(body).map_err(|e| {
        ValidationError::MalformedRequest(format!(
            "Request body must be a JSON object with string fields file_name and file_content: {e}"
        ))
    })?;

    if upload.file_name.is_empty() {
        return Err(ValidationError::MalformedRequest(
            "file_name must not be empty".to_string(),
        ));
    }

    // Reject obviously oversized payloads before allocating the decode buffer
    let estimate = base64::decoded_len_estimate(upload.file_content.len()) as u64;
    if estimate > max_size.saturating_add(2) {
        return Err(ValidationError::PayloadTooLarge {
            size: estimate,
            limit: max_size,
        });
    }

    let content = base64::engine::general_purpose::STANDARD
        .decode(upload.file_content.as_bytes())
        .map_err(|e| ValidationError::InvalidEncoding(e.to_string()))?;

    let size = content.len() as u64;
    if size > max_size {
        return Err(ValidationError::PayloadTooLarge {
            size,
            limit: max_size,
        });
    }

    let content_type = upload
        .content_type
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    Ok(ValidatedUpload {
        file_name: upload.file_name,
        content: Bytes::from(content),
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    const LIMIT: u64 = 20 * 1024 * 1024;

    fn body(file_name: &str, content: &[u8], content_type: Option<&str>) -> Vec<u8> {
        let mut value = serde_json::json!({
            "file_name": file_name,
            "file_content": STANDARD.encode(content),
        });
        if let Some(ct) = content_type {
            value["content_type"] = serde_json::Value::from(ct);
        }
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn accepts_valid_upload() {
        let upload = validate_upload(&body("hello.txt", b"Hello!", Some("text/plain")), LIMIT).unwrap();
        assert_eq!(upload.file_name, "hello.txt");
        assert_eq!(upload.content, Bytes::from_static(b"Hello!"));
        assert_eq!(upload.content_type, "text/plain");
    }

    #[test]
    fn content_type_defaults_to_binary() {
        let upload = validate_upload(&body("a.bin", b"x", None), LIMIT).unwrap();
        assert_eq!(upload.content_type, DEFAULT_CONTENT_TYPE);

        let upload = validate_upload(&body("a.bin", b"x", Some("")), LIMIT).unwrap();
        assert_eq!(upload.content_type, DEFAULT_CONTENT_TYPE);

        let raw = br#"{"file_name":"a.bin","file_content":"eA==","content_type":null}"#;
        let upload = validate_upload(raw, LIMIT).unwrap();
        assert_eq!(upload.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn keeps_non_ascii_file_name() {
        let upload = validate_upload(&body("résumé 履歴書.txt", b"cv", None), LIMIT).unwrap();
        assert_eq!(upload.file_name, "résumé 履歴書.txt");
    }

    #[test]
    fn empty_content_is_a_zero_byte_file() {
        let upload = validate_upload(&body("empty", b"", None), LIMIT).unwrap();
        assert!(upload.content.is_empty());
    }

    #[test]
    fn rejects_malformed_bodies() {
        let cases: &[&[u8]] = &[
            b"",
            b"not json",
            b"[]",
            br#"{"file_content":"eA=="}"#,
            br#"{"file_name":"a.txt"}"#,
            br#"{"file_name":7,"file_content":"eA=="}"#,
            br#"{"file_name":"a.txt","file_content":["eA=="]}"#,
            br#"{"file_name":"a.txt","file_content":"eA==","content_type":5}"#,
            br#"{"file_name":"","file_content":"eA=="}"#,
        ];
        for case in cases {
            let err = validate_upload(case, LIMIT).unwrap_err();
            assert!(
                matches!(err, ValidationError::MalformedRequest(_)),
                "expected MalformedRequest for {:?}, got {err:?}",
                String::from_utf8_lossy(case)
            );
        }
    }

    #[test]
    fn rejects_invalid_base64() {
        for content in ["not base64!", "eA=", "e", "eA==eA=="] {
            let raw = serde_json::to_vec(&serde_json::json!({
                "file_name": "a.txt",
                "file_content": content,
            }))
            .unwrap();
            let err = validate_upload(&raw, LIMIT).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidEncoding(_)),
                "expected InvalidEncoding for {content:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn size_limit_is_inclusive() {
        let exact = vec![7u8; LIMIT as usize];
        let upload = validate_upload(&body("exact.bin", &exact, None), LIMIT).unwrap();
        assert_eq!(upload.content.len() as u64, LIMIT);

        let over = vec![7u8; LIMIT as usize + 1];
        let err = validate_upload(&body("over.bin", &over, None), LIMIT).unwrap_err();
        assert_eq!(
            err,
            ValidationError::PayloadTooLarge {
                size: LIMIT + 1,
                limit: LIMIT
            }
        );
    }

    #[test]
    fn huge_limit_does_not_overflow() {
        let upload = validate_upload(&body("a", b"abc", None), u64::MAX).unwrap();
        assert_eq!(upload.content.len(), 3);
    }

    #[test]
    fn size_limit_applies_to_small_limits() {
        assert!(validate_upload(&body("a", b"1234", None), 4).is_ok());
        for len in 5..12 {
            let err = validate_upload(&body("a", &vec![0u8; len], None), 4).unwrap_err();
            assert!(matches!(err, ValidationError::PayloadTooLarge { .. }));
        }
    }
}
