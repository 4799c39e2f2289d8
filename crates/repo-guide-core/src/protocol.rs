//! Wire records exchanged with the analysis service.
//!
//! `/analyze` streams one [`StreamRecord`] per line; `/ask` returns a single
//! [`AnswerRecord`]. Both are discriminated by a `status` field.

use serde::Deserialize;

use crate::error::ClientError;

/// One line of the `/analyze` stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StreamRecord {
    Success { file: String, explanation: String },
    Error { message: String },
}

impl StreamRecord {
    /// Parse a single complete line. Unknown discriminants and missing fields
    /// are rejected along with invalid JSON.
    pub fn parse_line(line: &str) -> Result<Self, ClientError> {
        serde_json::from_str(line).map_err(|source| ClientError::Decode {
            line: line.to_string(),
            source,
        })
    }
}

/// Response of `/ask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerRecord {
    Success { answer: String },
    Error { message: String },
}

#[derive(Deserialize)]
struct AnswerWire {
    status: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AnswerRecord {
    /// Anything other than a `"success"` status carrying an `answer` is
    /// reported through its `message`.
    pub fn from_json(body: &[u8]) -> Result<Self, ClientError> {
        let wire: AnswerWire = serde_json::from_slice(body).map_err(ClientError::Answer)?;
        Ok(match (wire.status.as_str(), wire.answer) {
            ("success", Some(answer)) => AnswerRecord::Success { answer },
            _ => AnswerRecord::Error {
                message: wire.message.unwrap_or_default(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_stream_shapes() {
        let ok = StreamRecord::parse_line(
            r#"{"status":"success","file":"src/main.py","explanation":"Entry point"}"#,
        )
        .unwrap();
        assert_eq!(
            ok,
            StreamRecord::Success {
                file: "src/main.py".into(),
                explanation: "Entry point".into(),
            }
        );

        let err = StreamRecord::parse_line(r#"{"status":"error","message":"Invalid GitHub URL"}"#)
            .unwrap();
        assert_eq!(
            err,
            StreamRecord::Error {
                message: "Invalid GitHub URL".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_status_and_garbage() {
        assert!(matches!(
            StreamRecord::parse_line(r#"{"status":"pending"}"#),
            Err(ClientError::Decode { .. })
        ));
        assert!(matches!(
            StreamRecord::parse_line("{not json"),
            Err(ClientError::Decode { .. })
        ));
        assert!(matches!(
            StreamRecord::parse_line(r#"{"status":"success","file":"a.py"}"#),
            Err(ClientError::Decode { .. })
        ));
    }

    #[test]
    fn answer_statuses() {
        assert_eq!(
            AnswerRecord::from_json(br#"{"status":"success","answer":"42"}"#).unwrap(),
            AnswerRecord::Success { answer: "42".into() }
        );
        assert_eq!(
            AnswerRecord::from_json(br#"{"status":"error","message":"no idea"}"#).unwrap(),
            AnswerRecord::Error {
                message: "no idea".into()
            }
        );
        assert_eq!(
            AnswerRecord::from_json(br#"{"status":"weird"}"#).unwrap(),
            AnswerRecord::Error {
                message: String::new()
            }
        );
        assert!(matches!(
            AnswerRecord::from_json(b"<html>"),
            Err(ClientError::Answer(_))
        ));
    }
}
