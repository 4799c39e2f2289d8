//! Incremental decoding of the newline-delimited `/analyze` stream.
//!
//! Chunks arrive on arbitrary boundaries: mid-record and even mid-character.
//! Newlines are located on raw bytes, and a `\n` byte never appears inside a
//! multi-byte UTF-8 sequence, so a line is only decoded once all of its bytes
//! have arrived.

use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::protocol::StreamRecord;

/// Bytes of the stream not yet terminated by a newline.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every line it completes, in order.
    /// Whatever follows the last newline stays buffered.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // `pending` never holds a newline, so only the new bytes are searched.
        let offset = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = chunk.iter().rposition(|b| *b == b'\n').map(|i| offset + i) else {
            return Vec::new();
        };

        let tail = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, tail);

        complete[..last_newline]
            .split(|b| *b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// The unterminated remainder, if any. Callers discard it.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

/// Pull chunks until end-of-stream, dispatching each non-blank line as a
/// [`StreamRecord`] before the next chunk is requested.
///
/// A byte-order mark at the very start of the stream is dropped. Returns the
/// number of records dispatched. The first read error or malformed line aborts
/// the loop; records already dispatched stay dispatched.
pub async fn consume_stream<S, B, F>(mut chunks: S, mut dispatch: F) -> Result<usize, ClientError>
where
    S: Stream<Item = Result<B, ClientError>> + Unpin,
    B: AsRef<[u8]>,
    F: FnMut(StreamRecord),
{
    let mut buffer = LineBuffer::new();
    let mut dispatched = 0;
    let mut at_start = true;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        for line in buffer.push(chunk.as_ref()) {
            let mut line = line.as_str();
            if std::mem::take(&mut at_start) {
                line = line.strip_prefix('\u{FEFF}').unwrap_or(line);
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let record = StreamRecord::parse_line(line)?;
            debug!(index = dispatched, ?record, "stream record");
            dispatch(record);
            dispatched += 1;
        }
    }

    if let Some(tail) = buffer.finish() {
        warn!(bytes = tail.len(), "discarding unterminated trailing line");
    }

    Ok(dispatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use rstest::rstest;

    const STREAM: &str = concat!(
        r#"{"status":"success","file":"café.py","explanation":"Crée le café ☕"}"#,
        "\n",
        r#"{"status":"error","message":"日本語のエラー"}"#,
        "\n\n",
        r#"{"status":"success","file":"b.rs","explanation":"plain"}"#,
        "\r\n",
    );

    async fn decode(chunks: Vec<Vec<u8>>) -> Result<Vec<StreamRecord>, ClientError> {
        let mut records = Vec::new();
        consume_stream(stream::iter(chunks.into_iter().map(Ok)), |r| records.push(r)).await?;
        Ok(records)
    }

    fn expected() -> Vec<StreamRecord> {
        vec![
            StreamRecord::Success {
                file: "café.py".into(),
                explanation: "Crée le café ☕".into(),
            },
            StreamRecord::Error {
                message: "日本語のエラー".into(),
            },
            StreamRecord::Success {
                file: "b.rs".into(),
                explanation: "plain".into(),
            },
        ]
    }

    #[test]
    fn buffer_keeps_only_the_last_segment() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"{\"a\":").is_empty());
        assert_eq!(buffer.pending(), b"{\"a\":");

        let lines = buffer.push(b"1}\n{\"b\":2}\n{\"c\"");
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(buffer.pending(), b"{\"c\"");

        assert_eq!(buffer.push(b"\n"), vec!["{\"c\""]);
        assert!(buffer.pending().is_empty());
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn multibyte_character_split_across_pushes() {
        let bytes = "é\n".as_bytes();
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(&bytes[..1]).is_empty());
        assert_eq!(buffer.push(&bytes[1..]), vec!["é"]);
    }

    #[test]
    fn long_line_across_many_chunks() {
        let line = format!("{{\"status\":\"error\",\"message\":\"{}\"}}", "x".repeat(5000));
        let mut buffer = LineBuffer::new();
        for piece in line.as_bytes().chunks(3) {
            assert!(buffer.push(piece).is_empty());
        }
        assert_eq!(buffer.pending().len(), line.len());
        assert_eq!(buffer.push(b"\n{\"next\""), vec![line]);
        assert_eq!(buffer.pending(), b"{\"next\"");
    }

    #[tokio::test]
    async fn leading_byte_order_mark_is_dropped() {
        let mut bytes = "\u{FEFF}".as_bytes().to_vec();
        bytes.extend_from_slice(STREAM.as_bytes());

        for at in 0..=4 {
            let chunks = vec![bytes[..at].to_vec(), bytes[at..].to_vec()];
            assert_eq!(decode(chunks).await.unwrap(), expected(), "split at byte {at}");
        }
    }

    #[tokio::test]
    async fn byte_order_mark_after_the_first_line_is_rejected() {
        let chunks = vec![concat!(
            r#"{"status":"error","message":"one"}"#,
            "\n\u{FEFF}",
            r#"{"status":"error","message":"two"}"#,
            "\n",
        )
        .as_bytes()
        .to_vec()];
        assert!(matches!(decode(chunks).await, Err(ClientError::Decode { .. })));
    }

    #[tokio::test]
    async fn every_two_way_split_matches_unsplit() {
        let bytes = STREAM.as_bytes();
        let whole = decode(vec![bytes.to_vec()]).await.unwrap();
        assert_eq!(whole, expected());

        for at in 0..=bytes.len() {
            let split = decode(vec![bytes[..at].to_vec(), bytes[at..].to_vec()])
                .await
                .unwrap();
            assert_eq!(split, whole, "split at byte {at}");
        }
    }

    #[tokio::test]
    async fn every_three_way_split_matches_unsplit() {
        let bytes = STREAM.as_bytes();
        let whole = expected();
        for a in 0..=bytes.len() {
            for b in a..=bytes.len() {
                let chunks = vec![
                    bytes[..a].to_vec(),
                    bytes[a..b].to_vec(),
                    bytes[b..].to_vec(),
                ];
                assert_eq!(decode(chunks).await.unwrap(), whole, "split at {a}/{b}");
            }
        }
    }

    #[rstest]
    #[case::byte_at_a_time(1)]
    #[case::odd_width(7)]
    #[case::wider_than_a_record(90)]
    #[tokio::test]
    async fn fixed_width_chunking(#[case] width: usize) {
        let chunks = STREAM.as_bytes().chunks(width).map(<[u8]>::to_vec).collect();
        assert_eq!(decode(chunks).await.unwrap(), expected());
    }

    #[tokio::test]
    async fn unterminated_tail_is_discarded() {
        let chunks = vec![
            br#"{"status":"error","message":"first"}"#.to_vec(),
            b"\n".to_vec(),
            br#"{"status":"error","message":"never finished"}"#.to_vec(),
        ];
        let records = decode(chunks).await.unwrap();
        assert_eq!(
            records,
            vec![StreamRecord::Error {
                message: "first".into()
            }]
        );
    }

    #[tokio::test]
    async fn malformed_line_aborts_after_earlier_records() {
        let mut records = Vec::new();
        let chunks = vec![Ok(concat!(
            r#"{"status":"error","message":"kept"}"#,
            "\n",
            "not json\n",
            r#"{"status":"error","message":"never seen"}"#,
            "\n",
        )
        .as_bytes()
        .to_vec())];

        let result = consume_stream(stream::iter(chunks), |r| records.push(r)).await;

        assert!(matches!(result, Err(ClientError::Decode { ref line, .. }) if line == "not json"));
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn read_error_propagates() {
        let chunks: Vec<Result<Vec<u8>, ClientError>> = vec![
            Ok(b"{\"status\":\"error\",\"message\":\"x\"}\n".to_vec()),
            Err(ClientError::Status(502)),
        ];
        let mut count = 0;
        let result = consume_stream(stream::iter(chunks), |_| count += 1).await;
        assert!(matches!(result, Err(ClientError::Status(502))));
        assert_eq!(count, 1);
    }
}
