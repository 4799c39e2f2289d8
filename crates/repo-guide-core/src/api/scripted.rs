//! In-memory backend that replays canned responses.

use std::sync::{Arc, Mutex};

use futures_util::{stream, StreamExt};

use super::{Backend, ChunkStream};
use crate::error::ClientError;
use crate::protocol::AnswerRecord;

#[derive(Debug, Clone)]
enum AnalyzeScript {
    Status(u16),
    Chunks(Vec<Vec<u8>>),
}

/// Replays a fixed `/analyze` body (or status) and a fixed `/ask` body, and
/// records every submitted form value.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    analyze: AnalyzeScript,
    answer_body: Vec<u8>,
    submissions: Arc<Mutex<Vec<(&'static str, String)>>>,
}

impl ScriptedBackend {
    /// `/analyze` answers 200 and delivers `chunks` exactly as split here.
    pub fn streaming<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            analyze: AnalyzeScript::Chunks(chunks.into_iter().map(Into::into).collect()),
            answer_body: Vec::new(),
            submissions: Arc::default(),
        }
    }

    /// `/analyze` answers with a bare status code.
    pub fn status(code: u16) -> Self {
        Self {
            analyze: AnalyzeScript::Status(code),
            answer_body: Vec::new(),
            submissions: Arc::default(),
        }
    }

    pub fn with_answer(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.answer_body = body.into();
        self
    }

    /// `(field, value)` pairs in submission order.
    pub fn submissions(&self) -> Vec<(&'static str, String)> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn record(&self, field: &'static str, value: &str) {
        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push((field, value.to_string()));
        }
    }
}

impl Backend for ScriptedBackend {
    async fn analyze(&self, github_url: &str) -> Result<ChunkStream, ClientError> {
        self.record("github_url", github_url);
        match &self.analyze {
            AnalyzeScript::Status(code) if !(200..300).contains(code) => {
                Err(ClientError::Status(*code))
            }
            AnalyzeScript::Status(_) => Ok(stream::empty().boxed()),
            AnalyzeScript::Chunks(chunks) => {
                Ok(stream::iter(chunks.clone().into_iter().map(Ok)).boxed())
            }
        }
    }

    async fn ask(&self, question: &str) -> Result<AnswerRecord, ClientError> {
        self.record("question", question);
        AnswerRecord::from_json(&self.answer_body)
    }
}
