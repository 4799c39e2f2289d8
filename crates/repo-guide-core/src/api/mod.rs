pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;

use std::future::Future;

use futures_util::stream::BoxStream;

use crate::error::ClientError;
use crate::protocol::AnswerRecord;

pub use http::HttpBackend;
#[cfg(any(test, feature = "testing"))]
pub use scripted::ScriptedBackend;

/// Raw `/analyze` body, chunk by chunk, as the transport delivers it.
pub type ChunkStream = BoxStream<'static, Result<Vec<u8>, ClientError>>;

/// The two endpoints of the analysis service.
pub trait Backend: Send + Sync {
    /// `POST /analyze` with form field `github_url`. Fails with
    /// [`ClientError::Status`] before any body is read on a non-2xx reply.
    fn analyze(
        &self,
        github_url: &str,
    ) -> impl Future<Output = Result<ChunkStream, ClientError>> + Send;

    /// `POST /ask` with form field `question`, awaiting the whole JSON body.
    fn ask(&self, question: &str) -> impl Future<Output = Result<AnswerRecord, ClientError>> + Send;
}
