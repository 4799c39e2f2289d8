pub mod api;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod protocol;
pub mod state;
pub mod view;

// Re-export main types for convenience
pub use api::{Backend, ChunkStream, HttpBackend};
#[cfg(any(test, feature = "testing"))]
pub use api::ScriptedBackend;
pub use config::Config;
pub use controller::Controller;
pub use decoder::{consume_stream, LineBuffer};
pub use error::{ClientError, TransitionError};
pub use protocol::{AnswerRecord, StreamRecord};
pub use state::Phase;
pub use view::{AnswerArea, Block, Explanations, View};
