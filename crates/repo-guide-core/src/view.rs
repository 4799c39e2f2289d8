//! The display model: everything a front end needs to draw, and nothing else.

use crate::protocol::AnswerRecord;

pub const PROCESSING_PLACEHOLDER: &str = "Processing your question...";

/// One entry of the explanations output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Explanation { file: String, text: String },
    Error { message: String },
}

impl Block {
    /// Plain-text rendering, as printed by the headless commands.
    pub fn to_plain_text(&self) -> String {
        match self {
            Block::Explanation { file, text } => format!("{file}:\n{text}\n"),
            Block::Error { message } => format!("Error: {message}"),
        }
    }
}

/// Append-only, ordered sequence of rendered blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Explanations {
    blocks: Vec<Block>,
}

impl Explanations {
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Drop everything rendered so far and show a single error instead.
    pub fn replace_with_error(&mut self, message: impl Into<String>) {
        self.blocks.clear();
        self.blocks.push(Block::Error {
            message: message.into(),
        });
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnswerArea {
    #[default]
    Empty,
    Processing,
    Answer(String),
    Error(String),
}

impl AnswerArea {
    /// What the answer area shows once `/ask` settles. `Err` carries the
    /// text of a transport or parse failure.
    pub fn from_outcome(outcome: Result<AnswerRecord, String>) -> Self {
        match outcome {
            Ok(AnswerRecord::Success { answer }) => AnswerArea::Answer(answer),
            Ok(AnswerRecord::Error { message }) | Err(message) => AnswerArea::Error(message),
        }
    }

    pub fn text(&self) -> String {
        match self {
            AnswerArea::Empty => String::new(),
            AnswerArea::Processing => PROCESSING_PLACEHOLDER.to_string(),
            AnswerArea::Answer(answer) => answer.clone(),
            AnswerArea::Error(message) => format!("Error: {message}"),
        }
    }
}

/// Page state: the two forms, the output regions and their visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub url_input: String,
    pub question_input: String,
    pub loader_visible: bool,
    pub results_visible: bool,
    pub qa_visible: bool,
    pub explanations: Explanations,
    pub answer: AnswerArea,
}
