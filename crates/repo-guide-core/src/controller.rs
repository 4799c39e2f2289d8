//! Owns the [`View`] and the [`Phase`], and moves both through the analyze
//! and ask lifecycles.
//!
//! Transitions are plain synchronous methods so a front end can drive them
//! from its own event loop. `submit_analysis` and `submit_question` chain
//! them around a [`Backend`] call for callers that can simply await.

use tracing::{debug, info, warn};

use crate::api::Backend;
use crate::decoder::consume_stream;
use crate::error::{ClientError, TransitionError};
use crate::protocol::{AnswerRecord, StreamRecord};
use crate::state::Phase;
use crate::view::{AnswerArea, Block, View};

#[derive(Debug, Default)]
pub struct Controller {
    view: View,
    phase: Phase,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        let mut controller = Self::new();
        controller.view.url_input = url.into();
        controller
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn url_input_mut(&mut self) -> &mut String {
        &mut self.view.url_input
    }

    pub fn question_input_mut(&mut self) -> &mut String {
        &mut self.view.question_input
    }

    // ------------------------------------------------------------------
    // Analyze
    // ------------------------------------------------------------------

    /// Reset the output regions for a new run and return the URL to submit.
    pub fn begin_analysis(&mut self) -> Result<String, TransitionError> {
        if self.phase.is_busy() {
            return Err(TransitionError::Busy(self.phase));
        }

        self.view.loader_visible = true;
        self.view.results_visible = false;
        self.view.qa_visible = false;
        self.view.explanations.clear();
        self.phase = Phase::Analyzing;

        Ok(self.view.url_input.clone())
    }

    pub fn apply_record(&mut self, record: StreamRecord) {
        if self.phase != Phase::Analyzing {
            debug!(phase = self.phase.label(), "ignoring record outside an analysis");
            return;
        }

        match record {
            StreamRecord::Success { file, explanation } => {
                self.view.explanations.push(Block::Explanation {
                    file,
                    text: explanation,
                });
                self.view.results_visible = true;
            }
            StreamRecord::Error { message } => {
                self.view.explanations.push(Block::Error { message });
            }
        }
    }

    /// End-of-stream: hide the loader and open the Q&A section.
    pub fn finish_analysis(&mut self) {
        if self.phase != Phase::Analyzing {
            return;
        }
        self.view.loader_visible = false;
        self.view.qa_visible = true;
        self.phase = Phase::Ready;
        info!(blocks = self.view.explanations.len(), "analysis complete");
    }

    /// Transport or decode failure: the error replaces everything rendered.
    pub fn fail_analysis(&mut self, message: impl Into<String>) {
        if self.phase != Phase::Analyzing {
            return;
        }
        let message = message.into();
        warn!(%message, "analysis failed");
        self.view.loader_visible = false;
        self.view.results_visible = true;
        self.view.explanations.replace_with_error(message);
        self.phase = Phase::Failed;
    }

    /// Run a whole analysis against `backend`, calling `on_block` for every
    /// block as it is appended.
    pub async fn submit_analysis<B, F>(
        &mut self,
        backend: &B,
        mut on_block: F,
    ) -> Result<Result<(), ClientError>, TransitionError>
    where
        B: Backend,
        F: FnMut(&Block),
    {
        let url = self.begin_analysis()?;

        let outcome = match backend.analyze(&url).await {
            Ok(chunks) => {
                consume_stream(chunks, |record| {
                    self.apply_record(record);
                    if let Some(block) = self.view.explanations.blocks().last() {
                        on_block(block);
                    }
                })
                .await
            }
            Err(err) => Err(err),
        };

        Ok(match outcome {
            Ok(_) => {
                self.finish_analysis();
                Ok(())
            }
            Err(err) => {
                self.fail_analysis(err.to_string());
                Err(err)
            }
        })
    }

    // ------------------------------------------------------------------
    // Ask
    // ------------------------------------------------------------------

    /// Show the placeholder and return the question to submit.
    pub fn begin_question(&mut self) -> Result<String, TransitionError> {
        match self.phase {
            Phase::Ready => {}
            Phase::Asking | Phase::Analyzing => return Err(TransitionError::Busy(self.phase)),
            Phase::Idle | Phase::Failed => return Err(TransitionError::NotReady),
        }

        self.view.answer = AnswerArea::Processing;
        self.phase = Phase::Asking;
        Ok(self.view.question_input.clone())
    }

    /// Render the outcome and clear the question input whatever it was.
    pub fn finish_question(&mut self, outcome: Result<AnswerRecord, String>) {
        if self.phase != Phase::Asking {
            debug!(phase = self.phase.label(), "ignoring answer outside a question");
            return;
        }

        if let Err(message) = &outcome {
            warn!(%message, "question failed");
        }
        self.view.answer = AnswerArea::from_outcome(outcome);
        self.view.question_input.clear();
        self.phase = Phase::Ready;
    }

    pub async fn submit_question<B: Backend>(
        &mut self,
        backend: &B,
    ) -> Result<(), TransitionError> {
        let question = self.begin_question()?;
        let outcome = backend.ask(&question).await.map_err(|err| err.to_string());
        self.finish_question(outcome);
        Ok(())
    }
}
