//! Line-oriented commands for scripts and non-interactive terminals.

use std::io::Write;

use anyhow::Result;
use repo_guide_core::{AnswerArea, Backend, Controller};

/// Stream an analysis to `out`, then ask each follow-up question in turn.
/// Returns `false` when the analysis failed.
pub async fn analyze<B: Backend, W: Write>(
    backend: &B,
    url: &str,
    questions: &[String],
    out: &mut W,
) -> Result<bool> {
    let mut controller = Controller::with_url(url);
    let mut write_error = None;

    let outcome = controller
        .submit_analysis(backend, |block| {
            if write_error.is_none() {
                let written = writeln!(out, "{}", block.to_plain_text()).and_then(|_| out.flush());
                if let Err(err) = written {
                    write_error = Some(err);
                }
            }
        })
        .await?;

    if let Some(err) = write_error {
        return Err(err.into());
    }

    if let Err(err) = outcome {
        eprintln!("Error: {err}");
        return Ok(false);
    }

    for question in questions {
        controller.question_input_mut().clone_from(question);
        controller.submit_question(backend).await?;
        writeln!(out, "Q: {question}")?;
        writeln!(out, "{}\n", controller.view().answer.text())?;
    }

    Ok(true)
}

/// Ask a single question against whatever the service analyzed last.
/// Returns `false` when the answer is an error.
pub async fn ask<B: Backend, W: Write>(backend: &B, question: &str, out: &mut W) -> Result<bool> {
    let area = AnswerArea::from_outcome(backend.ask(question).await.map_err(|err| err.to_string()));

    match area {
        AnswerArea::Error(_) => {
            eprintln!("{}", area.text());
            Ok(false)
        }
        _ => {
            writeln!(out, "{}", area.text())?;
            Ok(true)
        }
    }
}
