//! Pipeline runner: an explicit stage state machine
//!
//! A run advances `AwaitingQuery -> AwaitingResult -> AwaitingAnswer ->
//! Done`, transitioning only when the current stage's external call has
//! completed and its update has merged additively into the shared state.
//! On a stage failure the run stays where it is and the error propagates;
//! there is no partial Done and no rollback.

use crate::error::PipelineError;
use crate::stages;
use askdb_core::{PipelineState, StageUpdate, StateError};
use askdb_llm::LanguageModel;
use askdb_store::SqlStore;
use std::sync::Arc;

/// Completion state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// write_query has not completed
    AwaitingQuery,

    /// execute_query has not completed
    AwaitingResult,

    /// generate_answer has not completed
    AwaitingAnswer,

    /// All three updates have been emitted
    Done,
}

/// The assembled pipeline: one store, one model, one row-limit policy.
///
/// Cheap to share; each `run` creates fresh per-question state and nothing
/// persists across runs.
pub struct Pipeline {
    store: Arc<dyn SqlStore>,
    model: Arc<dyn LanguageModel>,
    row_limit: usize,
}

impl Pipeline {
    pub fn new(store: Arc<dyn SqlStore>, model: Arc<dyn LanguageModel>, row_limit: usize) -> Self {
        Self {
            store,
            model,
            row_limit,
        }
    }

    /// Begin a run, rejecting empty questions before any stage executes
    pub fn start(&self, question: &str) -> Result<PipelineRun<'_>, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::EmptyQuestion);
        }
        Ok(PipelineRun {
            pipeline: self,
            stage: Stage::AwaitingQuery,
            state: PipelineState::new(question),
        })
    }

    /// Run the full pipeline and collect the three stage updates in order
    pub async fn run(&self, question: &str) -> Result<Vec<StageUpdate>, PipelineError> {
        let mut run = self.start(question)?;
        let mut updates = Vec::with_capacity(3);
        while let Some(update) = run.advance().await? {
            updates.push(update);
        }
        Ok(updates)
    }
}

/// One in-flight question, suspended between stages.
///
/// `advance` performs exactly one stage's external call and yields the
/// update that stage contributed, or `None` once done. A failed advance
/// leaves the run at its current stage; callers are expected to abandon
/// the run rather than re-drive it.
pub struct PipelineRun<'a> {
    pipeline: &'a Pipeline,
    stage: Stage,
    state: PipelineState,
}

impl PipelineRun<'_> {
    /// Current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Accumulated state so far
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Execute the next stage and return its update
    pub async fn advance(&mut self) -> Result<Option<StageUpdate>, PipelineError> {
        let pipeline = self.pipeline;
        let (update, next) = match self.stage {
            Stage::AwaitingQuery => {
                let query = stages::write_query(
                    &self.state.question,
                    pipeline.store.as_ref(),
                    pipeline.model.as_ref(),
                    pipeline.row_limit,
                )
                .await?;
                (StageUpdate::WriteQuery { query }, Stage::AwaitingResult)
            }
            Stage::AwaitingResult => {
                let query = self
                    .state
                    .query
                    .clone()
                    .ok_or(StateError::FieldNotSet("query"))?;
                let result = stages::execute_query(&query, pipeline.store.as_ref()).await;
                (StageUpdate::ExecuteQuery { result }, Stage::AwaitingAnswer)
            }
            Stage::AwaitingAnswer => {
                let query = self
                    .state
                    .query
                    .clone()
                    .ok_or(StateError::FieldNotSet("query"))?;
                let result = self
                    .state
                    .result
                    .clone()
                    .ok_or(StateError::FieldNotSet("result"))?;
                let answer = stages::generate_answer(
                    &self.state.question,
                    &query,
                    &result,
                    pipeline.model.as_ref(),
                )
                .await?;
                (StageUpdate::GenerateAnswer { answer }, Stage::Done)
            }
            Stage::Done => return Ok(None),
        };

        self.state.apply(&update)?;
        self.stage = next;
        tracing::debug!(stage = update.stage_name(), "stage completed");
        Ok(Some(update))
    }
}
