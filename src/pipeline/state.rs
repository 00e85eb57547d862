//! Pipeline run states and the per-run report

use crate::error::{ErrorKind, Result, ScribeError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Stage of one generate-and-publish run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Request accepted, nothing sent yet
    Drafting,

    /// Waiting on the content generator
    Generating,

    /// Mapping suggested names to taxonomy term ids
    Resolving,

    /// Creating or updating the post
    Publishing,

    /// Post written
    Done,

    /// Run stopped on an error
    Failed,
}

impl PipelineState {
    /// Next state on the success path
    pub fn next(&self) -> Option<PipelineState> {
        match self {
            PipelineState::Drafting => Some(PipelineState::Generating),
            PipelineState::Generating => Some(PipelineState::Resolving),
            PipelineState::Resolving => Some(PipelineState::Publishing),
            PipelineState::Publishing => Some(PipelineState::Done),
            PipelineState::Done | PipelineState::Failed => None,
        }
    }

    /// Check if a transition is legal
    ///
    /// `Failed` is reachable from every state after `Drafting` that is not
    /// already terminal.
    pub fn can_transition_to(&self, next: &PipelineState) -> bool {
        if *next == PipelineState::Failed {
            return !matches!(self, PipelineState::Drafting) && !self.is_terminal();
        }
        self.next().as_ref() == Some(next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Drafting => "drafting",
            PipelineState::Generating => "generating",
            PipelineState::Resolving => "resolving",
            PipelineState::Publishing => "publishing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        }
    }
}

/// Record of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    /// Every state the run entered, starting with `Drafting`
    pub visited: Vec<PipelineState>,
    pub failure: Option<ErrorKind>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            visited: vec![PipelineState::Drafting],
            failure: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn current(&self) -> PipelineState {
        self.visited
            .last()
            .copied()
            .unwrap_or(PipelineState::Drafting)
    }

    /// Terminal state, if the run has finished
    pub fn terminal(&self) -> Option<PipelineState> {
        Some(self.current()).filter(PipelineState::is_terminal)
    }

    /// Move to `next`, refusing illegal transitions
    pub fn advance(&mut self, next: PipelineState) -> Result<()> {
        let current = self.current();
        if !current.can_transition_to(&next) {
            return Err(ScribeError::Other(format!(
                "Invalid pipeline transition: {:?} -> {:?}",
                current, next
            )));
        }

        self.visited.push(next);
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Record a failure and enter `Failed`
    ///
    /// Finished runs keep their first outcome.
    pub fn fail(&mut self, error: &ScribeError) {
        if self.current().is_terminal() {
            return;
        }
        if self.current().can_transition_to(&PipelineState::Failed) {
            self.visited.push(PipelineState::Failed);
        }
        self.failure = Some(error.kind());
        self.finished_at = Some(Utc::now());
    }
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self::new()
    }
}
