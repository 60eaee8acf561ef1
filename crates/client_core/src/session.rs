//! Job-description input for one selected resume, and the single analysis run
//! it may trigger.

use shared::{
    domain::AnalysisId,
    protocol::{AnalysisRequest, ResumeSummary},
};
use thiserror::Error;
use tracing::info;

use crate::{
    error::RunError,
    progress::{phase, reset, Phase, Stage},
    simulator::{ProgressListener, ProgressSimulator},
    AnalysisSubmitter,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("job description must not be empty")]
    EmptyJobDescription,
    #[error("an analysis run is already in progress")]
    RunActive,
    #[error(transparent)]
    AnalysisFailed(#[from] RunError),
}

pub struct AnalysisSession {
    resume: ResumeSummary,
    job_description: String,
    job_url: Option<String>,
    running: bool,
    stages: Vec<Stage>,
    simulator: ProgressSimulator,
}

impl AnalysisSession {
    pub fn new(resume: ResumeSummary, simulator: ProgressSimulator) -> Self {
        let stages = simulator.plan().initial();
        Self {
            resume,
            job_description: String::new(),
            job_url: None,
            running: false,
            stages,
            simulator,
        }
    }

    pub fn resume(&self) -> &ResumeSummary {
        &self.resume
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = text.into();
    }

    pub fn set_job_url(&mut self, url: Option<String>) {
        self.job_url = url.filter(|value| !value.trim().is_empty());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn can_submit(&self) -> bool {
        !self.running && !self.job_description.trim().is_empty()
    }

    /// Leaves the input screen, discarding the draft. Refused while a run is active.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.running {
            return Err(SessionError::RunActive);
        }
        self.job_description.clear();
        self.job_url = None;
        self.stages = self.simulator.plan().initial();
        Ok(())
    }

    /// Issues exactly one analysis request and animates the stages while it runs.
    ///
    /// Returns the id to hand off to the result view. A failure leaves the
    /// session editable again with every stage pending; nothing is retried.
    pub async fn submit(
        &mut self,
        submitter: &dyn AnalysisSubmitter,
        listener: &mut dyn ProgressListener,
    ) -> Result<AnalysisId, SessionError> {
        if self.running {
            return Err(SessionError::RunActive);
        }
        if self.job_description.trim().is_empty() {
            return Err(SessionError::EmptyJobDescription);
        }

        let request = AnalysisRequest {
            resume_id: self.resume.id.clone(),
            job_description: self.job_description.clone(),
            job_url: self.job_url.clone(),
        };
        info!(resume_id = %request.resume_id, "starting analysis run");

        self.running = true;
        let mut tracker = RunTracker {
            running: &mut self.running,
            stages: &mut self.stages,
            forward: listener,
        };
        let created = self
            .simulator
            .run(submitter.submit_analysis(&request), &mut tracker)
            .await?;

        info!(analysis_id = %created.id, "analysis run finished");
        Ok(created.id)
    }
}

/// Mirrors emitted stages into the session and clears the running flag when
/// the run ends, including when the run future is dropped part way.
struct RunTracker<'a> {
    running: &'a mut bool,
    stages: &'a mut Vec<Stage>,
    forward: &'a mut dyn ProgressListener,
}

impl ProgressListener for RunTracker<'_> {
    fn on_stages(&mut self, stages: &[Stage]) {
        self.stages.clear();
        self.stages.extend_from_slice(stages);
        self.forward.on_stages(stages);
    }
}

impl Drop for RunTracker<'_> {
    fn drop(&mut self) {
        *self.running = false;
        if matches!(phase(self.stages.as_slice()), Some(Phase::Active { .. }) | None) {
            *self.stages = reset(self.stages.as_slice());
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
