//! Cosmetic stage sequence shown while an analysis request is in flight.
//!
//! Everything here is a pure transition over `&[Stage]`; the timer that drives
//! [`advance`] lives in [`crate::simulator`].

use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDef {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub id: String,
    pub label: String,
    pub status: StageStatus,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("stage plan must contain at least one stage")]
    Empty,
    #[error("duplicate stage id '{0}'")]
    DuplicateId(String),
}

/// Immutable, ordered stage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    defs: Vec<StageDef>,
}

impl StagePlan {
    pub fn new<I, S, L>(stages: I) -> Result<Self, PlanError>
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: Into<String>,
    {
        let defs: Vec<StageDef> = stages
            .into_iter()
            .map(|(id, label)| StageDef {
                id: id.into(),
                label: label.into(),
            })
            .collect();
        if defs.is_empty() {
            return Err(PlanError::Empty);
        }
        let mut seen = HashSet::new();
        for def in &defs {
            if !seen.insert(def.id.as_str()) {
                return Err(PlanError::DuplicateId(def.id.clone()));
            }
        }
        Ok(Self { defs })
    }

    /// The four stages mirroring the remote analysis pipeline.
    pub fn analysis() -> Self {
        Self {
            defs: [
                ("analyze_job", "Analyzing job description"),
                ("skill_gaps", "Identifying skill gaps"),
                ("strategy", "Planning improvement strategy"),
                ("content", "Drafting outreach messages"),
            ]
            .into_iter()
            .map(|(id, label)| StageDef {
                id: id.to_string(),
                label: label.to_string(),
            })
            .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn defs(&self) -> &[StageDef] {
        &self.defs
    }

    /// All stages pending: the "not started" configuration.
    pub fn initial(&self) -> Vec<Stage> {
        self.defs
            .iter()
            .map(|def| Stage {
                id: def.id.clone(),
                label: def.label.clone(),
                status: StageStatus::Pending,
            })
            .collect()
    }

    /// First stage in progress, the rest pending.
    pub fn start(&self) -> Vec<Stage> {
        let mut stages = self.initial();
        if let Some(first) = stages.first_mut() {
            first.status = StageStatus::InProgress;
        }
        stages
    }
}

impl Default for StagePlan {
    fn default() -> Self {
        Self::analysis()
    }
}

/// Moves the in-progress marker one stage to the right.
///
/// When the last stage is in progress, or nothing is in progress, the input is
/// returned unchanged.
pub fn advance(stages: &[Stage]) -> Vec<Stage> {
    let mut next = stages.to_vec();
    let Some(current) = current_index(stages) else {
        return next;
    };
    if current + 1 >= next.len() {
        return next;
    }
    next[current].status = StageStatus::Completed;
    next[current + 1].status = StageStatus::InProgress;
    next
}

pub fn complete_all(stages: &[Stage]) -> Vec<Stage> {
    with_status(stages, StageStatus::Completed)
}

pub fn reset(stages: &[Stage]) -> Vec<Stage> {
    with_status(stages, StageStatus::Pending)
}

fn with_status(stages: &[Stage], status: StageStatus) -> Vec<Stage> {
    stages
        .iter()
        .map(|stage| Stage {
            status,
            ..stage.clone()
        })
        .collect()
}

pub fn current_index(stages: &[Stage]) -> Option<usize> {
    stages
        .iter()
        .position(|stage| stage.status == StageStatus::InProgress)
}

pub fn completed_count(stages: &[Stage]) -> usize {
    stages
        .iter()
        .filter(|stage| stage.status == StageStatus::Completed)
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active { current: usize },
    Settled,
}

/// Classifies a stage list, or `None` if it breaks the ordering invariant:
/// all pending, all completed, or a single in-progress stage with completed
/// stages to its left and pending stages to its right.
pub fn phase(stages: &[Stage]) -> Option<Phase> {
    if stages.iter().all(|s| s.status == StageStatus::Pending) {
        return Some(Phase::Idle);
    }
    if stages.iter().all(|s| s.status == StageStatus::Completed) {
        return Some(Phase::Settled);
    }
    let current = current_index(stages)?;
    let left_done = stages[..current]
        .iter()
        .all(|s| s.status == StageStatus::Completed);
    let right_pending = stages[current + 1..]
        .iter()
        .all(|s| s.status == StageStatus::Pending);
    (left_done && right_pending).then_some(Phase::Active { current })
}
