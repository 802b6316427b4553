//! Per-task voting ledger.
//!
//! Tracks the viewer's remaining voting rights, the solutions they already
//! voted for, and the displayed vote totals. The server is authoritative:
//! after an accepted vote the remaining rights are replaced with the value
//! it returns, never decremented locally.

pub mod quick;

pub use quick::{MAX_EXACT_RIGHTS, amount_for_percentage, clamp_amount, percentage_for_amount};

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::api::{ApiError, TaskApi, UserVoteMetrics, VoteReceipt};
use crate::auth::Permissions;
use crate::error::ErrorCode;
use crate::gset::GSet;
use crate::model::Solution;

/// Why a vote button is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteBlock {
    /// No session.
    Unauthenticated,
    /// The viewer has no voting relationship with the task.
    NotApplicable,
    /// Rights are down to zero.
    Exhausted,
    /// The viewer wrote the solution.
    SelfVote,
    AlreadyVoted,
}

impl VoteBlock {
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::Unauthenticated => ErrorCode::Unauthenticated,
            Self::NotApplicable => ErrorCode::VotingNotApplicable,
            Self::Exhausted => ErrorCode::InsufficientRights,
            Self::SelfVote => ErrorCode::SelfVote,
            Self::AlreadyVoted => ErrorCode::AlreadyVoted,
        }
    }
}

impl fmt::Display for VoteBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code().message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("voting is not available for this task")]
    NotApplicable,

    #[error("vote amount must be positive")]
    ZeroAmount,

    #[error("vote of {requested} exceeds remaining rights ({remaining})")]
    InsufficientRights { requested: u64, remaining: u64 },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl LedgerError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotApplicable => ErrorCode::VotingNotApplicable,
            Self::ZeroAmount => ErrorCode::InvalidVoteAmount,
            Self::InsufficientRights { .. } => ErrorCode::InsufficientRights,
            Self::Api(err) => err.code(),
        }
    }
}

/// A vote that passed the local preconditions and may be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    pub entity_id: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Default)]
pub struct VotingLedger {
    remaining_rights: Option<u64>,
    voted: GSet<String>,
    vote_counts: HashMap<String, u64>,
}

impl VotingLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the first metrics fetch. Viewers whose permissions exclude
    /// voting get no rights regardless of what the server reported.
    #[must_use]
    pub fn from_metrics(permissions: &Permissions, metrics: &UserVoteMetrics) -> Self {
        let mut ledger = Self::new();
        ledger.set_initial_rights(initial_rights(permissions, metrics));
        ledger.absorb_voted(&metrics.voted_solution_ids);
        ledger
    }

    pub fn set_initial_rights(&mut self, rights: Option<u64>) {
        self.remaining_rights = rights;
    }

    /// Merge server-reported voted ids. The set never shrinks.
    pub fn absorb_voted(&mut self, ids: &[String]) {
        self.voted.merge(&ids.iter().cloned().collect());
    }

    /// Take displayed totals from a freshly fetched page of solutions.
    pub fn record_counts<'a>(&mut self, solutions: impl IntoIterator<Item = &'a Solution>) {
        for solution in solutions {
            self.vote_counts
                .insert(solution.id.clone(), solution.total_votes);
        }
    }

    #[must_use]
    pub const fn remaining_rights(&self) -> Option<u64> {
        self.remaining_rights
    }

    #[must_use]
    pub fn has_voted(&self, entity_id: &str) -> bool {
        self.voted.contains(entity_id)
    }

    #[must_use]
    pub fn voted(&self) -> &GSet<String> {
        &self.voted
    }

    #[must_use]
    pub fn vote_count(&self, entity_id: &str) -> Option<u64> {
        self.vote_counts.get(entity_id).copied()
    }

    /// The reason voting on `entity_id` is blocked, if it is.
    #[must_use]
    pub fn check_vote(&self, entity_id: &str, author: &str, viewer: Option<&str>) -> Option<VoteBlock> {
        let Some(viewer) = viewer else {
            return Some(VoteBlock::Unauthenticated);
        };
        match self.remaining_rights {
            None => return Some(VoteBlock::NotApplicable),
            Some(0) => return Some(VoteBlock::Exhausted),
            Some(_) => {}
        }
        if author == viewer {
            return Some(VoteBlock::SelfVote);
        }
        if self.voted.contains(entity_id) {
            return Some(VoteBlock::AlreadyVoted);
        }
        None
    }

    #[must_use]
    pub fn can_vote(&self, entity_id: &str, author: &str, viewer: Option<&str>) -> bool {
        self.check_vote(entity_id, author, viewer).is_none()
    }

    /// Check the amount against the current rights before anything is sent.
    pub fn prepare_vote(&self, entity_id: &str, amount: u64) -> Result<VoteRequest, LedgerError> {
        let remaining = self.remaining_rights.ok_or(LedgerError::NotApplicable)?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if amount > remaining {
            return Err(LedgerError::InsufficientRights {
                requested: amount,
                remaining,
            });
        }
        Ok(VoteRequest {
            entity_id: entity_id.to_string(),
            amount,
        })
    }

    /// Commit a vote the server accepted.
    pub fn confirm_vote(&mut self, entity_id: &str, amount: u64, receipt: &VoteReceipt) {
        let rights = receipt.user_vote_metrics.voting_rights;
        self.remaining_rights = Some(rights);
        self.voted.insert(entity_id.to_string());

        // Server totals for the top solutions are authoritative; anything it
        // did not report moves by the confirmed amount.
        self.record_counts(&receipt.top_solutions);
        if !receipt.top_solutions.iter().any(|s| s.id == entity_id) {
            *self.vote_counts.entry(entity_id.to_string()).or_default() += amount;
        }
        info!(entity_id, amount, remaining = rights, "vote confirmed");
    }

    /// Send a prepared vote and commit it on success. On failure the ledger
    /// is left exactly as it was.
    pub fn cast_vote(
        &mut self,
        api: &impl TaskApi,
        request: &VoteRequest,
    ) -> Result<VoteReceipt, LedgerError> {
        // Rights may have been replaced since the request was prepared.
        let request = self.prepare_vote(&request.entity_id, request.amount)?;
        debug!(entity_id = %request.entity_id, amount = request.amount, "sending vote");
        match api.vote(&request.entity_id, request.amount) {
            Ok(receipt) => {
                self.confirm_vote(&request.entity_id, request.amount, &receipt);
                Ok(receipt)
            }
            Err(err) => {
                warn!(entity_id = %request.entity_id, error = %err, "vote rejected");
                Err(err.into())
            }
        }
    }
}

/// Rights to seed the ledger with: `None` unless the viewer may vote.
#[must_use]
pub const fn initial_rights(permissions: &Permissions, metrics: &UserVoteMetrics) -> Option<u64> {
    if permissions.can_vote {
        metrics.voting_rights
    } else {
        None
    }
}
