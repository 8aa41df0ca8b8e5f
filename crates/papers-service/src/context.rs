//! Request context carrying the authenticated user and the request deadline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use papers_core::error::AppError;
use papers_core::result::AppResult;
use papers_core::types::UserId;

/// Context for the current authenticated request.
///
/// Built by the HTTP layer from the bearer token and passed into every
/// service call, so operations know who is acting and how long they may run.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// Point after which multi-step operations stop with a timeout.
    pub deadline: Option<Instant>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context without a deadline.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            deadline: None,
            request_time: Utc::now(),
        }
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A copy whose deadline is at most `limit` from now.
    pub fn bounded(&self, limit: Duration) -> Self {
        let cap = Instant::now() + limit;
        let deadline = match self.deadline {
            Some(existing) => existing.min(cap),
            None => cap,
        };
        Self {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    /// Fail with a timeout error if the deadline has passed.
    pub fn check_deadline(&self, step: &str) -> AppResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(AppError::timeout(format!(
                "Request deadline exceeded before {step}"
            ))),
            _ => Ok(()),
        }
    }
}
