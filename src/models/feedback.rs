use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::UserId;

/// Free-text feedback a user left about the results of one query.
///
/// There is at most one record per `(user_id, query)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFeedback {
    user_id: UserId,
    query: String,
    feedback: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl SearchFeedback {
    /// Creates a feedback record.
    pub fn new(
        user_id: UserId,
        query: impl Into<String>,
        feedback: impl Into<String>,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self {
            user_id,
            query: query.into(),
            feedback: feedback.into(),
            created_at,
            updated_at,
        }
    }

    /// Returns the user who left the feedback.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the query the feedback is about.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the feedback text.
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// Returns when the feedback was first recorded.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Returns when the feedback was last overwritten.
    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}
