use thiserror::Error;

/// Failures surfaced to the caller of a view operation. None of them touch local state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("You need to sign in first.")]
    Unauthenticated,
    #[error("The {0} cannot be empty.")]
    InvalidInput(&'static str),
    #[error("Only the author can delete this comment.")]
    NotAuthor,
    #[error("Request failed: {0}")]
    Transport(String),
}

/// Why an operation finished without changing anything. These are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Same request already outstanding for this post.
    InFlight,
    /// Reply target was removed locally while the request was out.
    ParentMissing,
    /// Comment panel not open, or the comment is not in it.
    NotLoaded,
    /// The user said no at the confirmation prompt.
    Declined,
    /// The view was torn down before the response arrived.
    Detached,
    /// A newer load for the same post replaced this one.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(v) => Some(v),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

pub type SyncResult<T> = Result<Outcome<T>, SyncError>;
