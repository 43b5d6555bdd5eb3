use super::capability::{Capability, Role};
use thiserror::Error;

/// Reasons a campus action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CampusError {
    #[error("no member with id '{0}'")]
    UnknownMember(String),

    #[error("no course with id '{0}'")]
    UnknownCourse(String),

    #[error("no review with id '{0}'")]
    UnknownReview(String),

    #[error("no category named '{0}'")]
    UnknownCategory(String),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("member '{0}' is blocked")]
    Blocked(String),

    #[error("{role} '{member}' lacks the {capability} capability")]
    PermissionDenied {
        member: String,
        role: Role,
        capability: Capability,
    },

    #[error("member '{member}' is not enrolled in course '{course}'")]
    NotEnrolled { member: String, course: String },

    #[error("member '{member}' is not the author of course '{course}'")]
    NotAuthor { member: String, course: String },

    #[error("members cannot {0} themselves")]
    SelfAction(&'static str),

    #[error("'{0}' is not an email address")]
    InvalidEmail(String),

    #[error("{0} must not be blank")]
    Blank(&'static str),
}
