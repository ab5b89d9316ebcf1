//! Membership-specific error types.
//!
//! | Error | Kind |
//! |-------|------|
//! | InvalidState | state transition |
//! | MemberNotFound | not found |
//! | MembershipNotFound | not found |
//! | SeasonNotFound | not found |
//! | AlreadyExists | conflict |
//! | PeriodAlreadyExists | conflict |
//! | ValidationFailed | validation |
//! | Infrastructure | repository |

use crate::domain::foundation::{
    DomainError, ErrorCategory, ErrorCode, MemberId, SeasonId, ValidationError,
};

use super::MembershipStatusKind;

/// Membership-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// The requested transition is not allowed from the current status.
    InvalidState {
        current: MembershipStatusKind,
        attempted: String,
    },

    /// No member with this id.
    MemberNotFound(MemberId),

    /// The member has no membership period in the requested season.
    MembershipNotFound {
        member_id: MemberId,
        season_id: Option<SeasonId>,
    },

    /// No season with this id.
    SeasonNotFound(SeasonId),

    /// A member with the same identity already exists.
    AlreadyExists(String),

    /// The member already holds a period in the season, or the period
    /// being renewed already has a successor.
    PeriodAlreadyExists {
        member_id: MemberId,
        season_id: SeasonId,
    },

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl MembershipError {
    pub fn invalid_state(current: MembershipStatusKind, attempted: impl Into<String>) -> Self {
        MembershipError::InvalidState {
            current,
            attempted: attempted.into(),
        }
    }

    pub fn member_not_found(id: MemberId) -> Self {
        MembershipError::MemberNotFound(id)
    }

    pub fn membership_not_found(member_id: MemberId, season_id: Option<SeasonId>) -> Self {
        MembershipError::MembershipNotFound {
            member_id,
            season_id,
        }
    }

    pub fn season_not_found(id: SeasonId) -> Self {
        MembershipError::SeasonNotFound(id)
    }

    pub fn period_already_exists(member_id: MemberId, season_id: SeasonId) -> Self {
        MembershipError::PeriodAlreadyExists {
            member_id,
            season_id,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MembershipError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        MembershipError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MembershipError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            MembershipError::MemberNotFound(_) => ErrorCode::MemberNotFound,
            MembershipError::MembershipNotFound { .. } => ErrorCode::MembershipNotFound,
            MembershipError::SeasonNotFound(_) => ErrorCode::SeasonNotFound,
            MembershipError::AlreadyExists(_) => ErrorCode::MemberAlreadyExists,
            MembershipError::PeriodAlreadyExists { .. } => ErrorCode::MembershipAlreadyExists,
            MembershipError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            MembershipError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            MembershipError::InvalidState { current, attempted } => {
                format!("Cannot {} membership in {} state", attempted, current)
            }
            MembershipError::MemberNotFound(id) => format!("Member not found: {}", id),
            MembershipError::MembershipNotFound {
                member_id,
                season_id: Some(season_id),
            } => format!(
                "Member {} has no membership in season {}",
                member_id, season_id
            ),
            MembershipError::MembershipNotFound {
                member_id,
                season_id: None,
            } => format!("Member {} has no membership", member_id),
            MembershipError::SeasonNotFound(id) => format!("Season not found: {}", id),
            MembershipError::AlreadyExists(who) => format!("Member already exists: {}", who),
            MembershipError::PeriodAlreadyExists {
                member_id,
                season_id,
            } => format!(
                "Member {} already has a membership in or after season {}",
                member_id, season_id
            ),
            MembershipError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            MembershipError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for MembershipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MembershipError {}

impl From<ValidationError> for MembershipError {
    fn from(err: ValidationError) -> Self {
        MembershipError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for MembershipError {
    fn from(err: DomainError) -> Self {
        let id_detail = |key: &str| err.details.get(key).and_then(|v| v.parse::<i64>().ok());
        let member_id = id_detail("member_id").map(MemberId::new);
        let season_id = id_detail("season_id").map(SeasonId::new);

        match (err.code, member_id, season_id) {
            (ErrorCode::MemberNotFound, Some(member_id), _) => {
                MembershipError::MemberNotFound(member_id)
            }
            (ErrorCode::MembershipNotFound, Some(member_id), season_id) => {
                MembershipError::MembershipNotFound {
                    member_id,
                    season_id,
                }
            }
            (ErrorCode::SeasonNotFound, _, Some(season_id)) => {
                MembershipError::SeasonNotFound(season_id)
            }
            (ErrorCode::MembershipAlreadyExists, Some(member_id), Some(season_id)) => {
                MembershipError::PeriodAlreadyExists {
                    member_id,
                    season_id,
                }
            }
            (code, _, _) => match code.category() {
                ErrorCategory::Validation => MembershipError::ValidationFailed {
                    field: err
                        .details
                        .get("field")
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string()),
                    message: err.message,
                },
                ErrorCategory::Conflict => MembershipError::AlreadyExists(err.message),
                // Missing ids in the details leave nothing to rebuild a typed error from.
                ErrorCategory::NotFound
                | ErrorCategory::StateTransition
                | ErrorCategory::Repository => MembershipError::Infrastructure(err.to_string()),
            },
        }
    }
}

impl From<MembershipError> for DomainError {
    fn from(err: MembershipError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
