//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the club domain.

mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCategory, ErrorCode, ValidationError};
pub use ids::{
    FacilityId, FacilityTypeId, MemberId, MembershipId, MembershipNumber, PaymentId,
    PricingRuleId, RentedFacilityId, SeasonId, UserId, WaitingListEntryId,
};
pub use money::Money;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
