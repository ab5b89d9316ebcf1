//! Membership module - members, their yearly periods and the status lifecycle.
//!
//! # Status Lifecycle
//!
//! ```text
//!   ┌──────────┐ renew
//!   │  Active  │◄────┐
//!   └────┬─────┘─────┘
//!        │ mark_unpaid
//!        ▼
//!   ┌──────────┐  deliberate_exclusion  ┌──────────────────────┐  exclude  ┌──────────┐
//!   │  Unpaid  │───────────────────────►│ ExclusionDeliberated │──────────►│ Excluded │
//!   └──────────┘                        └──────────────────────┘           └──────────┘
//! ```

mod aggregate;
mod email;
mod errors;
mod member;
mod phone;
mod status;
mod user;

pub use aggregate::{Membership, SUGGESTED_MEMBERSHIP_FEE};
pub use email::EmailAddress;
pub use errors::MembershipError;
pub use member::{Member, MemberDetails};
pub use phone::PhoneNumber;
pub use status::{MembershipStatus, MembershipStatusKind, MembershipValidity};
pub use user::{Address, NewUser, User};
