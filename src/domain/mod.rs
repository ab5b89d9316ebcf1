//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, money, timestamps, errors)
//! - `membership` - Members, yearly membership periods and the status lifecycle
//! - `payment` - Payment state attached to membership periods and rentals
//! - `club` - Seasons
//! - `facility_rental` - Facility catalog, rentals, pricing rules and waiting lists

pub mod club;
pub mod facility_rental;
pub mod foundation;
pub mod membership;
pub mod payment;
