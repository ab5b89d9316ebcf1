//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and persistence. Adapters implement these ports.
//!
//! - `MemberRepository` - users and membership periods
//! - `FacilityRepository` - catalog, pricing rules, atomic rent/free
//! - `WaitingListRepository` - per-facility-type queues
//! - `PaymentRepository` - payments for membership periods and rentals
//! - `SeasonRepository` - season lookup

mod facility_repository;
mod member_repository;
mod payment_repository;
mod season_repository;
mod waiting_list_repository;

pub use facility_repository::FacilityRepository;
pub use member_repository::{MemberRepository, NewMembershipPeriod};
pub use payment_repository::PaymentRepository;
pub use season_repository::SeasonRepository;
pub use waiting_list_repository::WaitingListRepository;
