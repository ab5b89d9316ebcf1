//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - in-process repositories sharing one store
//! - `postgres` - sqlx repositories over the schema in `migrations/`

pub mod memory;
pub mod postgres;

pub use memory::InMemoryClubStore;
pub use postgres::{
    PostgresFacilityRepository, PostgresMemberRepository, PostgresPaymentRepository,
    PostgresSeasonRepository, PostgresWaitingListRepository,
};
