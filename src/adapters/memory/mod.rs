//! In-memory adapters - one shared store implementing every repository port.
//!
//! `InMemoryClubStore` keeps the whole club behind a single `RwLock`, so
//! each port call is atomic. Used by tests and local runs without Postgres.

mod facilities;
mod members;
mod payments;
mod store;
mod waiting_list;

pub use store::InMemoryClubStore;

use std::sync::Arc;

use crate::application::ClubRepositories;

impl InMemoryClubStore {
    /// Hands out the store behind every port, all sharing the same state.
    pub fn repositories(&self) -> ClubRepositories {
        ClubRepositories {
            members: Arc::new(self.clone()),
            seasons: Arc::new(self.clone()),
            facilities: Arc::new(self.clone()),
            waiting_list: Arc::new(self.clone()),
            payments: Arc::new(self.clone()),
        }
    }
}
