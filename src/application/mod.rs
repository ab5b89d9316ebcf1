//! Application layer - services orchestrating the domain over ports.
//!
//! Services own no state beyond `Arc`-shared ports, so they are cheap to
//! clone and safe to call concurrently.

mod member_management;
mod payment_management;
mod rental_management;
mod services;
mod waiting_list_management;

pub use member_management::{InitialMembership, MemberManagementService};
pub use payment_management::PaymentManagementService;
pub use rental_management::RentalManagementService;
pub use services::{ClubRepositories, ClubServices};
pub use waiting_list_management::WaitingListManagementService;
