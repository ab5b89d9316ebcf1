//! Club-wide concepts shared by memberships and rentals.

mod season;

pub use season::Season;
