//! Domain entities and the pure rules attached to them

pub mod breakdown;
pub mod equipment;
pub mod ticket;
pub mod user;
