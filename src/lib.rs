//! IT asset support desk core
//!
//! Session/role resolution, hierarchical role-scoped access control and the
//! ticket lifecycle engine behind an IT equipment support desk: clients report
//! breakdowns on their equipment, technicians drive repairs to completion and
//! admins manage users, equipment and assignments.
//!
//! This crate owns no transport or persistence: it is a library consumed by a
//! presentation layer, reaching storage through the collaborator traits in
//! [`repository`].

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
