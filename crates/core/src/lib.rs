//! # Turnos Core
//!
//! Domain model and scheduling rules for the clinic appointment service:
//! slot lifecycle, public reservations, weekly recurrence, patient records and
//! availability queries. Persistence is reached only through the traits in
//! [`store`]; [`memory`] provides an in-process implementation of them.

pub mod clock;
pub mod errors;
pub mod memory;
pub mod mock;
pub mod models;
pub mod services;
pub mod store;
