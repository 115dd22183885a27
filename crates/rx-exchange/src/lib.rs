//! Moderated surplus-medicine marketplace: catalog search, the listing
//! submission wizard, and the public board of approved listings.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
