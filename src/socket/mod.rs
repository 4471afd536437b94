//! Socket handling.
//!
//! - [`connectjob`]: DNS → TCP → TLS connection flow
//! - [`client`]: the connected socket type

pub mod client;
pub mod connectjob;
