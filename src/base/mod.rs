//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): every failure the client can report
//! - [`LoadState`](loadstate::LoadState): request job states

pub mod context;
pub mod loadstate;
pub mod neterror;
