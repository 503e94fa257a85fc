//! Per-user account records and the atomic charge/reversal operations.

pub mod dto;
pub mod handler;

pub use handler::Ledger;
