//! One-time activation tokens that grant bonus searches when redeemed.

pub mod dto;
pub mod handler;

pub use handler::Activation;
