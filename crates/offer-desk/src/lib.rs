//! Offer desk: lead intake and cash-offer valuation for residential acquisitions.

pub mod config;
pub mod error;
pub mod leads;
pub mod photos;
pub mod telemetry;
pub mod valuation;

pub use error::AppError;
