pub mod claim;
pub mod config;
pub mod error;
pub mod general;
pub mod validation;

pub use error::ValidationError;
