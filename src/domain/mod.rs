pub mod error;
pub mod models;
pub mod ports;
pub mod positions;
pub mod query;
pub mod validation;
