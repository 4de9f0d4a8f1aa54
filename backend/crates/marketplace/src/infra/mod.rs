//! Infrastructure Layer
//!
//! Database implementations of the marketplace repositories.

pub mod postgres;

pub use postgres::PgMarketRepository;
