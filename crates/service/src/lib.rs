//! shipx service
//!
//! Runs unified requests against carrier accounts: [`Connection`] drives one
//! account's map → send → parse pipeline and [`Dispatcher`] fans a request out
//! to many accounts with timeouts and fault isolation.

pub mod dispatcher;
pub mod pipeline;

pub use dispatcher::{DispatchConfig, DispatchError, DispatchTarget, Dispatcher};
pub use pipeline::Connection;
