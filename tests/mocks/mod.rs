//! Centralized mocks and fixtures for testing
//!
//! Request fixtures, settings and a scripted HTTP transport shared by the
//! integration tests.

pub mod configs;
pub mod entities;
pub mod transport;

#[allow(unused_imports)]
pub use transport::ScriptedTransport;
