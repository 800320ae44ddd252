//! Token endpoint server.
//!
//! Loads an [`AppConfig`], builds the token issuer it describes and serves
//! the token, JWKS and introspection endpoints over HTTP.

pub mod config;
pub mod observability;
pub mod server;

pub use crate::config::{AppConfig, LoadError};
pub use crate::server::{ServerBuilder, TollgateServer, build_app};
