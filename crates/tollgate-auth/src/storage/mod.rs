//! Storage traits for credentials and accounts.
//!
//! This module defines storage interfaces for:
//!
//! - Client credentials, looked up by the client credentials authenticator
//! - Username/password accounts
//!
//! In-memory implementations are provided for both.

pub mod account;
pub mod credential;

pub use account::{Account, AccountStore, InMemoryAccountStore};
pub use credential::{ClientCredential, ClientSecret, CredentialStore, InMemoryCredentialStore};
