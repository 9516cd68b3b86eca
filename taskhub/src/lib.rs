//! `TaskHub` — client-side synchronization engine for a server-owned task board.
//!
//! The engine keeps a locally cached, filtered, paginated view of remote
//! task and user collections consistent across logins, mutations, and
//! concurrent fetches:
//!
//! - [`session`] owns the bearer token lifecycle and its persisted form
//! - [`gateway`] translates domain operations into REST calls
//! - [`store`] mirrors the remote collections and discards stale responses
//! - [`query`] owns the filter/sort/page state and triggers fetches
//! - [`mutate`] runs create/update/delete and reconciles the store
//! - [`attachments`] admits or rejects upload candidates before any request
//! - [`access`] gates role-restricted views
//! - [`client`] wires the pieces together for a consumer

pub mod access;
pub mod attachments;
pub mod client;
pub mod config;
pub mod gateway;
pub mod mutate;
pub mod query;
pub mod session;
pub mod store;
