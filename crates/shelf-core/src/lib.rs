//! Shelf Core Library
//!
//! This crate provides the client-side core of Shelf, a terminal client
//! for a public book catalog and a personal library backend.
//!
//! # Architecture
//!
//! - **Gateway**: fail-soft backend calls behind the `Backend` trait
//! - **Normalizer**: catalog and library payloads become one `BookEntry`
//! - **Membership**: the user's library keys, always a backend snapshot
//! - **Session**: guest / authenticated state with one-shot auto-login
//! - **Search**: rebuilds the displayed list from search results
//! - **Focus**: key-based cyclic navigation over the displayed list
//!
//! `LibraryContext` owns all of the above and is what a front end drives.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let gateway = HttpGateway::new(&config)?;
//! let mut ctx = LibraryContext::new(gateway);
//!
//! ctx.search_catalog("the left hand of darkness");
//! if ctx.login("reader", "secret").is_success() {
//!     ctx.toggle_membership(0);
//! }
//! ```
//!
//! # Modules
//!
//! - `context`: Client state and control flow (main entry point)
//! - `gateway`: Backend trait and HTTP implementation
//! - `wire`: Request/response schema
//! - `models`: Book entries and the displayed list
//! - `config`: Application configuration
//! - `credentials`: Saved login for auto-login

pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod focus;
pub mod gateway;
pub mod membership;
pub mod models;
pub mod normalize;
pub mod search;
pub mod session;
pub mod wire;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::Config;
pub use context::LibraryContext;
pub use credentials::{CredentialError, CredentialStore, SavedLogin};
pub use error::{GatewayError, GatewayResult};
pub use focus::{FocusNavigator, FocusPoint};
pub use gateway::{AuthReply, Backend, HttpGateway};
pub use models::{BookEntry, DisplayedBook, DisplayedBookList, Language, ListSource, Year};
pub use session::{AuthOutcome, Credentials, SessionState};
