//! liferec Core Library
//!
//! This crate provides the storage layer for liferec, a personal journal of
//! short "life events" kept in a single local JSON file.
//!
//! # Architecture
//!
//! - **JSON document**: the whole database (`last_id` counter plus the
//!   `records` map) is loaded into memory when the store opens
//! - **Write-through**: every mutation rewrites the full document before
//!   the call returns
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = RecordStore::open(None, &config)?;
//!
//! // Create a record
//! let fields = RecordFields::new().title("Hello").content("World");
//! let record = store.create(fields)?;
//!
//! // Look it up again
//! let same = store.read_one(&record.id.to_string());
//! ```
//!
//! # Modules
//!
//! - `store`: The record store (main entry point)
//! - `models`: Records, identifiers and validated input
//! - `persistence`: Loading and atomically saving the JSON document
//! - `error`: Typed store errors
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod store;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use models::{Database, Record, RecordFields, RecordId};
pub use store::RecordStore;
