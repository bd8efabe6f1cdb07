//! # reverie-store
//!
//! Local durable storage for Reverie, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle wrapping a
//! `rusqlite::Connection`, plus the components built on it: the dream
//! journal ([`DreamRepository`]), the per-type daily content cache
//! ([`ContentCache`]), streak persistence ([`StreakStore`]) and the
//! change notifier UI observers subscribe to.

pub mod content_cache;
pub mod database;
pub mod dreams;
pub mod events;
pub mod kv;
pub mod migrations;
pub mod streak;

mod error;

pub use content_cache::ContentCache;
pub use database::{Database, SharedDatabase};
pub use dreams::DreamRepository;
pub use error::{Result, StoreError};
pub use events::{ChangeNotifier, StoreEvent};
pub use streak::StreakStore;
