//! chime-store — [`JobStore`](chime_core::JobStore) backends.
//!
//! Two implementations of the same whole-set load/save contract:
//!
//! | Backend       | Storage                                    |
//! |---------------|--------------------------------------------|
//! | [`JsonStore`]   | Pretty-printed JSON file, atomic rename  |
//! | [`SqliteStore`] | SQLite `jobs` table, whole-set replace   |

pub mod json;
pub mod sqlite;

pub use json::JsonStore;
pub use sqlite::SqliteStore;
