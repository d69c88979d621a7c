//! Binary snapshot persistence for the Tempus virtual clock.
//!
//! The clock engine periodically flushes a [`TimeSnapshot`] to a single
//! data file and restores it at startup. The layout is a fixed big-endian
//! record stream:
//!
//! ```text
//! [i64 total_minutes]
//! [i32 cooldown_count]
//! cooldown_count x [ u16 id_len | id UTF-8 bytes | i64 start_millis | i64 duration_millis ]
//! ```
//!
//! Only wall-clock cooldowns are persisted; the duration travels with each
//! record so restored cooldowns keep their real expiry across restarts.
//! A missing or corrupt file is never fatal: [`SnapshotStore::load_or_default`]
//! recovers to an empty snapshot and logs a warning.

pub mod snapshot;

pub use snapshot::{PersistedCooldown, SnapshotStore, StoreError, TimeSnapshot};
