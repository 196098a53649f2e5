//! File-based storage implementations.
//!
//! Snapshots are YAML documents written atomically (temp file + rename);
//! message logs are append-only JSONL.

mod session;

pub use session::FileSessionStore;
