//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus a create DTO for inserts. Nothing here is ever
//! updated in place: punches, sync logs, and transfer logs are append-only.

pub mod machine;
pub mod punch;
pub mod sync_log;
pub mod transfer;
