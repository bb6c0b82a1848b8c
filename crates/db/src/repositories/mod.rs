//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod machine_repo;
pub mod punch_repo;
pub mod sync_log_repo;
pub mod transfer_repo;

pub use machine_repo::MachineRepo;
pub use punch_repo::PunchRepo;
pub use sync_log_repo::SyncLogRepo;
pub use transfer_repo::TransferRepo;
