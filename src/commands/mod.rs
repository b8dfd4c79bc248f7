pub mod init;
pub mod migrate;
pub mod status;
pub mod verify;

pub use init::execute_init;
pub use migrate::{execute_migrate, exit_code};
pub use status::execute_status;
pub use verify::execute_verify;

#[cfg(feature = "cli")]
pub use migrate::print_migrate_summary;
#[cfg(feature = "cli")]
pub use status::print_status_summary;
#[cfg(feature = "cli")]
pub use verify::print_verify_summary;
