pub mod connection;
pub mod ledger;
pub mod tls;

pub use connection::{connect_to_database, DatabaseConfig};
pub use ledger::{Ledger, LedgerEntry};
pub use tls::TlsMode;
