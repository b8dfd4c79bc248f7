use crate::error::{PgmigError, Result};
use tokio_postgres::Client;
use tokio_postgres::NoTls;

/// Transport encryption mode for the database connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// No TLS encryption
    #[default]
    Disable,
    /// Require TLS encryption, verifying the server against the webpki roots
    Require,
}

impl TlsMode {
    /// Parse from PostgreSQL's sslmode parameter values
    pub fn from_sslmode(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disable" => Ok(TlsMode::Disable),
            "require" | "verify-ca" | "verify-full" => Ok(TlsMode::Require),
            other => Err(PgmigError::InvalidConnectionString(format!(
                "unsupported sslmode: {}",
                other
            ))),
        }
    }
}

/// Open a connection with the requested encryption mode and spawn its
/// driver task. The returned client is the only handle the caller needs;
/// the driver shuts down when the client is dropped.
pub async fn connect_with_tls(connection_string: &str, mode: TlsMode) -> Result<Client> {
    match mode {
        TlsMode::Disable => {
            let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
                .await
                .map_err(connect_error)?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!(error = %e, "database connection error");
                }
            });
            Ok(client)
        }
        #[cfg(feature = "tls")]
        TlsMode::Require => {
            let connector = rustls_connector();
            let with_sslmode = format!("{} sslmode=require", connection_string);
            let (client, connection) = tokio_postgres::connect(&with_sslmode, connector)
                .await
                .map_err(connect_error)?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!(error = %e, "database connection error");
                }
            });
            Ok(client)
        }
        #[cfg(not(feature = "tls"))]
        TlsMode::Require => Err(PgmigError::Configuration(
            "TLS was requested but pgmig was built without TLS support. \
             Rebuild with: cargo install pgmig --features tls"
                .to_string(),
        )),
    }
}

#[cfg(feature = "tls")]
fn rustls_connector() -> tokio_postgres_rustls::MakeRustlsConnect {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    tokio_postgres_rustls::MakeRustlsConnect::new(config)
}

fn connect_error(err: tokio_postgres::Error) -> PgmigError {
    PgmigError::DatabaseConnection {
        message: err.to_string(),
        source: err,
    }
}
