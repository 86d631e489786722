//! OpenSSL toolchain constants for the handshake harness

/// Name of the toolchain executable searched on `PATH`
pub const OPENSSL_BINARY: &str = "openssl";

/// Environment variables the toolchain needs, checked before any trial
pub const REQUIRED_ENV_VARS: &[&str] = &["OPENSSL_CONF", "OPENSSL_MODULES", "PATH", "LD_LIBRARY_PATH"];

/// Variable holding the OpenSSL configuration file path
pub const OPENSSL_CONF_VAR: &str = "OPENSSL_CONF";

/// Variable holding the executable search path
pub const PATH_VAR: &str = "PATH";

/// Provider module always loaded alongside the KEM provider
pub const DEFAULT_PROVIDER: &str = "default";

/// Provider module serving the standard post-quantum groups
pub const OQS_PROVIDER: &str = "oqsprovider";

/// Provider module serving the `qkd_` groups
pub const QKD_PROVIDER: &str = "qkdkemprovider";

/// Protocol version pin passed to the server
pub const TLS_VERSION_FLAG: &str = "-tls1_3";

/// Marker printed by `s_client` once the handshake has completed
pub const HANDSHAKE_MARKER: &str = "SSL handshake has read";

/// Byte fed to `s_client` so that it quits after one exchange
pub const CLIENT_QUIT_INPUT: &[u8] = b"Q";

/// Default server host
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port
pub const DEFAULT_PORT: u16 = 4433;
