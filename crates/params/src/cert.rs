//! Certificate families used for the TLS server identity

/// A named family of certificate variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertFamily {
    /// Family name, also the subdirectory under the certificate root
    pub name: &'static str,

    /// Variants, each the file stem of a certificate set
    pub variants: &'static [&'static str],
}

/// RSA
pub const RSA: CertFamily = CertFamily {
    name: "rsa",
    variants: &["rsa_2048"],
};

/// Dilithium / ML-DSA
pub const DILITHIUM: CertFamily = CertFamily {
    name: "dilithium",
    variants: &["dilithium3"],
};

/// Falcon
pub const FALCON: CertFamily = CertFamily {
    name: "falcon",
    variants: &["falcon512"],
};

/// All certificate families, in display order
pub const CERT_FAMILIES: &[CertFamily] = &[RSA, DILITHIUM, FALCON];

/// Suffix of the server (entity) certificate file
pub const ENTITY_CERT_SUFFIX: &str = "_entity_cert.pem";

/// Suffix of the server (entity) private key file
pub const ENTITY_KEY_SUFFIX: &str = "_entity_key.pem";

/// Suffix of the root CA certificate file
pub const ROOT_CERT_SUFFIX: &str = "_root_cert.pem";

/// Default certificate root, relative to the project root
pub const DEFAULT_CERTS_DIR: &str = "certs";
