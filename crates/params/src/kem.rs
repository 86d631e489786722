//! KEM families and their members

/// Prefix that turns a standard KEM name into its QKD-augmented variant
pub const QKD_PREFIX: &str = "qkd_";

/// A named family of related KEM parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KemFamily {
    /// Family name, also the common prefix of every member name
    pub name: &'static str,

    /// Members in ascending security level
    pub members: &'static [&'static str],
}

/// ML-KEM (FIPS 203)
pub const MLKEM: KemFamily = KemFamily {
    name: "mlkem",
    members: &["mlkem512", "mlkem768", "mlkem1024"],
};

/// BIKE
pub const BIKE: KemFamily = KemFamily {
    name: "bike",
    members: &["bikel1", "bikel3", "bikel5"],
};

/// FrodoKEM, AES and SHAKE flavours
pub const FRODO: KemFamily = KemFamily {
    name: "frodo",
    members: &[
        "frodo640aes",
        "frodo640shake",
        "frodo976aes",
        "frodo976shake",
        "frodo1344aes",
        "frodo1344shake",
    ],
};

/// HQC
pub const HQC: KemFamily = KemFamily {
    name: "hqc",
    members: &["hqc128", "hqc192", "hqc256"],
};

/// All benchmarked families, in display order
pub const KEM_FAMILIES: &[KemFamily] = &[MLKEM, BIKE, FRODO, HQC];

/// Hybrid group aliases reported by the OQS microbenchmark that duplicate a
/// pure ML-KEM entry already in the catalog
pub const HYBRID_ALIASES: &[&str] = &["SecP256r1MLKEM768", "X25519MLKEM768"];

/// Separator that marks a hybrid classical/post-quantum construction in the
/// OQS microbenchmark output (e.g. `p256_mlkem512`)
pub const HYBRID_SEPARATOR: char = '_';
