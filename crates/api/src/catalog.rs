//! Typed view over the algorithm and certificate constants
//!
//! A [`Catalog`] is built once at start-up and handed to whoever needs it;
//! there is no ambient global. Its order is the order everything downstream
//! is enumerated and displayed in: family order first, then member order.

use std::fmt;
use std::path::{Path, PathBuf};

use qkdbench_params::cert::{self, CertFamily};
use qkdbench_params::kem::{KemFamily, QKD_PREFIX};
use qkdbench_params::{CERT_FAMILIES, KEM_FAMILIES};
use serde::Serialize;

use crate::error::{collect_missing, ConfigError};
use crate::types::Provider;

/// Selector keyword matching every entry of a catalog
pub const SELECT_ALL: &str = "all";

/// Strip the QKD prefix from an algorithm name, if present
pub fn strip_qkd_prefix(name: &str) -> &str {
    name.strip_prefix(QKD_PREFIX).unwrap_or(name)
}

/// A catalog KEM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KemRef {
    pub family: &'static str,
    pub name: &'static str,
    /// Position in catalog order
    #[serde(skip)]
    pub rank: usize,
}

impl KemRef {
    /// Standard-provider name
    pub fn standard_name(&self) -> &'static str {
        self.name
    }

    /// QKD-provider name, always `qkd_` + the standard name
    pub fn qkd_name(&self) -> String {
        format!("{QKD_PREFIX}{}", self.name)
    }

    /// TLS group name negotiated for the given provider
    pub fn group_name(&self, provider: Provider) -> String {
        match provider {
            Provider::Standard => self.name.to_string(),
            Provider::Qkd => self.qkd_name(),
        }
    }
}

impl fmt::Display for KemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// File locations of one certificate set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub root_ca: PathBuf,
}

/// A catalog certificate variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CertRef {
    pub family: &'static str,
    pub variant: &'static str,
    #[serde(skip)]
    pub rank: usize,
}

impl CertRef {
    /// Resolve the certificate, key and root CA files under `certs_root`,
    /// laid out as `<certs_root>/<family>/<variant><suffix>`
    pub fn paths(&self, certs_root: &Path) -> CertPaths {
        let stem = certs_root.join(self.family);
        let file = |suffix: &str| stem.join(format!("{}{}", self.variant, suffix));
        CertPaths {
            cert: file(cert::ENTITY_CERT_SUFFIX),
            key: file(cert::ENTITY_KEY_SUFFIX),
            root_ca: file(cert::ROOT_CERT_SUFFIX),
        }
    }
}

impl fmt::Display for CertRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variant)
    }
}

/// Immutable registry of KEM families and certificate families
#[derive(Debug, Clone)]
pub struct Catalog {
    kem_families: Vec<KemFamily>,
    cert_families: Vec<CertFamily>,
    kems: Vec<KemRef>,
    certs: Vec<CertRef>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(KEM_FAMILIES, CERT_FAMILIES)
    }
}

impl Catalog {
    /// Build a catalog from explicit family tables
    pub fn new(kem_families: &[KemFamily], cert_families: &[CertFamily]) -> Self {
        let kems = kem_families
            .iter()
            .flat_map(|fam| fam.members.iter().map(move |name| (fam.name, *name)))
            .enumerate()
            .map(|(rank, (family, name))| KemRef { family, name, rank })
            .collect();
        let certs = cert_families
            .iter()
            .flat_map(|fam| fam.variants.iter().map(move |v| (fam.name, *v)))
            .enumerate()
            .map(|(rank, (family, variant))| CertRef { family, variant, rank })
            .collect();

        Self {
            kem_families: kem_families.to_vec(),
            cert_families: cert_families.to_vec(),
            kems,
            certs,
        }
    }

    /// Every KEM, in catalog order
    pub fn kems(&self) -> &[KemRef] {
        &self.kems
    }

    /// Every certificate variant, in catalog order
    pub fn certs(&self) -> &[CertRef] {
        &self.certs
    }

    /// KEM family names, in catalog order
    pub fn kem_families(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kem_families.iter().map(|fam| fam.name)
    }

    /// Look up a KEM by its standard or QKD name
    pub fn kem(&self, name: &str) -> Result<KemRef, ConfigError> {
        let base = strip_qkd_prefix(name);
        self.kems
            .iter()
            .find(|k| k.name == base)
            .copied()
            .ok_or_else(|| ConfigError::unsupported("KEM", name))
    }

    /// Look up a certificate by variant name
    pub fn cert(&self, variant: &str) -> Result<CertRef, ConfigError> {
        self.certs
            .iter()
            .find(|c| c.variant == variant)
            .copied()
            .ok_or_else(|| ConfigError::unsupported("certificate", variant))
    }

    /// Members of a KEM family, in catalog order
    pub fn family_members(&self, family: &str) -> Result<Vec<KemRef>, ConfigError> {
        let members: Vec<KemRef> = self
            .kems
            .iter()
            .filter(|k| k.family == family)
            .copied()
            .collect();
        if members.is_empty() {
            return Err(ConfigError::unsupported("KEM family", family));
        }
        Ok(members)
    }

    /// Position of a family in catalog order
    pub fn family_rank(&self, family: &str) -> Option<usize> {
        self.kem_families.iter().position(|fam| fam.name == family)
    }

    /// Family owning an exact member name (QKD prefix allowed)
    pub fn family_of(&self, name: &str) -> Option<&'static str> {
        self.kem(name).ok().map(|k| k.family)
    }

    /// Attribute a free-form algorithm name to a family by prefix match,
    /// returning the family rank and name
    pub fn family_by_prefix(&self, name: &str) -> Option<(usize, &'static str)> {
        self.kem_families
            .iter()
            .enumerate()
            .find(|(_, fam)| name.starts_with(fam.name))
            .map(|(rank, fam)| (rank, fam.name))
    }

    /// Catalog rank of a KEM name (QKD prefix allowed)
    pub fn kem_rank(&self, name: &str) -> Option<usize> {
        self.kem(name).ok().map(|k| k.rank)
    }

    /// Resolve a comma-separated KEM selector. Each item is `all`, a family
    /// name or a member name. Every unknown item is reported at once. The
    /// result is deduplicated and in catalog order.
    pub fn select_kems(&self, selector: &str) -> Result<Vec<KemRef>, ConfigError> {
        let items = split_selector(selector);
        let unknown = collect_missing(items.iter().copied(), |item| {
            item == SELECT_ALL || self.family_rank(item).is_some() || self.kem(item).is_ok()
        });
        if !unknown.is_empty() {
            return Err(ConfigError::UnsupportedConfiguration {
                kind: "KEM",
                names: unknown,
            });
        }

        let selected = self
            .kems
            .iter()
            .filter(|k| {
                items.iter().any(|item| {
                    *item == SELECT_ALL || *item == k.family || strip_qkd_prefix(item) == k.name
                })
            })
            .copied()
            .collect();
        Ok(selected)
    }

    /// Resolve a comma-separated certificate selector (`all`, family or variant)
    pub fn select_certs(&self, selector: &str) -> Result<Vec<CertRef>, ConfigError> {
        let items = split_selector(selector);
        let unknown = collect_missing(items.iter().copied(), |item| {
            item == SELECT_ALL
                || self.cert_families.iter().any(|fam| fam.name == item)
                || self.cert(item).is_ok()
        });
        if !unknown.is_empty() {
            return Err(ConfigError::UnsupportedConfiguration {
                kind: "certificate",
                names: unknown,
            });
        }

        let selected = self
            .certs
            .iter()
            .filter(|c| {
                items
                    .iter()
                    .any(|item| *item == SELECT_ALL || *item == c.family || *item == c.variant)
            })
            .copied()
            .collect();
        Ok(selected)
    }
}

fn split_selector(selector: &str) -> Vec<&str> {
    selector
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
