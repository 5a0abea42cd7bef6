//! Certificate pair detection
//!
//! 🔐 Only existence is checked; certificate contents are never read.

use std::path::{Path, PathBuf};
use vhostpatch_core::SiteConfig;

/// Presence of the certificate chain and private key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStatus {
    /// Both files exist
    Present,
    /// At least one of the files is missing
    Absent,
}

impl CertStatus {
    pub fn is_present(self) -> bool {
        self == CertStatus::Present
    }
}

/// 🗝️ Certificate chain and key locations for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPair {
    /// Full certificate chain
    pub cert: PathBuf,
    /// Private key
    pub key: PathBuf,
}

impl CertPair {
    /// Create a pair from explicit paths
    pub fn new(cert: impl AsRef<Path>, key: impl AsRef<Path>) -> Self {
        Self {
            cert: cert.as_ref().to_path_buf(),
            key: key.as_ref().to_path_buf(),
        }
    }

    /// The pair configured for a site
    pub fn for_site(site: &SiteConfig) -> Self {
        Self {
            cert: site.cert_path(),
            key: site.key_path(),
        }
    }

    /// 🔍 Probe the filesystem. Both paths must be regular files.
    pub fn probe(&self) -> CertStatus {
        let cert_ok = self.cert.is_file();
        let key_ok = self.key.is_file();
        tracing::debug!(
            "🔍 Certificate probe: {:?} exists={}, {:?} exists={}",
            self.cert,
            cert_ok,
            self.key,
            key_ok
        );

        if cert_ok && key_ok {
            CertStatus::Present
        } else {
            CertStatus::Absent
        }
    }
}
