//! vhostpatch TLS Module
//!
//! Detection of the certbot-managed certificate pair that decides whether
//! the generated site is HTTPS with an HTTP redirect or HTTP only.

pub mod cert_pair;

pub use cert_pair::{CertPair, CertStatus};
