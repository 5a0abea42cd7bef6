//! Site settings

mod loader;
mod types;

pub use loader::{ConfigLoader, SITE_ENV_VAR};
pub use types::{BackupSettings, ProxySettings, SiteConfig, TlsSettings};
