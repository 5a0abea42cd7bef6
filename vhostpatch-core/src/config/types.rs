//! Site settings type definitions
//!
//! These types describe the single web application whose nginx site file
//! vhostpatch generates and patches. Every section defaults to the values
//! the deployment has always used, so a settings file only needs to list
//! what differs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root settings for one site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Short application name, also used as the backup tag of `patch`
    pub name: String,

    /// Public hostname (`server_name`)
    pub server_name: String,

    /// Document root of the built web app
    pub root: String,

    /// Index file served for the root
    pub index: String,

    /// Site file written when `write` is given no path
    pub config_path: PathBuf,

    /// Proxied API location
    pub proxy: ProxySettings,

    /// Certificate locations managed by certbot
    pub tls: TlsSettings,

    /// Backup staging
    pub backup: BackupSettings,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "daterabbit".to_string(),
            server_name: "daterabbit.smartlaunchhub.com".to_string(),
            root: "/var/www/daterabbit".to_string(),
            index: "index.html".to_string(),
            config_path: PathBuf::from("/etc/nginx/sites-available/daterabbit"),
            proxy: ProxySettings::default(),
            tls: TlsSettings::default(),
            backup: BackupSettings::default(),
        }
    }
}

/// The `location` block forwarding API traffic to the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProxySettings {
    /// Location prefix, e.g. `/api/`
    pub location: String,

    /// Upstream URL for `proxy_pass`
    pub upstream: String,

    /// Comment line placed above the block; identifies it for removal
    pub comment: String,

    /// Value of `client_max_body_size`
    pub client_max_body_size: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            location: "/api/".to_string(),
            upstream: "http://127.0.0.1:3004".to_string(),
            comment: "API proxy to NestJS backend".to_string(),
            client_max_body_size: "10m".to_string(),
        }
    }
}

impl ProxySettings {
    /// Literal that occurs exactly once per proxy block.
    ///
    /// Occurrences of this string are what the workflows count before and
    /// after mutating a document.
    pub fn identity(&self) -> String {
        format!("proxy_pass {}", self.upstream)
    }
}

/// Certificate pair and the certbot include files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TlsSettings {
    /// Directory holding one sub-directory per certified host
    pub live_dir: PathBuf,

    /// Explicit certificate chain path (default: `<live_dir>/<server_name>/fullchain.pem`)
    pub cert: Option<PathBuf>,

    /// Explicit private key path (default: `<live_dir>/<server_name>/privkey.pem`)
    pub key: Option<PathBuf>,

    /// certbot's shared nginx TLS options
    pub options: PathBuf,

    /// Diffie-Hellman parameters
    pub dhparam: PathBuf,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            live_dir: PathBuf::from("/etc/letsencrypt/live"),
            cert: None,
            key: None,
            options: PathBuf::from("/etc/letsencrypt/options-ssl-nginx.conf"),
            dhparam: PathBuf::from("/etc/letsencrypt/ssl-dhparams.pem"),
        }
    }
}

/// Where `patch` and `dedup` copy the file before mutating it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackupSettings {
    /// Staging directory
    pub dir: PathBuf,

    /// File name prefix
    pub prefix: String,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/tmp"),
            prefix: "nginx".to_string(),
        }
    }
}

impl BackupSettings {
    /// Backup location for `source`: `<dir>/<prefix>-<tag>-<basename>.bak`
    pub fn path_for(&self, tag: &str, source: &Path) -> PathBuf {
        let basename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dir.join(format!("{}-{}-{}.bak", self.prefix, tag, basename))
    }
}

impl SiteConfig {
    /// Certificate chain path
    pub fn cert_path(&self) -> PathBuf {
        self.tls
            .cert
            .clone()
            .unwrap_or_else(|| self.tls.live_dir.join(&self.server_name).join("fullchain.pem"))
    }

    /// Private key path
    pub fn key_path(&self) -> PathBuf {
        self.tls
            .key
            .clone()
            .unwrap_or_else(|| self.tls.live_dir.join(&self.server_name).join("privkey.pem"))
    }

    /// Reject values that would break the generated blocks or their matching.
    pub fn validate(&self) -> Result<()> {
        let single_line = [
            ("name", self.name.as_str()),
            ("server_name", self.server_name.as_str()),
            ("root", self.root.as_str()),
            ("index", self.index.as_str()),
            ("proxy.location", self.proxy.location.as_str()),
            ("proxy.upstream", self.proxy.upstream.as_str()),
            ("proxy.comment", self.proxy.comment.as_str()),
            ("proxy.client_max_body_size", self.proxy.client_max_body_size.as_str()),
        ];

        for (field, value) in single_line {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", field)));
            }
            if value.contains(['\n', '\r']) {
                return Err(Error::Config(format!("{} must be a single line", field)));
            }
            if value.contains(['{', '}', ';']) {
                return Err(Error::Config(format!(
                    "{} must not contain '{{', '}}' or ';': {:?}",
                    field, value
                )));
            }
        }

        if !self.proxy.location.starts_with('/') {
            return Err(Error::Config(format!(
                "proxy.location must start with '/': {:?}",
                self.proxy.location
            )));
        }

        // The catch-all is the insertion anchor; proxying it would remove the anchor's meaning.
        if self.proxy.location == "/" {
            return Err(Error::Config("proxy.location must not be the catch-all '/'".to_string()));
        }

        if self.name.contains(['/', '\\']) {
            return Err(Error::Config(format!("name must not contain path separators: {:?}", self.name)));
        }

        Ok(())
    }
}
