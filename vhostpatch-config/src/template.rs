//! Canonical nginx text
//!
//! Every proxy block vhostpatch emits, whether inserted into an existing
//! file or written as part of a full site, comes from [`ProxyBlock`].
//! Full site files are rendered from scratch by [`render_site`], so the
//! output depends only on the settings and the certificate status.

use vhostpatch_core::SiteConfig;
use vhostpatch_tls::CertStatus;

/// Indentation of directives directly inside `server { }`
pub const INDENT: &str = "    ";

const GZIP_TYPES: &str = "text/plain text/css application/json application/javascript text/xml application/xml text/javascript";

/// 📦 The proxy `location` block for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyBlock {
    comment: String,
    location: String,
    identity: String,
    text: String,
}

impl ProxyBlock {
    pub fn new(site: &SiteConfig) -> Self {
        let proxy = &site.proxy;
        let text = format!(
            "{i}# {comment}\n\
             {i}location {location} {{\n\
             {i}{i}proxy_pass {upstream};\n\
             {i}{i}proxy_http_version 1.1;\n\
             {i}{i}proxy_set_header Upgrade $http_upgrade;\n\
             {i}{i}proxy_set_header Connection 'upgrade';\n\
             {i}{i}proxy_set_header Host $host;\n\
             {i}{i}proxy_set_header X-Real-IP $remote_addr;\n\
             {i}{i}proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;\n\
             {i}{i}proxy_set_header X-Forwarded-Proto $scheme;\n\
             {i}{i}proxy_cache_bypass $http_upgrade;\n\
             {i}{i}client_max_body_size {body};\n\
             {i}}}\n",
            i = INDENT,
            comment = proxy.comment,
            location = proxy.location,
            upstream = proxy.upstream,
            body = proxy.client_max_body_size,
        );

        Self {
            comment: proxy.comment.clone(),
            location: proxy.location.clone(),
            identity: proxy.identity(),
            text,
        }
    }

    /// Block text, ending with the closing brace line
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Block text followed by the blank line that separates it from the next block
    pub fn with_separator(&self) -> String {
        format!("{}\n", self.text)
    }

    /// Literal counted to verify how many blocks a document holds
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Leading comment line, indentation included
    pub fn comment_line(&self) -> String {
        format!("{}# {}", INDENT, self.comment)
    }

    /// `location` opening line, indentation included
    pub fn opening_line(&self) -> String {
        format!("{}location {} {{", INDENT, self.location)
    }
}

/// 🧾 Render a complete site file.
///
/// With a certificate pair the site is served over HTTPS and plain HTTP
/// requests for the host are redirected; without one a single HTTP server
/// block is produced.
pub fn render_site(site: &SiteConfig, block: &ProxyBlock, certs: CertStatus) -> String {
    match certs {
        CertStatus::Present => render_https(site, block),
        CertStatus::Absent => render_http(site, block),
    }
}

fn render_https(site: &SiteConfig, block: &ProxyBlock) -> String {
    format!(
        r#"server {{
    server_name {server_name};

    root {root};
    index {index};

{proxy_block}
    location /uploads/ {{
        alias {root}/api/uploads/;
        expires 30d;
        add_header Cache-Control "public, immutable";
    }}

    location / {{
        try_files $uri $uri/ /{index};
    }}

    location /_expo {{
        alias {root}/_expo;
        expires 1y;
        add_header Cache-Control "public, immutable";
    }}

    gzip on;
    gzip_types {gzip_types};

    listen 443 ssl; # managed by Certbot
    ssl_certificate {cert}; # managed by Certbot
    ssl_certificate_key {key}; # managed by Certbot
    include {options}; # managed by Certbot
    ssl_dhparam {dhparam}; # managed by Certbot
}}

server {{
    if ($host = {server_name}) {{
        return 301 https://$host$request_uri;
    }} # managed by Certbot

    listen 80;
    server_name {server_name};
    return 404; # managed by Certbot
}}
"#,
        server_name = site.server_name,
        root = site.root,
        index = site.index,
        proxy_block = block.as_str(),
        gzip_types = GZIP_TYPES,
        cert = site.cert_path().display(),
        key = site.key_path().display(),
        options = site.tls.options.display(),
        dhparam = site.tls.dhparam.display(),
    )
}

fn render_http(site: &SiteConfig, block: &ProxyBlock) -> String {
    format!(
        r#"server {{
    listen 80;
    server_name {server_name};

    root {root};
    index {index};

{proxy_block}
    location / {{
        try_files $uri $uri/ /{index};
    }}
}}
"#,
        server_name = site.server_name,
        root = site.root,
        index = site.index,
        proxy_block = block.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_BLOCK: &str = "    # API proxy to NestJS backend
    location /api/ {
        proxy_pass http://127.0.0.1:3004;
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection 'upgrade';
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
        proxy_cache_bypass $http_upgrade;
        client_max_body_size 10m;
    }
";

    #[test]
    fn test_default_block_text() {
        let block = ProxyBlock::new(&SiteConfig::default());
        assert_eq!(block.as_str(), DEFAULT_BLOCK);
        assert_eq!(block.with_separator(), format!("{}\n", DEFAULT_BLOCK));
        assert_eq!(block.identity(), "proxy_pass http://127.0.0.1:3004");
        assert_eq!(block.comment_line(), "    # API proxy to NestJS backend");
        assert_eq!(block.opening_line(), "    location /api/ {");
    }

    #[test]
    fn test_http_site() {
        let site = SiteConfig::default();
        let block = ProxyBlock::new(&site);
        let out = render_site(&site, &block, CertStatus::Absent);

        let expected = format!(
            "server {{\n    listen 80;\n    server_name daterabbit.smartlaunchhub.com;\n\n    root /var/www/daterabbit;\n    index index.html;\n\n{}\n    location / {{\n        try_files $uri $uri/ /index.html;\n    }}\n}}\n",
            DEFAULT_BLOCK
        );
        assert_eq!(out, expected);
        assert_eq!(out.matches("server {").count(), 1);
        assert!(!out.contains("ssl"));
        assert!(!out.contains("listen 443"));
        assert_eq!(out.matches(block.identity()).count(), 1);
    }

    #[test]
    fn test_https_site() {
        let site = SiteConfig::default();
        let block = ProxyBlock::new(&site);
        let out = render_site(&site, &block, CertStatus::Present);

        assert_eq!(out.matches("server {").count(), 2);
        assert_eq!(out.matches(block.identity()).count(), 1);
        assert!(out.contains("    listen 443 ssl; # managed by Certbot\n"));
        assert!(out.contains(
            "    ssl_certificate /etc/letsencrypt/live/daterabbit.smartlaunchhub.com/fullchain.pem; # managed by Certbot\n"
        ));
        assert!(out.contains(
            "    ssl_certificate_key /etc/letsencrypt/live/daterabbit.smartlaunchhub.com/privkey.pem; # managed by Certbot\n"
        ));
        assert!(out.contains("    include /etc/letsencrypt/options-ssl-nginx.conf; # managed by Certbot\n"));
        assert!(out.contains("    ssl_dhparam /etc/letsencrypt/ssl-dhparams.pem; # managed by Certbot\n"));
        assert!(out.contains("        alias /var/www/daterabbit/api/uploads/;\n"));
        assert!(out.contains("        alias /var/www/daterabbit/_expo;\n"));
        assert!(out.contains("        return 301 https://$host$request_uri;\n"));

        // Plain HTTP only redirects; it never serves the root.
        let (https, redirect) = out.split_once("\n}\n\nserver {").unwrap();
        assert!(https.contains("root /var/www/daterabbit;"));
        assert!(!https.contains("listen 80;"));
        assert!(redirect.contains("listen 80;"));
        assert!(!redirect.contains("root "));
    }

    #[test]
    fn test_proxy_block_precedes_catch_all() {
        let site = SiteConfig::default();
        let block = ProxyBlock::new(&site);
        for status in [CertStatus::Present, CertStatus::Absent] {
            let out = render_site(&site, &block, status);
            let proxy_at = out.find(block.identity()).unwrap();
            let catch_all_at = out.find("    location / {").unwrap();
            assert!(proxy_at < catch_all_at);
        }
    }

    #[test]
    fn test_rendering_follows_settings() {
        let mut site = SiteConfig::default();
        site.server_name = "example.com".to_string();
        site.proxy.upstream = "http://10.0.0.2:8000".to_string();
        site.proxy.client_max_body_size = "50m".to_string();
        let block = ProxyBlock::new(&site);
        let out = render_site(&site, &block, CertStatus::Present);
        assert!(out.contains("proxy_pass http://10.0.0.2:8000;"));
        assert!(out.contains("client_max_body_size 50m;"));
        assert!(out.contains("/etc/letsencrypt/live/example.com/fullchain.pem"));
        assert!(out.contains("if ($host = example.com) {"));
    }
}
