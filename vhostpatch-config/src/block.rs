//! Block removal
//!
//! A block is recognised by its comment line and `location` opening line,
//! followed by a body without braces, the first `}` and a blank line.
//! Braces are not counted: a nested `{ }` inside the body ends the match
//! early, or prevents it when no blank line follows the inner `}`.
//! Line breaks may be `\n` or `\r\n`.

use crate::document::Document;
use crate::error::PatchResult;
use crate::template::ProxyBlock;
use regex::Regex;

/// Result of a removal pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Document with every match removed
    pub document: Document,
    /// Number of regions removed
    pub removed: usize,
}

/// 🧹 Removes every copy of a proxy block
#[derive(Debug, Clone)]
pub struct BlockRemover {
    pattern: Regex,
}

impl BlockRemover {
    /// Build a remover matching the blocks [`ProxyBlock`] produces
    pub fn new(block: &ProxyBlock) -> PatchResult<Self> {
        let source = format!(
            r"{comment}\r?\n{opening}[^}}]*\}}\r?\n\r?\n",
            comment = regex::escape(&block.comment_line()),
            opening = regex::escape(&block.opening_line()),
        );
        let pattern = Regex::new(&source)?;
        Ok(Self { pattern })
    }

    /// Remove all non-overlapping matches, scanning left to right once
    pub fn remove(&self, doc: &Document) -> Removal {
        let spans: Vec<_> = self.pattern.find_iter(doc.as_str()).map(|m| m.range()).collect();
        if spans.is_empty() {
            return Removal {
                document: doc.clone(),
                removed: 0,
            };
        }

        for span in &spans {
            tracing::debug!("🧹 Removing block at bytes {:?}", span);
        }

        let cleaned = self.pattern.replace_all(doc.as_str(), "");
        Removal {
            document: Document::new(cleaned.into_owned()),
            removed: spans.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhostpatch_core::SiteConfig;

    fn block() -> ProxyBlock {
        ProxyBlock::new(&SiteConfig::default())
    }

    const HEAD: &str = "server {\n    listen 80;\n    root /var/www/daterabbit;\n\n";
    const TAIL: &str = "    location / {\n        try_files $uri $uri/ /index.html;\n    }\n}\n";

    #[test]
    fn test_removes_every_copy() {
        let block = block();
        let remover = BlockRemover::new(&block).unwrap();
        for n in 0..4 {
            let text = format!("{}{}{}", HEAD, block.with_separator().repeat(n), TAIL);
            let result = remover.remove(&Document::new(text));
            assert_eq!(result.removed, n);
            assert_eq!(result.document.as_str(), format!("{}{}", HEAD, TAIL));
            assert_eq!(result.document.count(block.identity()), 0);
        }
    }

    #[test]
    fn test_keeps_interleaved_content() {
        let block = block();
        let remover = BlockRemover::new(&block).unwrap();
        let other = "    location /health {\n        return 200;\n    }\n\n";
        let text = format!(
            "{}{}{}{}{}",
            HEAD,
            block.with_separator(),
            other,
            block.with_separator(),
            TAIL
        );
        let result = remover.remove(&Document::new(text));
        assert_eq!(result.removed, 2);
        assert_eq!(result.document.as_str(), format!("{}{}{}", HEAD, other, TAIL));
    }

    #[test]
    fn test_block_without_blank_line_is_kept() {
        // The closing brace must be followed by an empty line.
        let block = block();
        let remover = BlockRemover::new(&block).unwrap();
        let text = format!("{}{}{}", HEAD, block.as_str(), TAIL);
        let result = remover.remove(&Document::new(text.clone()));
        assert_eq!(result.removed, 0);
        assert_eq!(result.document.as_str(), text);
    }

    #[test]
    fn test_uncommented_block_is_kept() {
        let block = block();
        let remover = BlockRemover::new(&block).unwrap();
        let bare = "    location /api/ {\n        proxy_pass http://127.0.0.1:3004;\n    }\n\n";
        let text = format!("{}{}{}", HEAD, bare, TAIL);
        let result = remover.remove(&Document::new(text.clone()));
        assert_eq!(result.removed, 0);
        assert_eq!(result.document.as_str(), text);
    }

    #[test]
    fn test_nested_braces_truncate_the_match() {
        let block = block();
        let remover = BlockRemover::new(&block).unwrap();
        let nested = "    # API proxy to NestJS backend\n    location /api/ {\n        if ($x) {\n            return 403;\n        }\n\n        proxy_pass http://127.0.0.1:3004;\n    }\n\n";
        let text = format!("{}{}{}", HEAD, nested, TAIL);
        let result = remover.remove(&Document::new(text));
        assert_eq!(result.removed, 1);
        // Only the text up to the inner brace went away.
        assert!(result.document.as_str().contains("        proxy_pass http://127.0.0.1:3004;\n    }\n\n"));
    }

    #[test]
    fn test_custom_location_is_escaped() {
        let mut site = SiteConfig::default();
        site.proxy.location = "/v1.api/".to_string();
        site.proxy.comment = "API (v1) proxy".to_string();
        let block = ProxyBlock::new(&site);
        let remover = BlockRemover::new(&block).unwrap();

        let lookalike = "    # API (v1) proxy\n    location /v1xapi/ {\n    }\n\n";
        let text = format!("{}{}{}{}", HEAD, lookalike, block.with_separator(), TAIL);
        let result = remover.remove(&Document::new(text));
        assert_eq!(result.removed, 1);
        assert!(result.document.as_str().contains(lookalike));
    }

    #[test]
    fn test_removes_crlf_block() {
        let block = block();
        let remover = BlockRemover::new(&block).unwrap();
        let head = HEAD.replace('\n', "\r\n");
        let tail = TAIL.replace('\n', "\r\n");
        let crlf_block = block.with_separator().replace('\n', "\r\n");
        let text = format!("{}{}{}", head, crlf_block, tail);

        let result = remover.remove(&Document::new(text));
        assert_eq!(result.removed, 1);
        assert_eq!(result.document.as_str(), format!("{}{}", head, tail));
    }
}
