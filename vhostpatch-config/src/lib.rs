//! vhostpatch Configuration Patcher
//!
//! Marker-based, idempotent editing of an nginx site file. The file is
//! treated as text: blocks are found by their comment and `location` lines,
//! inserted before the catch-all `location / {`, and verified by counting
//! the `proxy_pass` literal.
//!
//! # Example
//!
//! ```rust,ignore
//! use vhostpatch_config::{Mode, Patcher, Silent};
//! use vhostpatch_core::SiteConfig;
//!
//! let patcher = Patcher::new(SiteConfig::default())?;
//! let report = patcher.dedup("/etc/nginx/sites-available/daterabbit".as_ref(), Mode::Apply, &mut Silent)?;
//! assert_eq!(report.final_count, 1);
//! ```

pub mod backup;
pub mod block;
pub mod document;
pub mod error;
pub mod marker;
pub mod template;
pub mod workflow;

pub use block::{BlockRemover, Removal};
pub use document::Document;
pub use error::{PatchError, PatchResult};
pub use marker::{BARE_MARKER, INDENTED_MARKER, Insertion, MarkerInserter};
pub use template::{ProxyBlock, render_site};
pub use workflow::{
    CheckReport, CountStage, DedupReport, Event, Mode, Observer, PatchOutcome, Patcher, Silent,
    WriteReport,
};
