//! Site file workflows
//!
//! - `write`: render the whole site from scratch, no backup
//! - `patch`: back up, insert the proxy block before the catch-all
//! - `dedup`: back up, strip every proxy block, insert exactly one
//! - `check`: count proxy blocks without touching anything
//!
//! A missing catch-all marker is fatal for `dedup` and only a warning for
//! `patch`, which may run against a file that does not have its final shape
//! yet. Progress is reported through an [`Observer`] so the caller decides
//! how operators see it.

use crate::backup::backup_file;
use crate::block::BlockRemover;
use crate::document::Document;
use crate::error::PatchResult;
use crate::marker::{MarkerInserter, find_marker};
use crate::template::{ProxyBlock, render_site};
use std::path::{Path, PathBuf};
use vhostpatch_core::SiteConfig;
use vhostpatch_tls::{CertPair, CertStatus};

/// Backup tag used by `dedup`
pub const DEDUP_TAG: &str = "dedup";

/// Whether a workflow persists its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Back up and overwrite files
    #[default]
    Apply,
    /// Compute the result in memory only
    DryRun,
}

impl Mode {
    pub fn is_dry_run(self) -> bool {
        self == Mode::DryRun
    }
}

/// Point in a workflow at which the proxy blocks were counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountStage {
    /// Source document as read
    Before,
    /// After every block was removed
    AfterRemoval,
    /// Document about to be written
    Final,
}

/// Progress notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BackedUp { path: PathBuf },
    Counted { stage: CountStage, count: usize },
    Inserted { marker: &'static str },
    Certificates { status: CertStatus },
    Written { path: PathBuf, count: usize },
}

/// Receives workflow progress
pub trait Observer {
    fn on_event(&mut self, event: &Event);
}

/// Discards every event
pub struct Silent;

impl Observer for Silent {
    fn on_event(&mut self, _event: &Event) {}
}

impl Observer for Vec<Event> {
    fn on_event(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

/// Outcome of `dedup`
#[derive(Debug, Clone)]
pub struct DedupReport {
    pub backup: Option<PathBuf>,
    /// Blocks counted in the source
    pub before: usize,
    /// Regions the remover cut out
    pub removed: usize,
    /// Blocks left after removal, expected 0
    pub after_removal: usize,
    pub marker: &'static str,
    /// Blocks in the result, expected 1
    pub final_count: usize,
    pub document: Document,
}

impl DedupReport {
    pub fn is_clean(&self) -> bool {
        self.after_removal == 0 && self.final_count == 1
    }
}

/// Outcome of `patch`
#[derive(Debug, Clone)]
pub enum PatchOutcome {
    /// The block was inserted
    Inserted {
        backup: Option<PathBuf>,
        marker: &'static str,
        final_count: usize,
        document: Document,
    },
    /// No catch-all marker; nothing was written
    MarkerMissing { backup: Option<PathBuf> },
}

/// Outcome of `write`
#[derive(Debug, Clone)]
pub struct WriteReport {
    pub certs: CertStatus,
    pub count: usize,
    pub document: Document,
}

/// Outcome of `check`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub count: usize,
    pub marker: Option<&'static str>,
}

impl CheckReport {
    /// Exactly one proxy block
    pub fn is_ok(&self) -> bool {
        self.count == 1
    }
}

/// 🛠️ Runs the workflows for one site
#[derive(Debug, Clone)]
pub struct Patcher {
    site: SiteConfig,
    block: ProxyBlock,
    remover: BlockRemover,
    inserter: MarkerInserter,
}

impl Patcher {
    /// Build a patcher; the site settings are validated first
    pub fn new(site: SiteConfig) -> PatchResult<Self> {
        site.validate()?;
        let block = ProxyBlock::new(&site);
        let remover = BlockRemover::new(&block)?;
        let inserter = MarkerInserter::new(&block);
        Ok(Self {
            site,
            block,
            remover,
            inserter,
        })
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn block(&self) -> &ProxyBlock {
        &self.block
    }

    /// Strip every copy of the proxy block and insert exactly one.
    ///
    /// Counts are reported but never gate the write. The only failure after
    /// the backup is a missing marker, in which case nothing is written.
    pub fn dedup(&self, path: &Path, mode: Mode, observer: &mut dyn Observer) -> PatchResult<DedupReport> {
        let backup = self.backup(DEDUP_TAG, path, mode, observer)?;
        let source = Document::read(path)?;

        let identity = self.block.identity();
        let before = source.count(identity);
        observer.on_event(&Event::Counted { stage: CountStage::Before, count: before });

        let removal = self.remover.remove(&source);
        let after_removal = removal.document.count(identity);
        tracing::info!("🧹 Removed {} block(s), {} occurrence(s) left", removal.removed, after_removal);
        observer.on_event(&Event::Counted {
            stage: CountStage::AfterRemoval,
            count: after_removal,
        });
        if after_removal != 0 {
            tracing::warn!("⚠️ {} occurrence(s) of {:?} survived removal", after_removal, identity);
        }

        let insertion = match self.inserter.insert(&removal.document) {
            Ok(insertion) => insertion,
            Err(e) => {
                tracing::error!("❌ {} in {:?}, leaving it untouched", e, path);
                return Err(e);
            }
        };
        observer.on_event(&Event::Inserted { marker: insertion.marker });

        let final_count = insertion.document.count(identity);
        observer.on_event(&Event::Counted { stage: CountStage::Final, count: final_count });
        if final_count != 1 {
            tracing::warn!("⚠️ Expected exactly 1 {:?}, found {}; writing anyway", identity, final_count);
        }

        self.persist(path, &insertion.document, final_count, mode, observer)?;

        Ok(DedupReport {
            backup,
            before,
            removed: removal.removed,
            after_removal,
            marker: insertion.marker,
            final_count,
            document: insertion.document,
        })
    }

    /// Insert the proxy block before the catch-all route.
    ///
    /// A missing marker is not an error here; see [`PatchOutcome::MarkerMissing`].
    pub fn patch(&self, path: &Path, mode: Mode, observer: &mut dyn Observer) -> PatchResult<PatchOutcome> {
        let backup = self.backup(&self.site.name, path, mode, observer)?;
        let source = Document::read(path)?;

        let insertion = match self.inserter.insert(&source) {
            Ok(insertion) => insertion,
            Err(e) if e.is_marker_not_found() => {
                tracing::warn!("⚠️ {} in {:?}, nothing to patch", e, path);
                return Ok(PatchOutcome::MarkerMissing { backup });
            }
            Err(e) => return Err(e),
        };
        observer.on_event(&Event::Inserted { marker: insertion.marker });

        let final_count = insertion.document.count(self.block.identity());
        self.persist(path, &insertion.document, final_count, mode, observer)?;

        Ok(PatchOutcome::Inserted {
            backup,
            marker: insertion.marker,
            final_count,
            document: insertion.document,
        })
    }

    /// Render the complete site for the given certificate status
    pub fn render(&self, certs: CertStatus) -> Document {
        Document::new(render_site(&self.site, &self.block, certs))
    }

    /// Probe the certificate pair and overwrite `path` with a freshly rendered site
    pub fn write(&self, path: &Path, mode: Mode, observer: &mut dyn Observer) -> PatchResult<WriteReport> {
        let pair = CertPair::for_site(&self.site);
        let certs = pair.probe();
        observer.on_event(&Event::Certificates { status: certs });
        if !certs.is_present() {
            tracing::warn!("⚠️ Certificate pair not found at {:?}, rendering HTTP-only site", pair.cert);
        }

        let document = self.render(certs);
        let count = document.count(self.block.identity());
        self.persist(path, &document, count, mode, observer)?;

        Ok(WriteReport { certs, count, document })
    }

    /// Count proxy blocks and locate the marker
    pub fn check(&self, path: &Path) -> PatchResult<CheckReport> {
        let doc = Document::read(path)?;
        let report = CheckReport {
            count: doc.count(self.block.identity()),
            marker: find_marker(&doc),
        };
        tracing::debug!("🔍 Checked {:?}: {:?}", path, report);
        Ok(report)
    }

    fn backup(
        &self,
        tag: &str,
        path: &Path,
        mode: Mode,
        observer: &mut dyn Observer,
    ) -> PatchResult<Option<PathBuf>> {
        if mode.is_dry_run() {
            return Ok(None);
        }
        let backup = backup_file(&self.site.backup, tag, path)?;
        observer.on_event(&Event::BackedUp { path: backup.clone() });
        Ok(Some(backup))
    }

    fn persist(
        &self,
        path: &Path,
        document: &Document,
        count: usize,
        mode: Mode,
        observer: &mut dyn Observer,
    ) -> PatchResult<()> {
        if mode.is_dry_run() {
            tracing::info!("📝 Dry run, not writing {:?}", path);
            return Ok(());
        }
        document.write(path)?;
        tracing::info!("✅ Wrote {} bytes to {:?}", document.as_str().len(), path);
        observer.on_event(&Event::Written {
            path: path.to_path_buf(),
            count,
        });
        Ok(())
    }
}
