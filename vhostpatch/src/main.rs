//! vhostpatch - generate, patch and deduplicate an nginx site file
//!
//! This is the main entry point for the vhostpatch CLI.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vhostpatch_config::{
    BARE_MARKER, CountStage, Event, Mode, Observer, PatchError, PatchOutcome, Patcher,
};
use vhostpatch_core::ConfigLoader;
use vhostpatch_tls::CertStatus;

/// vhostpatch - keep the nginx site of a web application deployable
#[derive(Parser)]
#[command(name = "vhostpatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Site settings file (TOML or JSON); defaults to $VHOSTPATCH_SITE, then the per-user file
    #[arg(short, long, global = true)]
    site: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the complete site file, HTTPS when the certificate pair exists
    Write {
        /// Site file to overwrite (default: the site's config_path)
        config: Option<PathBuf>,

        /// Print the result instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Insert the API proxy block before the catch-all location
    Patch {
        /// Site file to patch
        config: PathBuf,

        /// Print the result instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove every API proxy block and insert exactly one
    Dedup {
        /// Site file to deduplicate
        config: PathBuf,

        /// Print the result instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify the site file holds exactly one API proxy block
    Check {
        /// Site file to check
        config: PathBuf,
    },
}

/// Prints workflow progress for the operator
struct Console {
    identity: String,
    /// Dry runs keep stdout for the rendered document
    to_stderr: bool,
}

impl Console {
    fn new(patcher: &Patcher, mode: Mode) -> Self {
        Self {
            identity: patcher.block().identity().to_string(),
            to_stderr: mode.is_dry_run(),
        }
    }

    fn say(&self, line: impl AsRef<str>) {
        if self.to_stderr {
            eprintln!("{}", line.as_ref());
        } else {
            println!("{}", line.as_ref());
        }
    }
}

impl Observer for Console {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::BackedUp { path } => self.say(format!("💾 Backup saved to {}", path.display())),
            Event::Counted { stage: CountStage::Before, count } => {
                self.say(format!("🔍 Found {} '{}' occurrence(s)", count, self.identity))
            }
            Event::Counted { stage: CountStage::AfterRemoval, count } => {
                self.say(format!("🧹 After removal: {} occurrence(s)", count))
            }
            Event::Counted { stage: CountStage::Final, count } => {
                self.say(format!("📊 Final count: {}", count));
                if *count != 1 {
                    self.say(format!("⚠️ Expected exactly 1 '{}', found {}", self.identity, count));
                }
            }
            Event::Inserted { marker } => {
                self.say(format!("📍 Inserted proxy block before '{}'", marker))
            }
            Event::Certificates { status } => {
                self.say(format!("🔐 SSL cert exists: {}", status.is_present()));
                if *status == CertStatus::Absent {
                    self.say("⚠️ SSL certs not found, writing HTTP-only config");
                }
            }
            Event::Written { path, count } => self.say(format!(
                "✅ Config written to {} (proxy_pass count: {})",
                path.display(),
                count
            )),
        }
    }
}

fn mode(dry_run: bool) -> Mode {
    if dry_run { Mode::DryRun } else { Mode::Apply }
}

fn main() -> anyhow::Result<()> {
    // Usage errors exit 1; help and version still exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    // Initialize tracing on stderr; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let site = ConfigLoader::resolve(cli.site.as_deref())?;
    let patcher = Patcher::new(site)?;

    match cli.command {
        Commands::Write { config, dry_run } => {
            let path = config.unwrap_or_else(|| patcher.site().config_path.clone());
            run_write(&patcher, &path, mode(dry_run))?;
        }

        Commands::Patch { config, dry_run } => {
            run_patch(&patcher, &config, mode(dry_run))?;
        }

        Commands::Dedup { config, dry_run } => {
            run_dedup(&patcher, &config, mode(dry_run))?;
        }

        Commands::Check { config } => {
            run_check(&patcher, &config)?;
        }
    }

    Ok(())
}

fn run_write(patcher: &Patcher, path: &Path, mode: Mode) -> anyhow::Result<()> {
    tracing::info!("Writing site config: {:?}", path);
    let mut console = Console::new(patcher, mode);
    let report = patcher.write(path, mode, &mut console)?;

    if mode.is_dry_run() {
        print!("{}", report.document);
    }
    Ok(())
}

fn run_patch(patcher: &Patcher, path: &Path, mode: Mode) -> anyhow::Result<()> {
    tracing::info!("Patching site config: {:?}", path);
    let mut console = Console::new(patcher, mode);

    match patcher.patch(path, mode, &mut console)? {
        PatchOutcome::Inserted { document, .. } => {
            if mode.is_dry_run() {
                print!("{}", document);
            }
        }
        PatchOutcome::MarkerMissing { .. } => {
            // Soft failure: the file may not have its final shape yet
            console.say(format!("⚠️ WARN: Could not find '{}' block", BARE_MARKER));
        }
    }
    Ok(())
}

fn run_dedup(patcher: &Patcher, path: &Path, mode: Mode) -> anyhow::Result<()> {
    tracing::info!("Deduplicating site config: {:?}", path);
    let mut console = Console::new(patcher, mode);

    match patcher.dedup(path, mode, &mut console) {
        Ok(report) => {
            if mode.is_dry_run() {
                print!("{}", report.document);
            } else {
                console.say("✅ Deduplication complete.");
            }
            Ok(())
        }
        Err(e @ PatchError::MarkerNotFound { .. }) => {
            eprintln!("❌ ERROR: {}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn run_check(patcher: &Patcher, path: &Path) -> anyhow::Result<()> {
    let report = patcher.check(path)?;
    let identity = patcher.block().identity();

    match report.marker {
        Some(marker) => println!("📍 Catch-all marker: '{}'", marker),
        None => println!("⚠️ Catch-all marker '{}' not found", BARE_MARKER),
    }

    if report.is_ok() {
        println!("✅ '{}' occurs exactly once in {}", identity, path.display());
        Ok(())
    } else {
        eprintln!(
            "❌ '{}' occurs {} time(s) in {}, expected 1",
            identity,
            report.count,
            path.display()
        );
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_missing_path_is_usage_error() {
        let err = Cli::try_parse_from(["vhostpatch", "dedup"]).err().unwrap();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_write_path_is_optional() {
        let cli = Cli::try_parse_from(["vhostpatch", "write"]).unwrap();
        assert!(matches!(cli.command, Commands::Write { config: None, dry_run: false }));
    }
}
