mod catalog;
mod error;
mod metrics;
mod passes;
mod rules;
mod settings;
mod store;
mod text;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;

use catalog::Catalog;
use rules::RuleSet;
use settings::Settings;
use store::{JsonFile, TreeSink, TreeSource};

#[derive(Parser)]
#[command(name = "catalog_normalizer", about = "Product catalog cleanup passes")]
struct Cli {
    /// Catalog JSON to rewrite (default from configuration)
    #[arg(long, global = true)]
    file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Complete dangling descriptions, move sizes out of color, strip bullets
    Perfect,
    /// Clean list items, dedupe sizing, flatten and reclassify color/cleanup
    Polish,
    /// Apply overrides, dedupe every list, final sizing fail-safe
    Scrub,
    /// Complete lead-in application items and write the review report
    LeadIn,
    /// Apply the reviewed patch list
    Patch,
    /// Refill emptied lists from the backup, snapshotting first
    Restore,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load configuration")?;
    if let Some(file) = cli.file {
        settings.catalog_path = file;
    }
    let catalog_file = JsonFile::new(&settings.catalog_path);
    let rules = RuleSet::default();

    info!(path = %catalog_file.path().display(), "loading catalog");
    let mut catalog = Catalog::new(catalog_file.load()?);

    let summary = match cli.command {
        Commands::Perfect => passes::perfect(&mut catalog, &rules, &settings.vocabulary),
        Commands::Polish => passes::polish(&mut catalog, &rules, &settings.vocabulary),
        Commands::Scrub => passes::scrub(&mut catalog, &settings.vocabulary, &settings.overrides),
        Commands::LeadIn => {
            let (mut summary, entries) =
                passes::lead_in(&mut catalog, &rules, &settings.leadin_fields);
            let report = JsonFile::new(&settings.leadin_report_path);
            report.write(&entries)?;
            summary.note(format!("review report: {}", report.path().display()));
            summary
        }
        Commands::Patch => {
            let source = JsonFile::new(&settings.patch_path);
            info!(path = %source.path().display(), "loading patch list");
            let entries = passes::patch::parse_entries(source.load_array("patch entries")?);
            passes::apply_patches(&mut catalog, &entries)
        }
        Commands::Restore => {
            let backup = JsonFile::new(&settings.backup_path);
            info!(path = %backup.path().display(), "loading backup");
            let records = backup.load_array("backup records")?;
            let snapshot = JsonFile::new(store::snapshot_path(
                &settings.snapshot_dir,
                &settings.catalog_path,
                "before_restore",
                Local::now(),
            ));
            let mut summary = passes::restore_backup(
                &mut catalog,
                &records,
                &settings.restore_fields,
                &snapshot,
            )?;
            summary.note(format!("snapshot saved: {}", snapshot.path().display()));
            summary
        }
    };

    catalog_file.persist(catalog.root())?;
    println!("Updated file: {}\n", catalog_file.path().display());
    summary.print();

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}
