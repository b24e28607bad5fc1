// ============================================
// src/bin/build_dataset.rs
// データセット作成ツール (CSV → JSON)
// ============================================

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use fakenewsdle::builder::{DEFAULT_FAKE_LABEL, run_filter, run_merge_drain};
use fakenewsdle::dataset::DatasetEntry;

/// Build the game dataset from labeled headline CSV files
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append a balanced batch from a real and a fake CSV, removing the used rows
    Merge {
        real_csv: PathBuf,
        fake_csv: PathBuf,
        output_json: PathBuf,
    },
    /// Convert and filter one CSV, overwriting the output JSON
    Filter {
        input_csv: PathBuf,
        /// Defaults to the input path with a .json extension
        output_json: Option<PathBuf>,
        /// Label value that marks a headline as fake
        #[arg(long, default_value = DEFAULT_FAKE_LABEL)]
        fake_label: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 引数不足も終了コード 1 にそろえる
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "dataset build failed");
            eprintln!("❌ Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    let mut rng = rand::rng();

    match command {
        Command::Merge {
            real_csv,
            fake_csv,
            output_json,
        } => {
            println!("📖 Reading {} and {}...", real_csv.display(), fake_csv.display());
            let report = run_merge_drain(&real_csv, &fake_csv, &output_json, &mut rng)?;

            println!("   Real headlines: {}", report.real_parsed);
            println!("   Fake headlines: {}", report.fake_parsed);
            println!(
                "\n⚖️  Taking {} from each file (balanced dataset)",
                report.taken
            );
            if report.created_new {
                println!("📄 Created new JSON file");
            } else {
                println!("📄 Existing records: {}", report.existing);
            }
            println!("💾 Total records in JSON: {}", report.total);
            println!(
                "   Added: {} records ({} real + {} fake)",
                report.added.len(),
                report.taken,
                report.taken
            );
            println!("\n🗑️  Removed processed records from CSV files");
            println!("   Remaining in {}: {}", real_csv.display(), report.remaining_real);
            println!("   Remaining in {}: {}", fake_csv.display(), report.remaining_fake);
            println!("\n✅ Done!");

            print_preview(&report.added)?;
        }
        Command::Filter {
            input_csv,
            output_json,
            fake_label,
        } => {
            println!("📖 Reading {}...", input_csv.display());
            let report = run_filter(&input_csv, output_json.as_deref(), &fake_label, &mut rng)?;

            println!("   Parsed headlines: {}", report.parsed);
            println!("   Blocked by filter: {}", report.blocked);
            println!(
                "💾 Wrote {} records to {}",
                report.written.len(),
                report.output.display()
            );
            println!("\n✅ Done!");

            print_preview(&report.written)?;
        }
    }

    Ok(())
}

/// 追加分の先頭3件を表示
fn print_preview(entries: &[DatasetEntry]) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    println!("\n📋 Preview of added records:");
    let preview = &entries[..entries.len().min(3)];
    println!("{}", serde_json::to_string_pretty(preview)?);
    if entries.len() > 3 {
        println!("   ... and {} more", entries.len() - 3);
    }
    Ok(())
}
