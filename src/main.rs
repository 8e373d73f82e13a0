//! TrackPrep CLI entry point
//!
//! Pre-flight checks for batch track plotting. Nothing here runs bgzip,
//! sort or tabix; plans are printed for the workflow to execute.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use track_prep::core::{check, resolve_files, Planner, SortOrder, TabixPreset};
use track_prep::intervals::{rewrite_interval_file_if_present, DEFAULT_OUTPUT};

#[derive(Parser)]
#[command(name = "track-prep")]
#[command(about = "Pre-flight input preparation for batch track plotting")]
#[command(version)]
#[command(author = "TrackPrep Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair view windows with focus windows and clamp over-wide views
    Resolve {
        /// BED file of view windows (chrom, start, end, name, [score], [strand])
        #[arg(long)]
        view: PathBuf,
        /// BED file of focus windows (chrom, start, end, name)
        #[arg(long)]
        focus: PathBuf,
        /// Maximum rendered view width in bp
        #[arg(short = 'w', long = "max-width")]
        max_width: u64,
        /// Output TSV (optional, stdout if not specified)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Report whether a file is bgzipped and tabix-indexed
    Check {
        /// Interval file to inspect
        file: PathBuf,
    },
    /// Plan sort/bgzip/tabix steps for the GTF and every file in an intervals list
    Plan {
        /// GTF/GFF annotation file
        #[arg(short = 'g', long)]
        gtf: PathBuf,
        /// Intervals list (track file per line)
        #[arg(short = 'i', long)]
        intervals: Option<PathBuf>,
        /// Output path for the rewritten intervals list
        #[arg(short = 'o', long = "output_path", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
        /// Sort keys for BED files, e.g. "1V 2n 3n"
        #[arg(long = "bed-sort")]
        bed_sort: Option<SortOrder>,
        /// Sort keys for GFF/GTF files, e.g. "1,1;4,4n"
        #[arg(long = "gff-sort")]
        gff_sort: Option<SortOrder>,
        /// Read gzip headers to catch .gz files that are not BGZF
        #[arg(long)]
        check_header: bool,
    },
}

fn run_resolve(
    view: PathBuf,
    focus: PathBuf,
    max_width: u64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let resolution = resolve_files(&view, &focus, max_width)
        .with_context(|| format!("Failed to resolve {:?} against {:?}", view, focus))?;

    for diagnostic in &resolution.diagnostics {
        for line in diagnostic.to_string().lines() {
            warn!("{}", line);
        }
    }

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for (name, pair) in resolution.iter() {
        writeln!(
            writer,
            "{}\t{}\t{}",
            name,
            pair.view_string(),
            pair.focus_string().unwrap_or_default()
        )?;
    }
    writer.flush()?;

    let stats = &resolution.stats;
    info!(
        "Resolved {} region(s): {} view rows, {} focus rows, {} skipped, {} unmatched, {} clamped",
        resolution.len(),
        stats.view_rows,
        stats.focus_rows,
        stats.skipped,
        stats.unmatched_focus,
        stats.clamped
    );
    Ok(())
}

fn run_check(file: PathBuf) -> anyhow::Result<()> {
    let status = check(&file)?;
    println!(
        "compressed={}\tindexed={}",
        status.is_compressed, status.is_indexed
    );
    Ok(())
}

fn run_plan(
    gtf: PathBuf,
    intervals: Option<PathBuf>,
    output: PathBuf,
    planner: Planner,
) -> anyhow::Result<()> {
    let gtf_plan = planner
        .plan_with_preset(&gtf, TabixPreset::Gff)
        .with_context(|| format!("Failed to plan GTF file {:?}", gtf))?;
    println!("{}", gtf_plan);
    println!("GTF file: {}", gtf_plan.target.display());

    if let Some(intervals) = intervals {
        let Some(rewrite) = rewrite_interval_file_if_present(&intervals, &planner)
            .with_context(|| format!("Failed to plan intervals file {:?}", intervals))?
        else {
            return Ok(());
        };
        for plan in &rewrite.plans {
            println!("{}", plan);
        }

        if rewrite.updated {
            rewrite
                .write_to(&output)
                .with_context(|| format!("Failed to write {:?}", output))?;
            info!("Updated intervals file saved to: {}", output.display());
            println!("Intervals file: {}", output.display());
        } else {
            info!("No updates needed for intervals file");
            println!("Intervals file: {}", intervals.display());
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Resolve {
            view,
            focus,
            max_width,
            output,
        } => run_resolve(view, focus, max_width, output)?,

        Commands::Check { file } => run_check(file)?,

        Commands::Plan {
            gtf,
            intervals,
            output,
            bed_sort,
            gff_sort,
            check_header,
        } => {
            let mut planner = Planner::new().with_header_check(check_header);
            if let Some(order) = bed_sort {
                planner = planner.with_sort_order(TabixPreset::Bed, order);
            }
            if let Some(order) = gff_sort {
                planner = planner.with_sort_order(TabixPreset::Gff, order);
            }
            run_plan(gtf, intervals, output, planner)?;
        }
    }

    info!("Time elapsed: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
