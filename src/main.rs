use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::{Path, PathBuf};

use satrot::align::{Blastn, LocalAligner, Mafft, MultiAligner, PrecomputedMsa, SmithWaterman, SwParams};
use satrot::io::fasta;
use satrot::report::{self, RunMeta};
use satrot::rotate::{RotateOpt, RotationEngine, Strategy, DEFAULT_MIN_SCORE};
use satrot::store::SequenceStore;
use satrot::verify::{self, Verdict};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "satrot", author, version, about = "Rotate circular satellite-DNA monomers into a common phase", arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Specify multiple times to increase verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbosity: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AlignerKind {
    /// Built-in Smith-Waterman
    Sw,
    /// External blastn
    Blastn,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rotate every sequence to the landmark defined by the anchor
    Rotate {
        /// Input FASTA (gaps are removed)
        input: PathBuf,
        /// Id of the anchor sequence (must be present in the input)
        #[arg(short = 'a', long = "anchor")]
        anchor: String,
        /// Output FASTA path (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Strategy::Column)]
        strategy: Strategy,
        #[arg(long, value_enum, default_value_t = AlignerKind::Sw)]
        aligner: AlignerKind,
        #[arg(long = "blastn", default_value = "blastn")]
        blastn: PathBuf,
        #[arg(long = "mafft", default_value = "mafft")]
        mafft: PathBuf,
        /// Pre-computed multiple alignment of the (oriented) sequences; skips mafft
        #[arg(long = "msa")]
        msa: Option<PathBuf>,
        #[arg(long = "match", default_value_t = 2)]
        match_score: i32,
        #[arg(long = "mismatch", default_value_t = 3)]
        mismatch_penalty: i32,
        #[arg(long = "gap-open", default_value_t = 5)]
        gap_open: i32,
        #[arg(long = "gap-ext", default_value_t = 2)]
        gap_extend: i32,
        /// Ignore alignment hits scoring below this value
        #[arg(long = "min-score", default_value_t = DEFAULT_MIN_SCORE)]
        min_score: f64,
        /// Ignore alignment hits below this percent identity
        #[arg(long = "min-identity", default_value_t = 0.0)]
        min_identity: f64,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Rotation log (.json for JSON, anything else for TSV)
        #[arg(long = "report")]
        report: Option<PathBuf>,
    },
    /// Check that every rotated record is a circular permutation of its original
    Verify {
        /// Original FASTA
        original: PathBuf,
        /// Rotated FASTA
        rotated: PathBuf,
    },
}

fn init_verbose(verbosity: u8) {
    let filter_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match level {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_verbose(cli.verbosity);
    if let Err(e) = runner(cli.command) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn runner(command: Commands) -> Result<()> {
    match command {
        Commands::Rotate {
            input,
            anchor,
            out,
            strategy,
            aligner,
            blastn,
            mafft,
            msa,
            match_score,
            mismatch_penalty,
            gap_open,
            gap_extend,
            min_score,
            min_identity,
            threads,
            report,
        } => {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .map_err(|e| anyhow::anyhow!("cannot start thread pool: {}", e))?;

            let params = SwParams {
                match_score,
                mismatch_penalty,
                gap_open,
                gap_extend,
                band_width: None,
            };
            let local: Box<dyn LocalAligner> = match aligner {
                AlignerKind::Sw => Box::new(SmithWaterman::new(params)),
                AlignerKind::Blastn => Box::new(Blastn::new(blastn)),
            };
            let multi: Option<Box<dyn MultiAligner>> = match (strategy, msa) {
                (Strategy::Pairwise, _) => None,
                (Strategy::Column, Some(path)) => Some(Box::new(PrecomputedMsa::from_file(&path)?)),
                (Strategy::Column, None) => Some(Box::new(Mafft::new(mafft, threads))),
            };
            let opt = RotateOpt { strategy, min_score, min_identity };
            run_rotate(&input, &anchor, out.as_deref(), report.as_deref(), local.as_ref(), multi.as_deref(), opt)
        }
        Commands::Verify { original, rotated } => run_verify(&original, &rotated),
    }
}

fn run_rotate(
    input: &Path,
    anchor: &str,
    out_path: Option<&Path>,
    report_path: Option<&Path>,
    local: &dyn LocalAligner,
    multi: Option<&dyn MultiAligner>,
    opt: RotateOpt,
) -> Result<()> {
    let store = SequenceStore::read_fasta(input)?;
    log::info!("{}: {} sequences loaded", input.display(), store.len());

    let mut engine = RotationEngine::new(local, opt);
    if let Some(m) = multi {
        engine = engine.with_multi(m);
    }
    let run = engine.run(&store, anchor)?;

    let mut out_box: Box<dyn Write> = if let Some(p) = out_path {
        let fh = std::fs::File::create(p)
            .map_err(|e| anyhow::anyhow!("cannot create output '{}': {}", p.display(), e))?;
        Box::new(std::io::BufWriter::new(fh))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    };
    for s in &run.sequences {
        fasta::write_record(&mut out_box, &s.label, &s.bases)?;
    }
    out_box.flush()?;

    if let Some(p) = report_path {
        let meta = RunMeta::new(Some(input), anchor, opt.strategy);
        report::write_report(p, &meta, &run)?;
        log::info!("report written to {}", p.display());
    }
    eprintln!(
        "rotated: {}\tpassed_through: {}\ttotal: {}",
        run.summary.rotated, run.summary.passed_through, run.summary.total
    );
    Ok(())
}

fn run_verify(original: &Path, rotated: &Path) -> Result<()> {
    let orig = SequenceStore::read_fasta(original)?;
    let rot = SequenceStore::read_fasta(rotated)?;
    let results = verify::verify_sets(&orig, &rot);

    let mut failed = 0usize;
    for r in &results {
        match &r.verdict {
            Verdict::Permutation { strand, offset } => {
                log::debug!("{}: permutation ({} strand, offset {})", r.id, strand, offset);
            }
            Verdict::NotPermutation => {
                failed += 1;
                log::warn!("{}: not a circular permutation of the original", r.id);
            }
            Verdict::MissingOriginal => {
                failed += 1;
                log::warn!("{}: not present in {}", r.id, original.display());
            }
        }
    }
    println!("checked: {}\tfailed: {}", results.len(), failed);
    if failed > 0 {
        anyhow::bail!("{} of {} records failed verification", failed, results.len());
    }
    Ok(())
}
