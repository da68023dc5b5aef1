//! Joseki-Miner: mine frequent corner sequences from a corpus of Go games.
//!
//! ## Usage
//!
//! - `joseki-miner mine games.jsonl -o joseki.json` - Mine a corpus of decoded games
//! - `joseki-miner synth --games 10000 -o games.jsonl` - Write a synthetic corpus
//! - `joseki-miner demo` - Mine a synthetic corpus and show the top sequences

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use joseki_miner::config::{Config, Criteria, ExtractParams, Metric};
use joseki_miner::constants::{
    CORNER_EXTENT, DEFAULT_BOARD_SIZE, DISTANCE_THRESHOLD, MAX_SEQUENCE_LEN, PROGRESS_EVERY,
    PRUNE_FRACTION, SUMMARY_TOP,
};
use joseki_miner::corpus::{self, Halt, JsonLines, Stats, parse_duration};
use joseki_miner::export::{ExportedTree, prune_and_export, write_json};
use joseki_miner::filter::Rejection;
use joseki_miner::synth::Synth;

/// Joseki-Miner: frequent corner sequences from recorded Go games
#[derive(Parser)]
#[command(name = "joseki-miner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine a JSON-lines corpus of decoded games into a pruned joseki tree
    Mine {
        /// Corpus file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
        /// Where to write the tree (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        opts: MineOpts,
    },
    /// Write a synthetic corpus as JSON lines
    Synth {
        #[command(flatten)]
        synth: SynthOpts,
        /// Where to write the corpus (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Mine a synthetic corpus and print the most frequent sequences
    Demo(DemoArgs),
}

#[derive(Parser)]
struct DemoArgs {
    #[command(flatten)]
    synth: SynthOpts,
    #[command(flatten)]
    opts: MineOpts,
}

#[derive(Args)]
struct SynthOpts {
    /// Number of games
    #[arg(long, default_value_t = 10_000)]
    games: usize,
    /// Random seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Maximum number of random moves added to each game
    #[arg(long, default_value_t = 0)]
    noise: usize,
}

#[derive(Args)]
struct MineOpts {
    /// Board size games must have
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,
    /// Keep handicap games
    #[arg(long)]
    allow_handicap: bool,
    /// Minimum strength of both players
    #[arg(long)]
    min_rank: Option<i32>,
    /// Maximum strength of both players
    #[arg(long)]
    max_rank: Option<i32>,
    /// Earliest game date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Latest game date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Reject games with fewer moves
    #[arg(long, default_value_t = 0)]
    min_moves: usize,
    /// Distance from a corner's last move within which a move joins it
    #[arg(long, default_value_t = DISTANCE_THRESHOLD, allow_negative_numbers = true)]
    distance: f64,
    /// Distance metric
    #[arg(long, value_enum, default_value_t = Metric::Chebyshev)]
    metric: Metric,
    /// Region, in lines from the corner, where a corner's first move may land
    #[arg(long, default_value_t = CORNER_EXTENT)]
    corner_extent: usize,
    /// Maximum moves per corner sequence
    #[arg(long, default_value_t = MAX_SEQUENCE_LEN)]
    max_len: usize,
    /// Keep the original colors instead of making every sequence start with Black
    #[arg(long)]
    no_normalize_colors: bool,
    /// Minimum share of all sequences a node needs to be exported
    #[arg(long, default_value_t = PRUNE_FRACTION)]
    prune: f64,
    /// Worker threads (defaults to the number of logical cores)
    #[arg(long)]
    workers: Option<usize>,
    /// Merge into one locked trie instead of per-worker tries
    #[arg(long)]
    shared_trie: bool,
    /// Stop pulling records after this long (e.g. 30m, 2h)
    #[arg(long, value_parser = duration_arg)]
    duration: Option<Duration>,
    /// Stop after this many records
    #[arg(long)]
    max_records: Option<usize>,
    /// Records between progress lines
    #[arg(long, default_value_t = PROGRESS_EVERY)]
    progress_every: usize,
}

fn duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration(s).ok_or_else(|| format!("invalid duration {s:?} (expected e.g. 30s, 5m, 2h)"))
}

impl MineOpts {
    fn config(&self) -> Result<Config> {
        let defaults = Config::default();
        let config = Config {
            criteria: Criteria {
                size: self.size,
                allow_handicap: self.allow_handicap,
                min_rank: self.min_rank,
                max_rank: self.max_rank,
                from: self.from,
                to: self.to,
                min_moves: self.min_moves,
            },
            extract: ExtractParams {
                distance: self.distance,
                metric: self.metric,
                corner_extent: self.corner_extent,
                max_len: self.max_len,
                normalize_colors: !self.no_normalize_colors,
            },
            prune_fraction: self.prune,
            workers: self.workers.unwrap_or(defaults.workers),
            shared_trie: self.shared_trie,
            progress_every: self.progress_every,
        };
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn halt(&self) -> Halt {
        let mut halt = Halt::new();
        if let Some(duration) = self.duration {
            halt = halt.with_deadline(duration);
        }
        if let Some(max) = self.max_records {
            halt = halt.with_max_records(max);
        }
        halt
    }
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("opening corpus {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn report(stats: &Stats, tree: &ExportedTree) {
    for reason in Rejection::ALL {
        let n = stats.rejected(reason);
        if n > 0 {
            log::info!("rejected ({reason}): {n}");
        }
    }
    log::info!(
        "overflow moves {} (ambiguous {}), exported nodes {}",
        stats.overflow,
        stats.ambiguous,
        tree.len()
    );
    for (seq, count) in tree.sequences().iter().take(SUMMARY_TOP) {
        let moves: Vec<String> = seq.iter().map(ToString::to_string).collect();
        log::info!("{count:>10}  {}", moves.join(" "));
    }
}

fn mine(input: &Path, output: Option<&Path>, opts: &MineOpts) -> Result<()> {
    let config = opts.config()?;
    let halt = opts.halt();
    let records = JsonLines::open(open_input(input)?)?;
    let (trie, stats) = corpus::run(records, &config, &halt)?;

    let tree = prune_and_export(&trie, config.prune_fraction, stats.sequences);
    report(&stats, &tree);

    let mut out = open_output(output)?;
    write_json(&tree, &mut out).context("writing joseki tree")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn synth(opts: &SynthOpts, output: Option<&Path>) -> Result<()> {
    let mut out = open_output(output)?;
    let games = Synth::new(DEFAULT_BOARD_SIZE, opts.seed).with_noise(opts.noise);
    for game in games.take(opts.games) {
        writeln!(out, "{}", game.to_json())?;
    }
    out.flush()?;
    log::info!("wrote {} synthetic games", opts.games);
    Ok(())
}

fn demo(args: &DemoArgs) -> Result<()> {
    let DemoArgs { synth, opts } = args;
    let config = opts.config()?;
    let games = Synth::new(config.criteria.size, synth.seed)
        .with_noise(synth.noise)
        .take(synth.games)
        .map(Ok);
    let (trie, stats) = corpus::run(games, &config, &opts.halt())?;
    let tree = prune_and_export(&trie, config.prune_fraction, stats.sequences);

    println!("Joseki-Miner: {} synthetic games\n", synth.games);
    println!(
        "accepted {} of {}, {} sequences, {} trie nodes, {} exported\n",
        stats.accepted,
        stats.seen,
        stats.sequences,
        trie.len(),
        tree.len()
    );
    for (seq, count) in tree.sequences().iter().take(SUMMARY_TOP) {
        let moves: Vec<String> = seq.iter().map(ToString::to_string).collect();
        let share = 100.0 * *count as f64 / tree.total.max(1) as f64;
        println!("{count:>8}  {share:5.1}%  {}", moves.join(" "));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Mine {
            input,
            output,
            opts,
        }) => mine(&input, output.as_deref(), &opts),
        Some(Commands::Synth { synth: opts, output }) => synth(&opts, output.as_deref()),
        Some(Commands::Demo(args)) => demo(&args),
        None => demo(&DemoArgs::parse_from(["joseki-miner"])),
    }
}
