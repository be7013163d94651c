use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use lookup_bench::{
    run_benchmark, AppendMode, BenchConfig, BenchReport, CampaignEnd, KeyMode, KeyOrder,
    MissPolicy, QueryLine, StoreKind,
};
use tracing::debug;

/// Compare an unbalanced BST against a linked list on hit and miss lookups.
///
/// Values not given on the command line are prompted for, unless `--batch`.
#[derive(Debug, Parser)]
#[command(name = "lookup-bench", version)]
struct Args {
    /// Number of records, keyed 1..=KEYS
    #[arg(short = 'k', long)]
    keys: Option<usize>,

    /// Random searches per campaign
    #[arg(short = 'n', long)]
    searches: Option<usize>,

    /// Key order: S (sorted) or N (not sorted)
    #[arg(short = 'o', long, value_parser = parse_order)]
    order: Option<KeyOrder>,

    /// Seed for generation and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Length of each random payload string
    #[arg(long, default_value_t = lookup_bench::record::DEFAULT_PAYLOAD_LEN)]
    payload_len: usize,

    /// Draw keys from 1..=KEYS with replacement instead of a permutation
    #[arg(long)]
    with_replacement: bool,

    /// Load the list by walking to its last node on every insert
    #[arg(long)]
    scan_append: bool,

    #[arg(long, default_value_t = 1)]
    aux_min: u32,

    #[arg(long, default_value_t = 100)]
    aux_max: u32,

    /// Missing-key campaign termination
    #[arg(long, value_enum, default_value_t = PolicyArg::Strict)]
    miss_policy: PolicyArg,

    /// Per-query budget in seconds, for `--miss-policy budgeted`
    #[arg(long, default_value_t = 1.0)]
    budget_secs: f64,

    /// Cap on missing-key draws per requested sample
    #[arg(long, default_value_t = lookup_bench::workload::DEFAULT_MAX_DRAWS_PER_SAMPLE)]
    max_draws_per_sample: u64,

    #[arg(long, value_enum, default_value_t = StoresArg::Both)]
    stores: StoresArg,

    /// Write the generated records here, one `key auxiliary payload` per line
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Print totals only, not one line per query
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Never prompt; missing values are an error
    #[arg(long)]
    batch: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum PolicyArg {
    Strict,
    Budgeted,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StoresArg {
    Bst,
    Sequential,
    Both,
}

fn parse_order(s: &str) -> std::result::Result<KeyOrder, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "s" | "sorted" | "ascending" => Ok(KeyOrder::Ascending),
        "n" | "shuffled" | "random" => Ok(KeyOrder::Shuffled),
        other => Err(format!("expected S or N, got {other:?}")),
    }
}

fn parse_count(s: &str) -> std::result::Result<usize, String> {
    match usize::from_str(s) {
        Ok(0) => Err("must be positive".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("lookup-bench: error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    debug!(?config, "configuration");

    let report = run_benchmark(&config).context("benchmark failed")?;
    let mut out = io::stdout().lock();
    write_report(&mut out, &report, args.quiet)?;
    out.flush()?;
    Ok(())
}

fn build_config(args: &Args) -> Result<BenchConfig> {
    let mut input = io::stdin().lock();

    let keys = match args.keys {
        Some(k) => k,
        None => ask(args.batch, &mut input, "Number of keys: ", parse_count)?,
    };
    let searches = match args.searches {
        Some(n) => n,
        None => ask(args.batch, &mut input, "Number of random searches: ", parse_count)?,
    };
    let order = match args.order {
        Some(o) => o,
        None => ask(args.batch, &mut input, "Sorted (S) or not sorted (N): ", parse_order)?,
    };

    if args.aux_min > args.aux_max {
        bail!("--aux-min {} is greater than --aux-max {}", args.aux_min, args.aux_max);
    }
    let miss_policy = match args.miss_policy {
        PolicyArg::Strict => MissPolicy::StrictCount,
        PolicyArg::Budgeted => MissPolicy::TimeBudgeted {
            per_query: Duration::try_from_secs_f64(args.budget_secs)
                .with_context(|| format!("invalid --budget-secs {}", args.budget_secs))?,
        },
    };
    let stores = match args.stores {
        StoresArg::Bst => StoreKind::Bst,
        StoresArg::Sequential => StoreKind::Sequential,
        StoresArg::Both => StoreKind::Both,
    };

    let config = BenchConfig {
        keys,
        searches,
        order,
        key_mode: if args.with_replacement {
            KeyMode::WithReplacement
        } else {
            KeyMode::Permutation
        },
        append_mode: if args.scan_append {
            AppendMode::Scan
        } else {
            AppendMode::Tail
        },
        payload_len: args.payload_len,
        aux_range: args.aux_min..=args.aux_max,
        seed: args.seed,
        miss_policy,
        max_draws_per_sample: args.max_draws_per_sample,
        stores,
        data_file: args.data_file.clone(),
    };
    config.validate()?;
    Ok(config)
}

fn ask<T, R, F>(batch: bool, input: &mut R, prompt: &str, parse: F) -> Result<T>
where
    R: BufRead,
    F: Fn(&str) -> std::result::Result<T, String>,
{
    if batch {
        bail!("missing value for {:?} in --batch mode", prompt.trim_end_matches([':', ' ']));
    }
    loop {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("unexpected end of input");
        }
        match parse(line.trim()) {
            Ok(v) => return Ok(v),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn write_report<W: Write>(out: &mut W, report: &BenchReport, quiet: bool) -> io::Result<()> {
    write!(
        out,
        "seed {} | {} records | {:?} order",
        report.seed, report.records, report.order
    )?;
    if report.key_mode == KeyMode::WithReplacement {
        write!(out, " | keys drawn with replacement")?;
    }
    writeln!(out)?;

    for s in &report.stores {
        writeln!(out)?;
        let loaded = s.build_time.as_secs_f64();
        match s.height {
            Some(h) => writeln!(out, "== {} ({} records, height {h}, loaded in {loaded:.6}s)", s.store, s.len)?,
            None => writeln!(out, "== {} ({} records, loaded in {loaded:.6}s)", s.store, s.len)?,
        }

        if !quiet {
            writeln!(out, "existing-key searches:")?;
            for r in &s.existing {
                writeln!(out, "  {}", QueryLine(r))?;
            }
            writeln!(out, "missing-key searches:")?;
            for r in &s.missing.results {
                writeln!(out, "  {}", QueryLine(r))?;
            }
        }
        if let CampaignEnd::BudgetExceeded { key, elapsed } = s.missing.end {
            writeln!(
                out,
                "missing-key campaign abandoned: key {} took {:.6}s",
                key,
                elapsed.as_secs_f64()
            )?;
        }

        let existing = s.existing_summary();
        let missing = s.missing_summary();
        writeln!(out, "existing-key total: {:.6}s", existing.total_elapsed.as_secs_f64())?;
        writeln!(out, "missing-key total: {:.6}s", missing.total_elapsed.as_secs_f64())?;
        writeln!(out, "store total: {:.6}s", s.total_summary().total_elapsed.as_secs_f64())?;
        writeln!(out, "  existing: {existing}")?;
        writeln!(out, "  missing:  {missing}")?;
    }

    let total = report.grand_total();
    writeln!(out)?;
    writeln!(out, "grand total: {:.6}s", total.total_elapsed.as_secs_f64())?;
    writeln!(out, "  {total}")?;
    Ok(())
}
