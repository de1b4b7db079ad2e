mod logging;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use eth_vanity_address::{checksum_address, ChainId};
use eth_vanity_bip::{DerivationPath, DEFAULT_PATH};
use eth_vanity_cpu::parallel::DEFAULT_REPORT_EVERY;
use eth_vanity_cpu::{
    estimate_difficulty, search, MatchPredicate, Progress, SearchConfig, SearchCounters,
    SearchObserver, StopReason,
};
use eth_vanity_keystore::{
    read_store, resolve_output, write_store, AccountStore, DerivedAccount, PersistError,
};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::OsRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "eth-vanity",
    version,
    about = "Ethereum HD key files and vanity address search"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a key file with a fresh 24-word mnemonic
    New {
        /// Key file, or a directory to hold `<address>.json`
        output: PathBuf,

        /// Derivation path of the first account
        #[arg(short = 'p', long = "ckd", default_value = DEFAULT_PATH, value_parser = parse_path)]
        path: DerivationPath,
    },

    /// Derive one more account into an existing key file
    Add {
        keyfile: PathBuf,

        #[arg(short = 'p', long = "ckd", default_value = DEFAULT_PATH, value_parser = parse_path)]
        path: DerivationPath,
    },

    /// Re-derive every account in a key file from its mnemonic
    Refresh { keyfile: PathBuf },

    /// Search for key files whose address matches a pattern
    Grind(GrindArgs),

    /// Print an address in mixed-case checksum form
    Checksum {
        address: String,

        /// EIP-1191 chain id (e.g. 30 for RSK mainnet)
        #[arg(long = "chain-id")]
        chain_id: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct GrindArgs {
    /// Directory receiving one `<address>.json` per match
    output: PathBuf,

    #[arg(short = 'p', long = "ckd", default_value = DEFAULT_PATH, value_parser = parse_path)]
    path: DerivationPath,

    /// Number of matching key files to produce
    #[arg(short = 'n', long = "count", default_value_t = 1)]
    count: u64,

    /// Required start of the checksummed address, `0x` included. Case sensitive.
    #[arg(long)]
    prefix: Option<String>,

    /// Required end of the checksummed address. Case sensitive.
    #[arg(long)]
    suffix: Option<String>,

    /// Regular expression for the checksummed address. Overrides --prefix and --suffix.
    #[arg(long)]
    regexp: Option<String>,

    /// Worker threads (0 = one per core)
    #[arg(long, env = "ETH_VANITY_THREADS", default_value_t = 0)]
    threads: usize,

    /// Maximum duration to run before stopping (seconds)
    #[arg(long = "duration-secs")]
    duration_secs: Option<u64>,

    /// Log progress every N attempts
    #[arg(long = "report-every", default_value_t = DEFAULT_REPORT_EVERY)]
    report_every: u64,

    /// Give up after this many attempts
    #[arg(long = "max-attempts")]
    max_attempts: Option<u64>,
}

impl GrindArgs {
    fn predicate(&self) -> Result<MatchPredicate> {
        let predicate = MatchPredicate::new(
            self.prefix.as_deref(),
            self.suffix.as_deref(),
            self.regexp.as_deref(),
        )?;

        if predicate.pattern_str().is_none() && estimate_difficulty(&predicate).is_none() {
            bail!(
                "--prefix/--suffix can never match: addresses are `0x` followed by 40 hex digits"
            );
        }
        Ok(predicate)
    }

    fn config(&self) -> SearchConfig {
        SearchConfig {
            path: self.path.clone(),
            quota: self.count,
            workers: self.threads,
            report_every: self.report_every,
            max_attempts: self.max_attempts,
        }
    }
}

fn parse_path(s: &str) -> Result<DerivationPath, String> {
    s.parse().map_err(|e: eth_vanity_core::Error| e.to_string())
}

/// Spinner plus periodic log lines for a running grind.
struct GrindReporter {
    bar: ProgressBar,
    quota: u64,
    start: Instant,
}

impl GrindReporter {
    fn new(quota: u64) -> Result<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template("{spinner} [{elapsed_precise}] {msg}")?);
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message(format!("searching [0/{}]", quota));

        Ok(Self {
            bar,
            quota,
            start: Instant::now(),
        })
    }

    fn rate(&self, attempts: u64) -> f64 {
        attempts as f64 / self.start.elapsed().as_secs_f64().max(0.001)
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SearchObserver for GrindReporter {
    fn on_progress(&mut self, progress: Progress) {
        let rate = self.rate(progress.attempts);
        self.bar.set_message(format!(
            "{} attempts ({:.0} addr/s) [{}/{}]",
            progress.attempts, rate, progress.matches, self.quota
        ));
        self.bar.suspend(|| {
            info!(
                attempts = progress.attempts,
                matches = progress.matches,
                rate = %format!("{:.0}", rate),
                "finding key in progress"
            )
        });
    }

    fn on_match(&mut self, account: &DerivedAccount, progress: Progress) {
        self.bar.println(format!(
            "Match {}/{}: {}",
            progress.matches, self.quota, account.address_checksummed
        ));
    }
}

fn cmd_new(output: &Path, path: &DerivationPath) -> Result<PathBuf> {
    let store = AccountStore::generate(&mut OsRng, path)?;
    let account = store
        .get(&path.to_string())
        .context("new key file holds no account")?;

    let file = resolve_output(output, &account.address_checksummed);
    write_store(&store, &file).with_context(|| format!("failed to write {}", file.display()))?;

    info!(address = %account.address_checksummed, file = %file.display(), "created key file");
    println!("{}  {}", account.address_checksummed, path);
    Ok(file)
}

fn cmd_add(keyfile: &Path, path: &DerivationPath) -> Result<()> {
    let mut store =
        read_store(keyfile).with_context(|| format!("failed to read {}", keyfile.display()))?;
    let address = store.add_or_refresh_path(path)?.address_checksummed.clone();

    write_store(&store, keyfile)
        .with_context(|| format!("failed to write {}", keyfile.display()))?;

    info!(address = %address, path = %path, "added account");
    println!("{}  {}", address, path);
    Ok(())
}

fn cmd_refresh(keyfile: &Path) -> Result<()> {
    let mut store =
        read_store(keyfile).with_context(|| format!("failed to read {}", keyfile.display()))?;

    let stale = store.verify()?;
    for path in &stale {
        warn!(path = %path, "stored account does not match its derivation");
    }
    store.refresh_all()?;

    write_store(&store, keyfile)
        .with_context(|| format!("failed to write {}", keyfile.display()))?;

    info!(accounts = store.len(), repaired = stale.len(), "refreshed key file");
    for (path, account) in store.accounts() {
        println!("{}  {}", account.address_checksummed, path);
    }
    Ok(())
}

fn cmd_checksum(address: &str, chain_id: Option<u64>) -> Result<String> {
    Ok(checksum_address(address, chain_id.map(ChainId))?)
}

/// File for one grind match inside `output`.
fn persist_match(store: &AccountStore, output: &Path) -> Result<PathBuf, PersistError> {
    let address = store
        .accounts()
        .values()
        .map(|account| account.address_checksummed.as_str())
        .next()
        .unwrap_or("unnamed");

    let file = resolve_output(output, address);
    write_store(store, &file)?;
    info!(address = %address, file = %file.display(), "found a new key");
    Ok(file)
}

fn cmd_grind(args: &GrindArgs) -> Result<Vec<PathBuf>> {
    let predicate = args.predicate()?;
    let config = args.config();

    if predicate.is_empty() {
        warn!("no --prefix, --suffix or --regexp given; every address matches");
    }
    if let Some(expected) = estimate_difficulty(&predicate) {
        info!(expected_attempts = expected, "estimated difficulty");
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let stop = Arc::new(AtomicBool::new(false));
    if let Some(secs) = args.duration_secs {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            stop.store(true, Ordering::Relaxed);
        });
    }

    info!(
        path = %config.path,
        count = config.quota,
        threads = config.workers,
        output = %args.output.display(),
        "starting grind"
    );

    let counters = SearchCounters::new();
    let mut reporter = GrindReporter::new(config.quota)?;
    let mut written = Vec::new();

    let outcome = search(
        &predicate,
        &config,
        &counters,
        &stop,
        &mut reporter,
        |store: &AccountStore| {
            written.push(persist_match(store, &args.output)?);
            Ok::<_, PersistError>(())
        },
    );
    reporter.finish();
    let result = outcome?;

    let elapsed = reporter.start.elapsed().as_secs_f64();
    match result.stop {
        StopReason::QuotaReached => {}
        StopReason::Cancelled => warn!("stopped by duration limit"),
        StopReason::AttemptsExhausted => warn!("attempt budget exhausted"),
    }
    info!(
        matches = result.matches,
        attempts = result.attempts,
        seconds = %format!("{:.1}", elapsed),
        "grind finished"
    );
    Ok(written)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::New { output, path } => cmd_new(&output, &path).map(|_| ()),
        Command::Add { keyfile, path } => cmd_add(&keyfile, &path),
        Command::Refresh { keyfile } => cmd_refresh(&keyfile),
        Command::Grind(args) => cmd_grind(&args).map(|_| ()),
        Command::Checksum { address, chain_id } => {
            println!("{}", cmd_checksum(&address, chain_id)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
