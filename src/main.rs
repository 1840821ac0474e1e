use clap::Parser;
use foid::collectors::system::{
    collect_system, network_totals, prime, CollectOptions, SysinfoCwdResolver,
};
use foid::config::{Config, ConfigError};
use foid::sampler::{run_cycle, seed_network, CycleLimits};
use foid::state::{Dashboard, MonitorState};
use foid::ui;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use sysinfo::{System, SystemExt};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "foid")]
#[command(version, about = "Terminal system monitor dashboard")]
struct Cli {
    /// YAML config file; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    print_default_config: bool,
    /// Print one JSON dashboard per cycle instead of drawing the TUI.
    #[arg(long)]
    headless: bool,
    /// Stop after this many cycles (headless only).
    #[arg(long, requires = "headless", value_parser = clap::value_parser!(u64).range(1..))]
    cycles: Option<u64>,
    /// Seconds between cycles, overriding the config file.
    #[arg(long)]
    interval: Option<u64>,
}

enum LogTarget {
    Stderr,
    File(PathBuf),
    Off,
}

/// Everything one cycle needs: the sysinfo handle, long-lived state and limits.
struct Session {
    system: System,
    state: MonitorState,
    opts: CollectOptions,
    limits: CycleLimits,
}

impl Session {
    async fn start(cfg: &Config) -> Self {
        let mut system = System::new_all();
        prime(&mut system);
        let mut state = MonitorState::new(now_unix(), cfg.history_len);
        let (sent, recv) = network_totals(&system);
        seed_network(&mut state, sent, recv, now_secs());
        tokio::time::sleep(Duration::from_millis(cfg.warmup_ms)).await;

        Self {
            system,
            state,
            opts: CollectOptions {
                watch_dir: cfg.watch_dir_path(),
                recent_files: cfg.recent_files,
                connections_limit: cfg.connections_limit,
            },
            limits: CycleLimits {
                top_processes: cfg.top_processes,
                top_directories: cfg.top_directories,
            },
        }
    }

    fn next_dashboard(&mut self) -> Dashboard {
        let raw = collect_system(&mut self.system, &self.opts);
        let resolver = SysinfoCwdResolver::new(&self.system);
        run_cycle(&mut self.state, raw, &resolver, now_secs(), self.limits)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            init_tracing(LogTarget::Stderr);
            error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let log_target = match (cli.headless, &cfg.log_file) {
        (true, _) => LogTarget::Stderr,
        (false, Some(path)) => LogTarget::File(PathBuf::from(path)),
        (false, None) => LogTarget::Off,
    };
    init_tracing(log_target);

    info!(
        interval_secs = cfg.interval_secs,
        history_len = cfg.history_len,
        headless = cli.headless,
        "starting foid"
    );

    let mut session = Session::start(&cfg).await;
    let ticker = cycle_ticker(Duration::from_secs(cfg.interval_secs));

    let outcome = if cli.headless {
        run_headless(&mut session, ticker, cli.cycles).await
    } else {
        run_tui(&mut session, ticker).await
    };

    if let Err(err) = outcome {
        error!(error = %err, "dashboard stopped with an error");
        std::process::exit(1);
    }
    info!(cycles = session.state.cycles, "foid stopped");
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(secs) = cli.interval {
        cfg.interval_secs = secs;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn init_tracing(target: LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init(),
        LogTarget::File(path) => {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init(),
                Err(err) => {
                    init_tracing(LogTarget::Stderr);
                    error!(error = %err, path = %path.display(), "failed to open log file");
                    std::process::exit(1);
                }
            }
        }
        LogTarget::Off => {}
    }
}

fn cycle_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn run_headless(
    session: &mut Session,
    mut ticker: Interval,
    max_cycles: Option<u64>,
) -> io::Result<()> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut emitted = 0_u64;

    loop {
        tokio::select! {
            res = &mut shutdown => {
                if let Err(err) = res {
                    error!(error = %err, "failed to wait for Ctrl+C");
                }
                info!("received Ctrl+C, stopping");
                return Ok(());
            }
            _ = ticker.tick() => {
                let dashboard = session.next_dashboard();
                match serde_json::to_string(&dashboard) {
                    Ok(line) => {
                        let mut out = io::stdout().lock();
                        writeln!(out, "{line}")?;
                        out.flush()?;
                    }
                    Err(err) => {
                        warn!(error = %err, cycle = dashboard.cycle, "failed to encode dashboard");
                    }
                }
                emitted += 1;
                if max_cycles.is_some_and(|n| emitted >= n) {
                    return Ok(());
                }
            }
        }
    }
}

async fn run_tui(session: &mut Session, ticker: Interval) -> io::Result<()> {
    let mut terminal = ui::enter()?;
    let result = tui_loop(&mut terminal, session, ticker).await;
    let restored = ui::leave(&mut terminal);
    result.and(restored)
}

async fn tui_loop(
    terminal: &mut ui::Tui,
    session: &mut Session,
    mut ticker: Interval,
) -> io::Result<()> {
    let mut input = cycle_ticker(INPUT_POLL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let dashboard = session.next_dashboard();
                terminal.draw(|frame| ui::draw(frame, &dashboard))?;
            }
            _ = input.tick() => {
                if ui::quit_requested()? {
                    info!("quit key pressed");
                    return Ok(());
                }
            }
        }
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
