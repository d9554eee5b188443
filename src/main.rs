use clap::Parser;
use color_eyre::Result;
use serde_json::Value;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use hyper_search::config::{self, SearchConfig};
use hyper_search::{HostError, SearchError, SearchHandler, SearchWidget, display_label};

/// How often the event loop wakes to fire timers and apply results
const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on draining outstanding work after input ends
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Debounced, cached search driven by lines on stdin
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Debounced, cached search: each stdin line is the current input value"
)]
struct Args {
    /// Search endpoint, queried as GET <URL>?q=<query>
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Minimum query length in characters
    #[arg(long, value_name = "N")]
    min_length: Option<usize>,

    /// Trailing debounce rate in milliseconds
    #[arg(long, value_name = "MS")]
    debounce: Option<u64>,

    /// Enable idle mode with this delay in milliseconds
    #[arg(long, value_name = "MS")]
    idle: Option<u64>,

    /// Record field to print for each result
    #[arg(long, value_name = "KEY")]
    result_key: Option<String>,
}

impl Args {
    /// Layer command-line flags over the file config
    fn apply(self, mut config: SearchConfig) -> SearchConfig {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = Some(endpoint);
        }
        if let Some(min_length) = self.min_length {
            config.min_query_length = min_length;
        }
        if let Some(rate) = self.debounce {
            config.debounce_rate = rate;
        }
        if let Some(idle_time) = self.idle {
            config.idle_enabled = true;
            config.idle_time = idle_time;
        }
        if let Some(key) = self.result_key {
            config.result_key = Some(key);
        }
        config
    }
}

/// Prints widget events to stdout
struct PrintHandler {
    result_key: Option<String>,
}

impl SearchHandler for PrintHandler {
    fn results_changed(&mut self, results: &[Value]) {
        let labels: Vec<String> = results
            .iter()
            .map(|record| display_label(record, self.result_key.as_deref()))
            .collect();
        println!("results: {}", labels.join(", "));
    }

    fn selection_changed(&mut self, record: &Value) {
        println!("selected: {}", record);
    }

    fn loading_changed(&mut self, is_loading: bool) {
        log::debug!("Loading: {}", is_loading);
    }
}

/// A parsed stdin line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Input(String),
    Select(usize),
    Clear,
    Evict(String),
    Flush,
}

impl Command {
    fn parse(line: &str) -> Result<Self, HostError> {
        let Some(command) = line.strip_prefix(':') else {
            return Ok(Command::Input(line.to_string()));
        };

        let (name, arg) = match command.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (command.trim(), ""),
        };

        match (name, arg) {
            ("select", index) => index
                .parse()
                .map(Command::Select)
                .map_err(|_| HostError::InvalidCommand(line.to_string())),
            ("clear", "") => Ok(Command::Clear),
            ("evict", query) if !query.is_empty() => Ok(Command::Evict(query.to_string())),
            ("flush", "") => Ok(Command::Flush),
            _ => Err(HostError::InvalidCommand(line.to_string())),
        }
    }
}

fn main() -> Result<()> {
    // Writes to /tmp/hyper-search-debug.log at DEBUG level
    #[cfg(debug_assertions)]
    init_debug_log();

    color_eyre::install()?;

    let config_result = config::load_config();
    if let Some(warning) = &config_result.warning {
        eprintln!("warning: {}", warning);
    }

    let args = Args::parse();
    let config = args.apply(config_result.config);
    let handler = PrintHandler {
        result_key: config.result_key.clone(),
    };

    let mut widget = SearchWidget::with_http_backend(config, Box::new(handler))?;
    let lines = spawn_stdin_reader();

    run(&mut widget, &lines)?;
    drain(&mut widget);
    widget.teardown();

    #[cfg(debug_assertions)]
    log::debug!("=== HYPER-SEARCH DEBUG SESSION ENDED ===");

    Ok(())
}

#[cfg(debug_assertions)]
fn init_debug_log() {
    use std::io::Write;

    let Ok(log_file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("/tmp/hyper-search-debug.log")
    else {
        return;
    };

    let initialized = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .format(|buf, record| {
            use std::time::SystemTime;
            let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
            writeln!(
                buf,
                "[{}] [{}] {}",
                datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .try_init();

    if initialized.is_ok() {
        log::debug!("=== HYPER-SEARCH DEBUG SESSION STARTED ===");
    }
}

/// Read stdin on its own thread so the event loop can keep ticking
fn spawn_stdin_reader() -> Receiver<std::io::Result<String>> {
    let (line_tx, line_rx) = mpsc::channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    line_rx
}

/// Feed stdin lines to the widget until input ends
fn run(widget: &mut SearchWidget, lines: &Receiver<std::io::Result<String>>) -> Result<()> {
    loop {
        match lines.recv_timeout(TICK_INTERVAL) {
            Ok(line) => {
                let line = line.map_err(HostError::from)?;
                if let Err(e) = handle_line(widget, &line) {
                    eprintln!("error: {}", e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        report(widget.tick());
    }

    Ok(())
}

fn handle_line(widget: &mut SearchWidget, line: &str) -> Result<(), HostError> {
    match Command::parse(line)? {
        Command::Input(value) => {
            if let Err(e) = widget.search(&value) {
                report(vec![e]);
            }
        }
        Command::Select(index) => {
            widget
                .select_index(index)
                .ok_or(HostError::NoSuchResult(index))?;
        }
        Command::Clear => widget.clear_results(),
        Command::Evict(query) => widget.remove_from_cache(&query),
        Command::Flush => widget.remove_all_from_cache(),
    }
    Ok(())
}

/// Let pending timers fire and in-flight lookups settle
fn drain(widget: &mut SearchWidget) {
    let deadline = Instant::now() + DRAIN_TIMEOUT;

    while widget.has_pending_work() && Instant::now() < deadline {
        std::thread::sleep(TICK_INTERVAL);
        report(widget.tick());
    }

    if widget.has_pending_work() {
        log::debug!("Gave up waiting for outstanding lookups");
    }
}

fn report(errors: Vec<SearchError>) {
    for e in errors {
        eprintln!("error: {}", e);
    }
}
