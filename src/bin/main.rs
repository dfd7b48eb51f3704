//! Feedwatch CLI
//!
//!   feedwatch [run]     → Poll both feeds until SIGINT/SIGTERM
//!   feedwatch once      → One cycle of each feed, output JSON report
//!   feedwatch status    → Cursor state, output JSON (creates no files)
//!
//! Configuration comes from the environment (and `.env`):
//!   MORALIS, WEBHOOK, ADDRESS (required), FEEDWATCH_* (optional)
//!
//! Output format:
//!   --json     Output raw JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use anyhow::{anyhow, bail, Context, Result};
use feedwatch::logging::init_logging;
use feedwatch::{install_signal_handlers, Watcher, WatcherConfig};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use tracing::info;

fn main() {
    let _ = dotenvy::dotenv();
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = match ParsedArgs::parse(&args[1..]) {
        Ok(opts) => opts,
        Err(e) => exit_with(&e, false),
    };

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("feedwatch {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        None | Some("run") => cmd_run(&opts),
        Some("once") => cmd_once(&opts),
        Some("status") => cmd_status(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
    };

    match result {
        Ok(Value::Null) => {}
        Ok(output) => println!("{}", render(&output, opts.pretty_output())),
        Err(e) => exit_with(&e, opts.pretty_output()),
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

fn exit_with(error: &anyhow::Error, pretty: bool) -> ! {
    eprintln!("{}", render(&json!({ "error": format!("{error:#}") }), pretty));
    std::process::exit(1);
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    data_dir: Option<String>,
    port: Option<u16>,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--data-dir" | "-d" => {
                    i += 1;
                    let value = args.get(i).context("--data-dir needs a path")?;
                    opts.data_dir = Some(value.clone());
                }
                "--port" | "-p" => {
                    i += 1;
                    let value = args.get(i).context("--port needs a number")?;
                    opts.port = Some(value.parse().with_context(|| format!("Invalid port: {}", value))?);
                }
                _ if arg.starts_with('-') => bail!("Unknown option: {}", arg),
                _ => positional.push(arg.clone()),
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        opts.command = positional.next();
        if let Some(extra) = positional.next() {
            bail!("Unexpected argument: {}", extra);
        }
        Ok(opts)
    }

    fn pretty_output(&self) -> bool {
        !self.json && (self.pretty || std::io::stdout().is_terminal())
    }
}

fn print_usage() {
    println!(
        r#"feedwatch - token transfer and quest notifier

USAGE:
    feedwatch [command] [options]

COMMANDS:
    run                     Poll both feeds until interrupted (default)
    once                    Run one cycle of each feed and print the report
    status                  Print persisted cursor state

OPTIONS:
    --data-dir, -d <path>   Cursor directory (env: FEEDWATCH_DATA_DIR)
    --port, -p <port>       Serve /health on this port (env: FEEDWATCH_PORT)
    --json                  Raw JSON output
    --pretty                Pretty-print JSON
    --version, -V           Print version
    --help, -h              Print this help

ENVIRONMENT:
    MORALIS                 Transfer API key (required)
    WEBHOOK                 Notification webhook URL (required)
    ADDRESS                 Watched wallet address (required)
    FEEDWATCH_TX_INTERVAL_SECS      Transfer poll interval (default: 108)
    FEEDWATCH_QUEST_INTERVAL_SECS   Quest poll interval (default: 86400)
    FEEDWATCH_QUEST_GATE_SECS       Minimum time between quest checks (default: 86400)
    FEEDWATCH_TX_CACHE_CAP          Remembered transaction hashes (default: 100)
    FEEDWATCH_CHAIN                 Chain queried for transfers (default: ronin)
    FEEDWATCH_PAGE_SIZE             Transfers per fetch (default: 20)
    FEEDWATCH_QUEST_URL             Quest listing URL
    FEEDWATCH_EXPLORER_URL          Transaction explorer base URL
    FEEDWATCH_LOG_JSON=1            JSON log lines
    RUST_LOG                        Log filter (default: info)
"#
    );
}

fn load_config(opts: &ParsedArgs) -> Result<WatcherConfig> {
    let mut config = WatcherConfig::from_env().context("Configuration error")?;
    if let Some(dir) = opts.data_dir.as_deref() {
        config = config.with_data_dir(dir);
    }
    if let Some(port) = opts.port {
        config = config.with_port(port);
    }
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create runtime")
}

fn cmd_run(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    let rt = runtime()?;

    rt.block_on(async {
        let shutdown = install_signal_handlers();
        let port = config.port;
        let watcher = Watcher::from_config(config);
        info!(
            address = %watcher.config().address,
            data_dir = %watcher.config().data_dir.display(),
            "feedwatch starting"
        );

        let handle = watcher.spawn(&shutdown);

        if let Some(port) = port {
            if let Err(e) = serve_health(port, &shutdown).await {
                shutdown.trigger();
                handle.join().await;
                return Err(e);
            }
        }

        let (transfers, quests) = handle.join().await;
        info!(?transfers, ?quests, "feedwatch stopped");
        Ok(Value::Null)
    })
}

#[cfg(feature = "server")]
async fn serve_health(port: u16, shutdown: &feedwatch::Shutdown) -> Result<()> {
    let router = feedwatch::create_router();
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Health endpoint on http://{}/health", addr);

    let mut signal = shutdown.subscribe();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { signal.cancelled().await })
        .await
        .context("Server error")
}

#[cfg(not(feature = "server"))]
async fn serve_health(port: u16, _shutdown: &feedwatch::Shutdown) -> Result<()> {
    tracing::warn!(port, "built without the server feature, not serving /health");
    Ok(())
}

fn cmd_once(opts: &ParsedArgs) -> Result<Value> {
    let watcher = Watcher::from_config(load_config(opts)?);
    let report = runtime()?.block_on(watcher.run_once());
    serde_json::to_value(&report).context("Failed to encode report")
}

fn cmd_status(opts: &ParsedArgs) -> Result<Value> {
    let watcher = Watcher::from_config(load_config(opts)?);
    Ok(watcher.status())
}
