//! Let's Talk — service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config, apply CLI overrides
//!   4. Resolve effective log level (CLI flags > env > config)
//!   5. Init logger once
//!   6. Load the subject catalog (fatal on error)
//!   7. Resolve the LLM mode (live client or demo)
//!   8. Spawn Ctrl-C → shutdown signal watcher
//!   9. Spawn the provider health checker (live mode only)
//!  10. Print startup summary and serve until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use lets_talk::agent::SubjectAgent;
use lets_talk::bootstrap::logger;
use lets_talk::config;
use lets_talk::error::AppError;
use lets_talk::llm::providers;
use lets_talk::subjects::SubjectLibrary;
use lets_talk::web::{self, AppState, HealthState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if args.llm_only {
        config.llm.llm_only = true;
    }

    // --debug wins over -v tiers, which win over env/config.
    let effective_log_level = if args.debug {
        "debug"
    } else {
        args.log_level.unwrap_or(config.log_level.as_str())
    };
    let force_cli_level = args.debug || args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level, config.log_file.as_deref())?;

    info!(
        app_name = %config.app_name,
        provider = %config.llm.provider,
        llm_only = config.llm.llm_only,
        bind = %config.server.bind_addr(),
        effective_log_level,
        "config loaded"
    );

    let library = Arc::new(SubjectLibrary::load(&config.subjects.catalog)?);

    // One provider decision per process lifetime — no hot-reload.
    let client = providers::resolve(&config.llm)?;

    // Shared shutdown token — Ctrl-C cancels it, all tasks watch it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let health = match &client {
        Some(client) => {
            let health = HealthState::new(true, "ok");
            web::spawn_health_checker(client.clone(), health.clone(), shutdown.clone());
            health
        }
        None => HealthState::new(false, "demo mode — no live provider"),
    };

    let agent = SubjectAgent::new(
        client,
        config.llm.llm_only,
        config.subjects.prompts_dir.clone(),
    );

    print_startup_summary(&config, &agent, library.len());

    let state = AppState {
        config: Arc::new(config),
        library,
        agent,
        health,
    };
    web::serve(state, shutdown).await
}

fn print_startup_summary(config: &config::Config, agent: &SubjectAgent, subject_count: usize) {
    let fit = |text: String| -> String {
        const WIDTH: usize = 56;
        let char_count = text.chars().count();
        if char_count >= WIDTH {
            let mut out = text.chars().take(WIDTH - 1).collect::<String>();
            out.push('…');
            out
        } else {
            format!("{text:<WIDTH$}")
        }
    };

    let mode_line = if agent.is_demo() {
        "demo (canned answers)".to_string()
    } else {
        let settings = config.llm.active_settings();
        format!(
            "{} model={} timeout={}s",
            agent.provider_name(),
            settings.model,
            settings.timeout_seconds
        )
    };

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║ 🎁 Let's Talk                                            ║");
    println!("╟──────────────────────────────────────────────────────────╢");
    println!("║ 🧠 LLM: {}║", fit(mode_line));
    println!("║ 🔒 llm-only: {}║", fit(config.llm.llm_only.to_string()));
    println!("║ 📚 Subjects: {}║", fit(subject_count.to_string()));
    println!("║ 🌐 Listening: {}║", fit(format!("http://{}", config.server.bind_addr())));
    println!("╚══════════════════════════════════════════════════════════╝");
    println!("Press Ctrl+C to stop");
}

struct CliArgs {
    port: Option<u16>,
    host: Option<String>,
    llm_only: bool,
    debug: bool,
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut port = None;
    let mut host = None;
    let mut llm_only = false;
    let mut debug = false;
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: lets-talk [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("      --port <PORT>          Listen port (default: 5002)");
                println!("      --host <ADDR>          Listen address (default: 0.0.0.0)");
                println!("      --llm-only             Force live LLM replies, never fall back to demo");
                println!("      --debug                Debug logging");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "--port" => match iter.next().map(|v| v.parse::<u16>()) {
                Some(Ok(p)) => port = Some(p),
                _ => {
                    eprintln!("error: --port requires a valid port number");
                    std::process::exit(1);
                }
            },
            "--host" => match iter.next() {
                Some(h) => host = Some(h),
                None => {
                    eprintln!("error: --host requires an address argument");
                    std::process::exit(1);
                }
            },
            "--llm-only" => llm_only = true,
            "--debug" => debug = true,
            "-f" | "--config" => match iter.next() {
                Some(path) => config_path = Some(path),
                None => {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            },
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier from the config default:
    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug
    //   -vvvv+  → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { port, host, llm_only, debug, log_level, config_path }
}
