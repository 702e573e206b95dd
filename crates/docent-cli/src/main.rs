//! `docent` – robot tour controller CLI
//!
//! The binary entry point for a narrated robot tour. It:
//!
//! 1. Loads `~/.docent/config.toml` (robot identity, narration settings,
//!    the tour script); writes the defaults on first run.
//! 2. Installs a Ctrl-C handler that trips the shared cancellation flag
//!    observed by every blocking poll loop.
//! 3. Runs either the full tour (dock → move/speak per waypoint → dock) or,
//!    with `--plan`, a survey that prints the robot pose, the sorted
//!    waypoints, and their narration pairing without moving anything.

mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use docent_client::{HttpTransport, PoseReport, RobotApi};
use docent_motion::ActionEngine;
use docent_runtime::{TourError, TourRunner, sort_waypoints};
use docent_speech::Narrator;
use docent_types::PollPolicy;
use tracing::warn;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set DOCENT_LOG_FORMAT=json to emit newline-delimited JSON logs
    // suitable for log aggregators. The operator-facing output below uses
    // println! for UX consistency.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("DOCENT_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    let plan_only = std::env::args().any(|arg| arg == "--plan");

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  No config found – defaults written to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Could not write default config".yellow(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    // Every poll loop observes this flag, so an operator Ctrl-C aborts the
    // current blocking wait instead of leaving the process to be killed.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_for_ctrlc = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – aborting the tour …".yellow().bold());
        cancel_for_ctrlc.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will kill the process directly");
    }

    let outcome = if plan_only {
        plan(&cfg)
    } else {
        tour(&cfg, &cancel)
    };

    if let Err(e) = outcome {
        println!("{}: {}", "Tour failed".red().bold(), e);
        std::process::exit(1);
    }
}

/// Survey mode: print the robot pose, the sorted waypoints, and which
/// narration each one would get. Submits no actions.
fn plan(cfg: &config::Config) -> Result<(), TourError> {
    let api = RobotApi::new(Box::new(HttpTransport::for_identity(&cfg.identity())));

    match api.pose()? {
        PoseReport::Localized(pose) => println!(
            "  Robot at ({:.2}, {:.2}), yaw {:.2}",
            pose.x, pose.y, pose.yaw
        ),
        PoseReport::Unlocalized(_) => {
            println!("  {}", "Robot is not localized.".yellow());
        }
    }

    let mut pois = api.pois()?;
    sort_waypoints(&mut pois);
    let script = cfg.script();

    println!();
    println!("  {}", "Tour plan".bold());
    for poi in &pois {
        let pairing = match script.narration_for(&poi.id) {
            Some(msg) => format!("narrates {}/{}", msg.scene, msg.intention).green(),
            None => "no narration scripted".red(),
        };
        println!(
            "  {:<20} ({:.2}, {:.2}) yaw {:.2}  {}",
            poi.metadata.display_name, poi.pose.x, poi.pose.y, poi.pose.yaw, pairing
        );
    }
    Ok(())
}

/// Run the full tour, blocking until the robot is back on the charger.
fn tour(cfg: &config::Config, cancel: &Arc<AtomicBool>) -> Result<(), TourError> {
    let max_wait = cfg.max_wait_secs.map(Duration::from_secs);

    let engine = ActionEngine::with_policy(
        RobotApi::new(Box::new(HttpTransport::for_identity(&cfg.identity()))),
        policy(Duration::from_millis(cfg.action_poll_ms), max_wait, cancel),
    );

    let narrator = if cfg.narration.enabled {
        Narrator::with_policy(
            Box::new(HttpTransport::new(&cfg.narration.base_url, &cfg.robot_name)),
            policy(Duration::from_millis(cfg.speech_poll_ms), max_wait, cancel),
        )
    } else {
        println!("  Narration disabled – the tour will run silently.");
        Narrator::disabled()
    };

    println!(
        "  Starting tour as {} against {}",
        cfg.robot_name.bold(),
        cfg.identity().base_url().bold()
    );

    TourRunner::new(engine, narrator, cfg.script()).run()?;

    println!("{}", "  ✓ Tour complete – robot is back on the charger.".green());
    Ok(())
}

fn policy(interval: Duration, max_wait: Option<Duration>, cancel: &Arc<AtomicBool>) -> PollPolicy {
    let mut policy = PollPolicy::new(interval).with_cancel(Arc::clone(cancel));
    if let Some(max) = max_wait {
        policy = policy.with_max_wait(max);
    }
    policy
}

fn print_banner() {
    println!();
    println!("{}", "  docent – narrated robot tours".cyan().bold());
    println!("{}", "  ──────────────────────────────".dimmed());
}
