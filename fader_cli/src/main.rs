#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod logging;
mod plant;

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use fader_core::SeekOutcome;
use fader_core::error::FaderError;
use fader_core::feed::LineFeed;
use fader_core::runner::{ServeParams, serve};
use serde_json::json;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::plant::{SimRig, assemble};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::debug!(error = ?e, "fatal");
        std::process::exit(exit_code_for_error(&e));
    }
}

fn load_config(path: &Path) -> eyre::Result<fader_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let cfg = fader_config::load_toml(&text).map_err(eyre::Report::new)?;
    cfg.validate()?;
    Ok(cfg)
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    logging::init(&cli.log_level, cli.json, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Serve => run_serve(&cfg),
        Commands::Seek { level } => run_seek(&cfg, level, cli.json),
        Commands::SelfCheck => run_self_check(&cfg, cli.json),
    }
}

fn run_serve(cfg: &fader_config::Config) -> eyre::Result<()> {
    let SimRig { plant, mut fader } = assemble(cfg)?;
    let params = ServeParams::from(&cfg.runner);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("installing Ctrl-C handler")?;
    }

    let feed = LineFeed::spawn(BufReader::new(std::io::stdin()));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = serve(&mut fader, &feed, &mut out, &params, &shutdown)?;
    tracing::info!(
        polls = summary.polls,
        commands = summary.commands,
        replies = summary.replies,
        stopped_by_signal = summary.stopped_by_signal,
        position = plant.position(),
        "serve finished"
    );
    if summary.drain_exhausted {
        tracing::warn!(target = fader.controller().target(), "exited before the last seek settled");
    }
    Ok(())
}

fn run_seek(cfg: &fader_config::Config, level: i32, json_out: bool) -> eyre::Result<()> {
    let SimRig { plant, mut fader } = assemble(cfg)?;
    let outcome = fader.seek_blocking(level);
    fader.stop();
    let outcome = outcome?;
    let target = fader.controller().target();
    let position = plant.position();

    if json_out {
        println!(
            "{}",
            json!({
                "requested": level,
                "target": target,
                "outcome": outcome.as_str(),
                "position": position,
            })
        );
    } else {
        println!("seek {target}: {outcome} at {position:.1}");
    }

    match outcome {
        SeekOutcome::Settled | SeekOutcome::Interrupted => Ok(()),
        _ => Err(eyre::Report::new(FaderError::State("seek ended off target"))),
    }
}

fn run_self_check(cfg: &fader_config::Config, json_out: bool) -> eyre::Result<()> {
    let map = plant::mapping(&cfg.sensor);
    let (lo, hi) = (map.to_position(map.raw_min), map.to_position(map.raw_max));
    let (expect_lo, expect_hi) = if map.invert { (100.0, 0.0) } else { (0.0, 100.0) };
    if (lo - expect_lo).abs() > 0.5 || (hi - expect_hi).abs() > 0.5 {
        return Err(eyre::Report::new(FaderError::Config(format!(
            "sensor span maps to {lo:.1}..{hi:.1}"
        ))));
    }

    let SimRig { plant, mut fader } = assemble(cfg)?;
    let tolerance = fader.controller().cfg().seek.tolerance;
    let home = i32::from(fader.controller().target());
    let mut results = Vec::new();
    for level in [0, 100, home] {
        let outcome = fader.seek_blocking(level);
        if outcome.is_err() {
            fader.stop();
        }
        let outcome = outcome?;
        let position = plant.position();
        let ok = outcome == SeekOutcome::Settled && (position - level as f32).abs() <= tolerance;
        tracing::info!(level, %outcome, position, ok, "self-check seek");
        results.push((level, outcome, position, ok));
    }
    fader.stop();

    let passed = results.iter().all(|r| r.3);
    if json_out {
        let seeks: Vec<_> = results
            .iter()
            .map(|(level, outcome, position, ok)| {
                json!({ "level": level, "outcome": outcome.as_str(), "position": position, "ok": ok })
            })
            .collect();
        println!("{}", json!({ "ok": passed, "sensor_span": [lo, hi], "seeks": seeks }));
    } else {
        println!("sensor span: {lo:.1}..{hi:.1}");
        for (level, outcome, position, ok) in &results {
            let mark = if *ok { "ok" } else { "FAIL" };
            println!("seek {level:>3}: {outcome} at {position:.1} [{mark}]");
        }
    }

    if passed {
        if !json_out {
            println!("self-check ok");
        }
        Ok(())
    } else {
        Err(eyre::Report::new(FaderError::State("self-check seeks failed")))
    }
}
