//! Command implementations: replay, record, verify, defaults.

use std::io::Write;
use std::path::Path;

use podctl_core::{ControlConfig, FeedbackEvent};
use podctl_web::input_parser::parse_gesture_script;
use podctl_web::session_record::{SessionRecorder, SessionTrace, replay};
use podctl_web::{GestureDispatch, GestureInput, GestureLogEntry, PodControl, RecordingHost};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{RecordArgs, ReplayArgs, VerifyArgs};
use crate::error::{PodctlError, Result};

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| PodctlError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a JSON configuration file, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<ControlConfig> {
    let config = match path {
        Some(path) => {
            let text = read_file(path)?;
            serde_json::from_str(&text).map_err(|source| PodctlError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => ControlConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Load a newline-delimited JSON gesture script.
pub fn load_script(path: &Path) -> Result<Vec<GestureInput>> {
    let text = read_file(path)?;
    let inputs = parse_gesture_script(&text).map_err(|source| PodctlError::Script {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), inputs = inputs.len(), "gesture script loaded");
    Ok(inputs)
}

#[derive(Serialize)]
struct DispatchLine<'a> {
    #[serde(flatten)]
    log: &'a GestureLogEntry,
    feedback: &'a [FeedbackEvent],
}

fn write_dispatch(out: &mut dyn Write, dispatch: &GestureDispatch, json: bool) -> Result<()> {
    if json {
        let line = DispatchLine {
            log: &dispatch.log,
            feedback: &dispatch.feedback,
        };
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
        return Ok(());
    }

    let log = &dispatch.log;
    write!(
        out,
        "{:>4} {:<15} {:>12}",
        log.sequence,
        format!("{:?}", log.phase),
        log.readout.to_string()
    )?;
    for pulse in &dispatch.feedback {
        write!(out, " {pulse}")?;
    }
    if let Some(command) = dispatch.pan_command {
        write!(out, " pan:{command:?}")?;
    }
    if !dispatch.applied() {
        write!(out, " [{:?}]", log.outcome)?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn run_replay(args: &ReplayArgs, out: &mut dyn Write) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let inputs = load_script(&args.script)?;
    let mut control = PodControl::new(config, RecordingHost::new(args.screen_height));

    for input in inputs {
        let dispatch = control.dispatch(input);
        if args.all || dispatch.applied() {
            write_dispatch(out, &dispatch, args.json)?;
        }
    }

    let readout = control.readout();
    if args.json {
        writeln!(
            out,
            "{}",
            serde_json::to_string(&serde_json::json!({ "final": readout }))?
        )?;
    } else {
        writeln!(out, "final {readout}")?;
    }
    info!(
        pulses = control.host().pulses().len(),
        heading = readout.heading,
        telegraph = readout.telegraph,
        "replay finished"
    );
    Ok(())
}

pub fn run_record(args: &RecordArgs, out: &mut dyn Write) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let inputs = load_script(&args.script)?;
    let mut recorder = SessionRecorder::new(config, args.screen_height);
    for input in inputs {
        recorder.push(input);
    }
    let trace = recorder.finish();

    let text = serde_json::to_string_pretty(&trace)?;
    std::fs::write(&args.output, text).map_err(|source| PodctlError::Write {
        path: args.output.clone(),
        source,
    })?;
    writeln!(
        out,
        "recorded {} inputs to {}",
        trace.input_count(),
        args.output.display()
    )?;
    Ok(())
}

pub fn run_verify(args: &VerifyArgs, out: &mut dyn Write) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let text = read_file(&args.trace)?;
    let trace: SessionTrace = serde_json::from_str(&text).map_err(|source| PodctlError::Json {
        path: args.trace.clone(),
        source,
    })?;

    let result = replay(config, &trace)?;
    if let Some(mismatch) = result.first_mismatch {
        return Err(PodctlError::Diverged {
            seq: mismatch.seq,
            mismatch,
        });
    }
    if !result.summary_matches() {
        let detail = match (result.recorded_total_inputs, result.recorded_checksum_chain) {
            (Some(inputs), Some(chain)) => format!(
                "recorded {inputs} inputs, chain {chain:#018x}; replayed {} inputs, chain {:#018x}",
                result.total_inputs, result.final_checksum_chain
            ),
            _ => "summary record missing".to_string(),
        };
        return Err(PodctlError::Summary { detail });
    }
    writeln!(
        out,
        "ok: {} inputs, final {}, chain {:#018x}",
        result.total_inputs, result.final_readout, result.final_checksum_chain
    )?;
    Ok(())
}

pub fn print_defaults(out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "{}",
        serde_json::to_string_pretty(&ControlConfig::default())?
    )?;
    Ok(())
}
