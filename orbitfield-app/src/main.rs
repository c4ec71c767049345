mod cli;
mod error;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use orbitfield_core::FractalParameters;
use orbitfield_render::{
    export_png, save_raw, DisplaySettings, ExportMetadata, RenderCoordinator, RenderEvent,
    ScalarField, SessionRecord,
};

use cli::Cli;
use error::{AppError, Result};

// ---------------------------------------------------------------------------
// Session setup
// ---------------------------------------------------------------------------

fn load_params_json(path: &Path) -> Result<FractalParameters> {
    let text = std::fs::read_to_string(path)?;
    let params = serde_json::from_str(&text)?;
    info!(path = %path.display(), "Loaded parameters");
    Ok(params)
}

fn initial_session(cli: &Cli) -> Result<SessionRecord> {
    let base = match (&cli.load, &cli.params) {
        (Some(path), _) => SessionRecord::load(path)?,
        (None, Some(path)) => {
            SessionRecord::new(load_params_json(path)?, DisplaySettings::default())
        }
        (None, None) => {
            SessionRecord::new(FractalParameters::default(), DisplaySettings::default())
        }
    };
    cli.apply(base)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Submit `params` to a fresh coordinator and wait for its field.
fn render_field(params: FractalParameters) -> Result<ScalarField> {
    let (coordinator, events) = RenderCoordinator::new()?;
    let id = coordinator.submit(params);
    loop {
        match events.recv().map_err(|_| AppError::WorkerStopped)? {
            RenderEvent::FieldReady {
                request,
                field,
                elapsed,
            } if request == id => {
                info!(
                    request,
                    elapsed_ms = elapsed.as_millis(),
                    "Received field"
                );
                return Ok(field);
            }
            RenderEvent::Failed { request, error } if request == id => {
                return Err(AppError::RenderFailed {
                    request,
                    source: error,
                });
            }
            other => warn!(request = other.request(), "Ignoring stale event"),
        }
    }
}

/// Fill in the data range from the field.
///
/// A log mapping needs a positive lower bound, so it starts at the smallest
/// positive finite value instead.
fn auto_range(field: &ScalarField, settings: &mut DisplaySettings) -> Result<()> {
    let (mut lower, upper) = field.value_range().ok_or_else(|| {
        AppError::InvalidArgument("field has no finite values to derive a range from".into())
    })?;
    if settings.log_scale && lower <= 0.0 {
        lower = field
            .data
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(f64::INFINITY, f64::min);
        if !lower.is_finite() {
            return Err(AppError::InvalidArgument(
                "log scale needs positive values in the field".into(),
            ));
        }
    }
    settings.lower = lower;
    settings.upper = upper;
    info!(lower, upper, "Derived data range");
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let SessionRecord {
        params,
        mut display,
    } = initial_session(cli)?;
    params.validate()?;

    if cli.print_params {
        println!("{}", serde_json::to_string_pretty(&params)?);
    }
    if cli.png.is_none() && cli.raw.is_none() && cli.save_record.is_none() {
        warn!("No output requested (use --png, --raw or --save-record)");
    }

    info!(
        family = params.family.label(),
        width = params.viewport.width,
        height = params.viewport.height,
        max_iterations = params.max_iterations,
        "Rendering"
    );
    let mut field = render_field(params)?;
    if cli.smooth {
        field = field.smoothed();
    }
    if cli.wants_auto_range() {
        auto_range(&field, &mut display)?;
    }

    if let Some(path) = &cli.png {
        let buffer = display.gradient().colorize_field(
            &field,
            display.lower,
            display.upper,
            display.log_scale,
        );
        export_png(&buffer, path, &ExportMetadata::new(&params, &display))?;
        info!(path = %path.display(), "Wrote image");
    }
    if let Some(path) = &cli.raw {
        save_raw(&field, path)?;
    }
    if let Some(path) = &cli.save_record {
        SessionRecord::new(params, display).save(path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "orbitfield failed");
            ExitCode::FAILURE
        }
    }
}
