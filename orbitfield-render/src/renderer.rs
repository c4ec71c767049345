use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use orbitfield_core::{Formula, FractalParameters};

use crate::scalar_field::ScalarField;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cancellation flag and progress counters for one render job.
///
/// The flag only ever goes from clear to raised; a superseded job gets a new
/// token rather than a reset one. Rows check it before starting.
#[derive(Debug, Default)]
pub struct RenderCancel {
    cancelled: AtomicBool,
    progress_done: AtomicUsize,
    progress_total: AtomicUsize,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the job to stop at the next row boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Reset progress for a new phase with `total` work units.
    pub fn reset_progress(&self, total: usize) {
        self.progress_total.store(total, Ordering::Relaxed);
        self.progress_done.store(0, Ordering::Relaxed);
    }

    /// Increment completed work units by one.
    pub fn inc_progress(&self) {
        self.progress_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current progress as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.progress_done.load(Ordering::Relaxed),
            self.progress_total.load(Ordering::Relaxed),
        )
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// The result of a full-frame render.
///
/// Contains raw scalars (no coloring); the caller applies a gradient to
/// produce displayable pixels. A cancelled result holds a partially filled
/// field and must be discarded.
#[derive(Debug)]
pub struct RenderResult {
    pub field: ScalarField,
    pub elapsed: Duration,
    pub cancelled: bool,
    pub rows_rendered: usize,
}

// ---------------------------------------------------------------------------
// Full-frame render
// ---------------------------------------------------------------------------

/// Evaluate `formula` for every pixel of `params.viewport`.
///
/// Rows are processed in parallel via Rayon. The role and coloring mode are
/// resolved once for the whole job. `cancel` can be raised from another
/// thread to abort.
pub fn render_field(
    formula: &Formula,
    params: &FractalParameters,
    cancel: &RenderCancel,
) -> RenderResult {
    let start = Instant::now();
    let viewport = params.viewport;
    let mut field = ScalarField::new(viewport);
    let width = viewport.width as usize;

    debug!(
        family = formula.kind().label(),
        width = viewport.width,
        height = viewport.height,
        "Starting field render"
    );
    cancel.reset_progress(viewport.height as usize);

    let evaluator = formula.evaluator(params.plane, params.coloring);
    if width > 0 {
        field
            .data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(py, row)| {
                if cancel.is_cancelled() {
                    return;
                }
                for (px, out) in row.iter_mut().enumerate() {
                    let point = viewport.pixel_to_complex(px as u32, py as u32);
                    *out = evaluator.evaluate(point);
                }
                cancel.inc_progress();
            });
    }

    let (rows_rendered, _) = cancel.progress();
    let cancelled = cancel.is_cancelled();
    let elapsed = start.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        rows_rendered, cancelled, "Render complete"
    );

    RenderResult {
        field,
        elapsed,
        cancelled,
        rows_rendered,
    }
}

/// Validate `params`, build the formula and render it.
pub fn render(params: &FractalParameters, cancel: &RenderCancel) -> crate::Result<RenderResult> {
    let formula = Formula::new(params)?;
    Ok(render_field(&formula, params, cancel))
}
