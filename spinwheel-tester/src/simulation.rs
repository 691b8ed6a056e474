//! Headless spin execution and draw-frequency simulation.

use anyhow::{Result, bail};
use serde::Serialize;
use spinwheel_core::{RngBundle, WeightModel, WheelRenderer, WheelSession, draw_with};

/// One completed headless spin.
#[derive(Debug, Clone, Serialize)]
pub struct SpinRun {
    pub winner: String,
    pub frames: u64,
    pub final_rotation: f64,
}

/// Frame sink standing in for a real canvas: counts frames and remembers the
/// last rotation handed to it.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames: u64,
    pub last_rotation: f64,
}

impl WheelRenderer for FrameRecorder {
    fn render(&mut self, _sectors: &[spinwheel_core::Sector], rotation: f64) {
        self.frames += 1;
        self.last_rotation = rotation;
        log::trace!("frame {} at rotation {rotation:.4}", self.frames);
    }
}

/// Drive `count` spins to completion on a synthetic frame clock, pushing
/// every frame through the renderer seam.
///
/// # Errors
///
/// Propagates session errors; a spin that never settles within a generous
/// frame budget is reported as a failure rather than looping forever.
pub fn run_spins<R: WheelRenderer>(
    session: &mut WheelSession,
    renderer: &mut R,
    count: usize,
    frame_ms: u64,
) -> Result<Vec<SpinRun>> {
    let frame_ms = frame_ms.max(1);
    let mut runs = Vec::with_capacity(count);
    let mut now_ms: u64 = 0;
    for _ in 0..count {
        session.spin(now_ms)?;
        let budget = session.config().duration_ms / frame_ms + 2;
        let mut frames: u64 = 0;
        let winner = loop {
            now_ms += frame_ms;
            frames += 1;
            let outcome = session.tick(now_ms);
            renderer.render(session.sectors(), outcome.rotation);
            if let Some(winner) = outcome.completed {
                break winner;
            }
            if frames > budget {
                bail!("spin did not settle within {budget} frames");
            }
        };
        runs.push(SpinRun {
            winner,
            frames,
            final_rotation: session.rotation(),
        });
        // Idle gap between spins, as a user would leave.
        now_ms += frame_ms;
    }
    Ok(runs)
}

/// Observed-vs-expected frequency for one option.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyRow {
    pub name: String,
    pub expected: f64,
    pub observed: f64,
    pub hits: u64,
}

impl FrequencyRow {
    #[must_use]
    pub fn deviation(&self) -> f64 {
        (self.observed - self.expected).abs()
    }
}

/// Result of a seeded frequency simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub rows: Vec<FrequencyRow>,
    pub samples: usize,
    pub tolerance: f64,
}

impl SimulationReport {
    /// Largest absolute deviation across all options.
    #[must_use]
    pub fn worst_deviation(&self) -> f64 {
        self.rows
            .iter()
            .map(FrequencyRow::deviation)
            .fold(0.0, f64::max)
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.worst_deviation() <= self.tolerance
    }
}

/// Draw `samples` winners from the seeded draw stream and compare observed
/// frequencies against the model weights.
#[must_use]
pub fn run_simulation(
    model: &WeightModel,
    seed: u64,
    samples: usize,
    tolerance: f64,
) -> SimulationReport {
    let rngs = RngBundle::from_user_seed(seed);
    let mut hits: Vec<u64> = vec![0; model.len()];
    for _ in 0..samples {
        if let Some(winner) = draw_with(model.options(), &mut *rngs.draw()) {
            if let Some(index) = model
                .options()
                .iter()
                .position(|opt| opt.name == winner)
            {
                hits[index] += 1;
            }
        }
    }
    let total = samples.max(1) as f64;
    let rows = model
        .options()
        .iter()
        .zip(&hits)
        .map(|(opt, &count)| FrequencyRow {
            name: opt.name.clone(),
            expected: opt.weight,
            observed: count as f64 / total,
            hits: count,
        })
        .collect();
    SimulationReport {
        rows,
        samples,
        tolerance,
    }
}
