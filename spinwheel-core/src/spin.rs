//! Spin planning and the eased rotation state machine.
//!
//! A plan is a forward-only rotation target: the delta needed to bring the
//! winner's sector midpoint under the pointer, normalized into `[0, 2π)`
//! relative to the current rotation, plus a randomized count of whole extra
//! turns. The animation itself is a pure function of elapsed time over a
//! fixed duration, so tests drive it with a synthetic clock.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_EXTRA_TURNS_MAX, DEFAULT_EXTRA_TURNS_MIN, DEFAULT_NEW_OPTION_WEIGHT,
    DEFAULT_SPIN_DURATION_MS, FULL_TURN, POINTER_ANGLE,
};
use crate::numbers::elapsed_fraction;
use crate::sector::{Sector, normalize_angle};

/// Animation and editing knobs for one wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinConfig {
    #[serde(default = "SpinConfig::default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "SpinConfig::default_extra_turns_min")]
    pub extra_turns_min: u32,
    #[serde(default = "SpinConfig::default_extra_turns_max")]
    pub extra_turns_max: u32,
    #[serde(default = "SpinConfig::default_new_option_weight")]
    pub new_option_weight: f64,
}

impl SpinConfig {
    const fn default_duration_ms() -> u64 {
        DEFAULT_SPIN_DURATION_MS
    }

    const fn default_extra_turns_min() -> u32 {
        DEFAULT_EXTRA_TURNS_MIN
    }

    const fn default_extra_turns_max() -> u32 {
        DEFAULT_EXTRA_TURNS_MAX
    }

    const fn default_new_option_weight() -> f64 {
        DEFAULT_NEW_OPTION_WEIGHT
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the violated invariant.
    pub const fn validate(&self) -> Result<(), SpinConfigError> {
        if self.duration_ms == 0 {
            return Err(SpinConfigError::ZeroDuration);
        }
        if self.extra_turns_min > self.extra_turns_max {
            return Err(SpinConfigError::TurnsMinExceedsMax {
                min: self.extra_turns_min,
                max: self.extra_turns_max,
            });
        }
        Ok(())
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            duration_ms: Self::default_duration_ms(),
            extra_turns_min: Self::default_extra_turns_min(),
            extra_turns_max: Self::default_extra_turns_max(),
            new_option_weight: Self::default_new_option_weight(),
        }
    }
}

/// Errors raised when spin configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpinConfigError {
    #[error("spin duration must be positive")]
    ZeroDuration,
    #[error("extra turns minimum {min} exceeds maximum {max}")]
    TurnsMinExceedsMax { min: u32, max: u32 },
}

/// Target rotation and duration for one spin animation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinPlan {
    pub target_rotation: f64,
    pub duration_ms: u64,
}

/// Plan a forward-only rotation that lands the winner's sector midpoint
/// under the pointer. Returns `None` when the winner has no sector.
///
/// The extra-turn count is drawn from the injected stream, so plans are
/// reproducible under a fixed seed.
pub fn plan_spin<R: Rng>(
    sectors: &[Sector],
    offset: f64,
    current_rotation: f64,
    winner: &str,
    cfg: &SpinConfig,
    rng: &mut R,
) -> Option<SpinPlan> {
    let sector = sectors.iter().find(|sector| sector.name == winner)?;
    let alignment =
        normalize_angle(POINTER_ANGLE - (sector.midpoint() + offset) - current_rotation);
    let extra_turns = rng.gen_range(cfg.extra_turns_min..=cfg.extra_turns_max);
    let target_rotation = current_rotation + alignment + f64::from(extra_turns) * FULL_TURN;
    Some(SpinPlan {
        target_rotation,
        duration_ms: cfg.duration_ms,
    })
}

/// Cubic ease-out: fast start, gentle settle.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Transient state of an in-flight spin; destroyed on completion.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinState {
    pub start_rotation: f64,
    pub target_rotation: f64,
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub winner: String,
}

impl SpinState {
    /// Normalized progress through the animation at `now_ms`.
    #[must_use]
    pub fn progress(&self, now_ms: u64) -> f64 {
        elapsed_fraction(now_ms.saturating_sub(self.started_at_ms), self.duration_ms)
    }

    /// Eased rotation at `now_ms`.
    #[must_use]
    pub fn rotation_at(&self, now_ms: u64) -> f64 {
        let eased = ease_out_cubic(self.progress(now_ms));
        self.start_rotation + (self.target_rotation - self.start_rotation) * eased
    }

    #[must_use]
    pub fn is_complete(&self, now_ms: u64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// Idle/Spinning phase. Only one spin may be in flight at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SpinPhase {
    #[default]
    Idle,
    Spinning(SpinState),
}

impl SpinPhase {
    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        matches!(self, Self::Spinning(_))
    }
}
