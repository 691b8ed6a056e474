//! Shared constants for wheel geometry and spin planning.

use std::f64::consts::{FRAC_PI_2, TAU};

/// Screen angle of the fixed pointer (twelve o'clock).
pub const POINTER_ANGLE: f64 = -FRAC_PI_2;

/// Screen angle opposite the pointer (six o'clock).
pub const BOTTOM_ANGLE: f64 = FRAC_PI_2;

/// One full revolution in radians.
pub const FULL_TURN: f64 = TAU;

/// Tolerance for weight-sum comparisons and no-op weight edits.
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Default animation length for one spin, in milliseconds.
pub const DEFAULT_SPIN_DURATION_MS: u64 = 4500;

/// Lower bound on the whole extra turns added to every spin.
pub const DEFAULT_EXTRA_TURNS_MIN: u32 = 3;

/// Upper bound on the whole extra turns added to every spin.
pub const DEFAULT_EXTRA_TURNS_MAX: u32 = 5;

/// Weight assigned to a freshly added option before renormalization.
pub const DEFAULT_NEW_OPTION_WEIGHT: f64 = 0.02;
