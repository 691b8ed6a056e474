//! Angular sector geometry derived from the weight model.
//!
//! Sectors are derived data: recomputed whenever the model changes, never
//! persisted. They partition the full circle in stored option order, and a
//! single global rotation offset shifts the whole partition to satisfy the
//! pinned-slot placement constraint.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{BOTTOM_ANGLE, FULL_TURN, POINTER_ANGLE};
use crate::model::WeightModel;

/// Sector list; typical wheels fit inline, large ones spill to the heap.
pub type SectorList = SmallVec<[Sector; 16]>;

/// One option's angular slice of the circle, in wheel space.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub name: String,
    pub start: f64,
    pub end: f64,
}

impl Sector {
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Names of the options pinned to the fixed top and bottom slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedSlots {
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub bottom: Option<String>,
}

/// Map any angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(a: f64) -> f64 {
    ((a % FULL_TURN) + FULL_TURN) % FULL_TURN
}

/// Partition the circle into sectors proportional to the option weights,
/// in stored order from cumulative angle 0. Weights are renormalized here
/// defensively so a drifted sum still yields an exact partition.
#[must_use]
pub fn compute_sectors(model: &WeightModel) -> SectorList {
    let sum = model.weight_sum();
    let mut sectors = SectorList::new();
    let mut acc = 0.0;
    for opt in model.options() {
        let fraction = if sum > 0.0 { opt.weight / sum } else { 0.0 };
        let start = acc;
        let end = acc + fraction * FULL_TURN;
        sectors.push(Sector {
            name: opt.name.clone(),
            start,
            end,
        });
        acc = end;
    }
    sectors
}

fn pinned_midpoint(sectors: &[Sector], name: Option<&str>) -> Option<f64> {
    let name = name?;
    sectors
        .iter()
        .find(|sector| sector.name == name)
        .map(Sector::midpoint)
}

/// Global rotation offset satisfying the pinned-slot constraint.
///
/// With both pins present, the top pin is aligned to the pointer first, then
/// the residual correction lands the bottom pin exactly at the opposite slot;
/// when the two midpoints are not π apart the residual stays on the top pin.
/// With a single pin, that pin is placed exactly. With none, the offset is 0.
#[must_use]
pub fn compute_offset(sectors: &[Sector], pinned: &PinnedSlots) -> f64 {
    let top = pinned_midpoint(sectors, pinned.top.as_deref());
    let bottom = pinned_midpoint(sectors, pinned.bottom.as_deref());
    match (top, bottom) {
        (Some(top_mid), Some(bottom_mid)) => {
            let to_top = normalize_angle(POINTER_ANGLE - top_mid);
            let bottom_after = normalize_angle(bottom_mid + to_top);
            let correction = normalize_angle(BOTTOM_ANGLE - bottom_after);
            normalize_angle(to_top + correction)
        }
        (Some(top_mid), None) => normalize_angle(POINTER_ANGLE - top_mid),
        (None, Some(bottom_mid)) => normalize_angle(BOTTOM_ANGLE - bottom_mid),
        (None, None) => 0.0,
    }
}

/// Resolve which sector covers a wheel-space angle.
#[must_use]
pub fn find_at_angle(sectors: &[Sector], angle: f64) -> Option<&Sector> {
    let a = normalize_angle(angle);
    sectors
        .iter()
        .find(|sector| a >= sector.start && a < sector.end)
        .or_else(|| sectors.last())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WEIGHT_EPSILON;

    fn model(weights: &[(&str, f64)]) -> WeightModel {
        WeightModel::from_entries(
            weights
                .iter()
                .map(|(name, weight)| ((*name).to_string(), *weight)),
        )
        .unwrap()
    }

    #[test]
    fn sectors_partition_the_circle_exactly() {
        let m = model(&[("A", 0.3), ("B", 0.15), ("C", 0.25), ("D", 0.3)]);
        let sectors = compute_sectors(&m);
        assert!((sectors[0].start).abs() < WEIGHT_EPSILON);
        for pair in sectors.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < WEIGHT_EPSILON);
        }
        let total: f64 = sectors.iter().map(Sector::width).sum();
        assert!((total - FULL_TURN).abs() < WEIGHT_EPSILON);
        assert!((sectors.last().unwrap().end - FULL_TURN).abs() < WEIGHT_EPSILON);
    }

    #[test]
    fn sector_width_tracks_weight() {
        let m = model(&[("A", 0.5), ("B", 0.25), ("C", 0.25)]);
        let sectors = compute_sectors(&m);
        assert!((sectors[0].width() - FULL_TURN / 2.0).abs() < WEIGHT_EPSILON);
        assert!((sectors[1].width() - FULL_TURN / 4.0).abs() < WEIGHT_EPSILON);
    }

    #[test]
    fn normalize_angle_wraps_both_directions() {
        assert!((normalize_angle(-std::f64::consts::FRAC_PI_2) - 1.5 * std::f64::consts::PI)
            .abs()
            < WEIGHT_EPSILON);
        assert!((normalize_angle(FULL_TURN + 0.25) - 0.25).abs() < WEIGHT_EPSILON);
        assert!(normalize_angle(0.0).abs() < WEIGHT_EPSILON);
    }

    #[test]
    fn opposite_pins_land_exactly_on_both_slots() {
        // A and C sit exactly π apart, so both constraints are satisfiable.
        let m = model(&[("A", 0.25), ("B", 0.25), ("C", 0.25), ("D", 0.25)]);
        let sectors = compute_sectors(&m);
        let pinned = PinnedSlots {
            top: Some("A".to_string()),
            bottom: Some("C".to_string()),
        };
        let offset = compute_offset(&sectors, &pinned);
        let a_mid = sectors[0].midpoint();
        let c_mid = sectors[2].midpoint();
        assert!(
            (normalize_angle(a_mid + offset) - normalize_angle(POINTER_ANGLE)).abs()
                < WEIGHT_EPSILON
        );
        assert!(
            (normalize_angle(c_mid + offset) - normalize_angle(BOTTOM_ANGLE)).abs()
                < WEIGHT_EPSILON
        );
    }

    #[test]
    fn bottom_pin_is_exact_when_pins_are_not_opposite() {
        // Adjacent pins: the bottom pin lands exactly, the top carries the
        // residual, and their relative separation is preserved.
        let m = model(&[("A", 0.4), ("B", 0.4), ("Top", 0.1), ("Bottom", 0.1)]);
        let sectors = compute_sectors(&m);
        let pinned = PinnedSlots {
            top: Some("Top".to_string()),
            bottom: Some("Bottom".to_string()),
        };
        let offset = compute_offset(&sectors, &pinned);
        let top_mid = sectors[2].midpoint();
        let bottom_mid = sectors[3].midpoint();
        assert!(
            (normalize_angle(bottom_mid + offset) - normalize_angle(BOTTOM_ANGLE)).abs()
                < WEIGHT_EPSILON
        );
        let separation = normalize_angle(bottom_mid - top_mid);
        assert!(
            (normalize_angle((bottom_mid + offset) - (top_mid + offset)) - separation).abs()
                < WEIGHT_EPSILON
        );
    }

    #[test]
    fn single_pins_land_on_their_slot() {
        let m = model(&[("A", 0.5), ("B", 0.5)]);
        let sectors = compute_sectors(&m);

        let top_only = PinnedSlots {
            top: Some("B".to_string()),
            bottom: None,
        };
        let offset = compute_offset(&sectors, &top_only);
        assert!(
            (normalize_angle(sectors[1].midpoint() + offset) - normalize_angle(POINTER_ANGLE))
                .abs()
                < WEIGHT_EPSILON
        );

        let bottom_only = PinnedSlots {
            top: None,
            bottom: Some("A".to_string()),
        };
        let offset = compute_offset(&sectors, &bottom_only);
        assert!(
            (normalize_angle(sectors[0].midpoint() + offset) - normalize_angle(BOTTOM_ANGLE))
                .abs()
                < WEIGHT_EPSILON
        );
    }

    #[test]
    fn missing_pins_mean_zero_offset() {
        let m = model(&[("A", 0.5), ("B", 0.5)]);
        let sectors = compute_sectors(&m);
        assert!(compute_offset(&sectors, &PinnedSlots::default()).abs() < WEIGHT_EPSILON);
        let unknown = PinnedSlots {
            top: Some("Nope".to_string()),
            bottom: None,
        };
        assert!(compute_offset(&sectors, &unknown).abs() < WEIGHT_EPSILON);
    }

    #[test]
    fn find_at_angle_resolves_sectors() {
        let m = model(&[("A", 0.5), ("B", 0.5)]);
        let sectors = compute_sectors(&m);
        assert_eq!(find_at_angle(&sectors, 0.1).unwrap().name, "A");
        assert_eq!(find_at_angle(&sectors, 4.0).unwrap().name, "B");
        // Wraps negative input into range.
        assert_eq!(find_at_angle(&sectors, -0.1).unwrap().name, "B");
    }
}
