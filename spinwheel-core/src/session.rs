//! Interactive wheel session: weights, geometry, and the spin lifecycle.
//!
//! The session owns the weight model, the derived sector geometry, the
//! accumulated wheel rotation, and the idle/spinning phase. Time never comes
//! from a wall clock here; every time-sensitive method takes `now_ms` so
//! callers drive the animation and tests replay it deterministically.

use thiserror::Error;

use crate::constants::POINTER_ANGLE;
use crate::model::{ModelError, WeightModel};
use crate::rng::RngBundle;
use crate::sampler;
use crate::sector::{
    PinnedSlots, Sector, SectorList, compute_offset, compute_sectors, find_at_angle,
    normalize_angle,
};
use crate::spin::{SpinConfig, SpinConfigError, SpinPhase, SpinState, plan_spin};

/// Errors from session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpinError {
    #[error("a spin is already in progress")]
    AlreadySpinning,
    #[error("the wheel has no options to draw from")]
    EmptyWheel,
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result of advancing the animation clock by one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Current wheel rotation in radians.
    pub rotation: f64,
    /// Winner name when this tick settled the spin, `None` otherwise.
    pub completed: Option<String>,
}

/// One live wheel: model, geometry, rotation, and spin phase.
#[derive(Debug)]
pub struct WheelSession {
    model: WeightModel,
    pinned: PinnedSlots,
    config: SpinConfig,
    rngs: RngBundle,
    sectors: SectorList,
    offset: f64,
    rotation: f64,
    phase: SpinPhase,
    last_winner: Option<String>,
}

impl WheelSession {
    /// Build a session over a validated model.
    ///
    /// # Errors
    ///
    /// Returns [`SpinConfigError`] when the configuration is invalid.
    pub fn new(
        model: WeightModel,
        pinned: PinnedSlots,
        config: SpinConfig,
        seed: u64,
    ) -> Result<Self, SpinConfigError> {
        config.validate()?;
        let sectors = compute_sectors(&model);
        let offset = compute_offset(&sectors, &pinned);
        Ok(Self {
            model,
            pinned,
            config,
            rngs: RngBundle::from_user_seed(seed),
            sectors,
            offset,
            rotation: 0.0,
            phase: SpinPhase::Idle,
            last_winner: None,
        })
    }

    #[must_use]
    pub const fn model(&self) -> &WeightModel {
        &self.model
    }

    #[must_use]
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub const fn pinned(&self) -> &PinnedSlots {
        &self.pinned
    }

    #[must_use]
    pub const fn config(&self) -> &SpinConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        self.phase.is_spinning()
    }

    /// Winner of the most recently settled spin.
    #[must_use]
    pub fn last_winner(&self) -> Option<&str> {
        self.last_winner.as_deref()
    }

    /// Draw counts consumed so far as `(winner_draws, turn_rolls)`.
    #[must_use]
    pub fn rng_draws(&self) -> (u64, u64) {
        (self.rngs.draw().draws(), self.rngs.turns().draws())
    }

    /// Swap the RNG streams for a fresh seed. Allowed only while idle.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::AlreadySpinning`] when a spin is in flight.
    pub fn reseed(&mut self, seed: u64) -> Result<(), SpinError> {
        self.ensure_idle()?;
        self.rngs = RngBundle::from_user_seed(seed);
        Ok(())
    }

    /// Draw a winner and start the spin animation toward it.
    ///
    /// The winner is decided up front from the draw stream; the animation is
    /// presentation only. Returns the drawn winner's name.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::AlreadySpinning`] when a spin is already in
    /// flight, or [`SpinError::EmptyWheel`] when nothing can be drawn.
    pub fn spin(&mut self, now_ms: u64) -> Result<String, SpinError> {
        self.ensure_idle()?;
        let winner = sampler::draw_with(self.model.options(), &mut *self.rngs.draw())
            .ok_or(SpinError::EmptyWheel)?
            .to_string();
        self.start_spin_toward(winner, now_ms)
    }

    /// Spin again toward the previous winner, falling back to a fresh draw
    /// when there is no previous winner or it has since been removed.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::spin`].
    pub fn respin(&mut self, now_ms: u64) -> Result<String, SpinError> {
        self.ensure_idle()?;
        let previous = self
            .last_winner
            .clone()
            .filter(|name| self.sectors.iter().any(|sector| &sector.name == name));
        match previous {
            Some(winner) => self.start_spin_toward(winner, now_ms),
            None => self.spin(now_ms),
        }
    }

    /// Advance the animation to `now_ms`. On the settling tick the rotation
    /// is normalized into `[0, 2π)` and the winner is reported once.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        let settled = match &self.phase {
            SpinPhase::Spinning(state) if state.is_complete(now_ms) => {
                Some((state.winner.clone(), state.target_rotation))
            }
            SpinPhase::Spinning(state) => {
                self.rotation = state.rotation_at(now_ms);
                None
            }
            SpinPhase::Idle => None,
        };
        if let Some((winner, target)) = settled {
            self.rotation = normalize_angle(target);
            self.phase = SpinPhase::Idle;
            self.last_winner = Some(winner.clone());
            return TickOutcome {
                rotation: self.rotation,
                completed: Some(winner),
            };
        }
        TickOutcome {
            rotation: self.rotation,
            completed: None,
        }
    }

    /// Sector currently under the pointer, accounting for rotation and the
    /// pinned-slot offset.
    #[must_use]
    pub fn sector_at_pointer(&self) -> Option<&Sector> {
        let wheel_angle = normalize_angle(POINTER_ANGLE - self.offset - self.rotation);
        find_at_angle(&self.sectors, wheel_angle)
    }

    /// Set one option's weight, redistributing the difference.
    ///
    /// # Errors
    ///
    /// Rejected while spinning, or when the model rejects the change.
    pub fn edit_weight(&mut self, index: usize, weight: f64) -> Result<(), SpinError> {
        self.ensure_idle()?;
        self.model.set_weight(index, weight)?;
        self.refresh_geometry();
        Ok(())
    }

    /// Add an option, defaulting its weight from the configuration.
    ///
    /// # Errors
    ///
    /// Rejected while spinning, or when the model rejects the name.
    pub fn add_option(&mut self, name: &str, weight: Option<f64>) -> Result<(), SpinError> {
        self.ensure_idle()?;
        let weight = weight.unwrap_or(self.config.new_option_weight);
        self.model.add_option(name, weight)?;
        self.refresh_geometry();
        Ok(())
    }

    /// Remove an option. Pins referencing it are cleared.
    ///
    /// # Errors
    ///
    /// Rejected while spinning, or when the model rejects the removal.
    pub fn remove_option(&mut self, index: usize) -> Result<(), SpinError> {
        self.ensure_idle()?;
        let removed = self.model.remove_option(index)?;
        if self.pinned.top.as_deref() == Some(removed.name.as_str()) {
            self.pinned.top = None;
        }
        if self.pinned.bottom.as_deref() == Some(removed.name.as_str()) {
            self.pinned.bottom = None;
        }
        if self.last_winner.as_deref() == Some(removed.name.as_str()) {
            self.last_winner = None;
        }
        self.refresh_geometry();
        Ok(())
    }

    /// Rename an option, following the name through pins and history state.
    ///
    /// # Errors
    ///
    /// Rejected while spinning, or when the model rejects the new name.
    pub fn rename_option(&mut self, index: usize, name: &str) -> Result<(), SpinError> {
        self.ensure_idle()?;
        let old = self
            .model
            .get(index)
            .map(|opt| opt.name.clone())
            .unwrap_or_default();
        self.model.rename(index, name)?;
        if self.pinned.top.as_deref() == Some(old.as_str()) {
            self.pinned.top = Some(name.to_string());
        }
        if self.pinned.bottom.as_deref() == Some(old.as_str()) {
            self.pinned.bottom = Some(name.to_string());
        }
        if self.last_winner.as_deref() == Some(old.as_str()) {
            self.last_winner = Some(name.to_string());
        }
        self.refresh_geometry();
        Ok(())
    }

    /// Replace the pinned-slot assignment and recompute the offset.
    ///
    /// # Errors
    ///
    /// Rejected while spinning.
    pub fn set_pinned(&mut self, pinned: PinnedSlots) -> Result<(), SpinError> {
        self.ensure_idle()?;
        self.pinned = pinned;
        self.offset = compute_offset(&self.sectors, &self.pinned);
        Ok(())
    }

    fn start_spin_toward(&mut self, winner: String, now_ms: u64) -> Result<String, SpinError> {
        let plan = plan_spin(
            &self.sectors,
            self.offset,
            self.rotation,
            &winner,
            &self.config,
            &mut *self.rngs.turns(),
        )
        .ok_or(SpinError::EmptyWheel)?;
        log::debug!(
            "spin started: winner={winner} target={:.3} duration={}ms",
            plan.target_rotation,
            plan.duration_ms
        );
        self.phase = SpinPhase::Spinning(SpinState {
            start_rotation: self.rotation,
            target_rotation: plan.target_rotation,
            started_at_ms: now_ms,
            duration_ms: plan.duration_ms,
            winner: winner.clone(),
        });
        Ok(winner)
    }

    const fn ensure_idle(&self) -> Result<(), SpinError> {
        if self.phase.is_spinning() {
            return Err(SpinError::AlreadySpinning);
        }
        Ok(())
    }

    fn refresh_geometry(&mut self) {
        self.sectors = compute_sectors(&self.model);
        self.offset = compute_offset(&self.sectors, &self.pinned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FULL_TURN, WEIGHT_EPSILON};

    fn session(weights: &[(&str, f64)]) -> WheelSession {
        let model = WeightModel::from_entries(
            weights
                .iter()
                .map(|(name, weight)| ((*name).to_string(), *weight)),
        )
        .unwrap();
        WheelSession::new(model, PinnedSlots::default(), SpinConfig::default(), 42).unwrap()
    }

    fn run_to_completion(session: &mut WheelSession, start_ms: u64) -> String {
        let duration = session.config().duration_ms;
        let mut now = start_ms;
        loop {
            now += duration / 10;
            let outcome = session.tick(now);
            if let Some(winner) = outcome.completed {
                return winner;
            }
            assert!(now < start_ms + duration * 3, "spin never settled");
        }
    }

    #[test]
    fn spin_settles_on_the_drawn_winner() {
        let mut s = session(&[("A", 0.3), ("B", 0.7)]);
        let winner = s.spin(1000).unwrap();
        assert!(s.is_spinning());
        let settled = run_to_completion(&mut s, 1000);
        assert_eq!(settled, winner);
        assert!(!s.is_spinning());
        assert_eq!(s.last_winner(), Some(winner.as_str()));
        // The pointer rests over the winner's sector.
        assert_eq!(s.sector_at_pointer().unwrap().name, winner);
    }

    #[test]
    fn rotation_is_normalized_after_settling() {
        let mut s = session(&[("A", 0.5), ("B", 0.5)]);
        s.spin(0).unwrap();
        run_to_completion(&mut s, 0);
        assert!(s.rotation() >= 0.0 && s.rotation() < FULL_TURN);
    }

    #[test]
    fn spinning_blocks_concurrent_commands() {
        let mut s = session(&[("A", 0.5), ("B", 0.5)]);
        s.spin(0).unwrap();
        assert_eq!(s.spin(1), Err(SpinError::AlreadySpinning));
        assert_eq!(s.respin(1), Err(SpinError::AlreadySpinning));
        assert_eq!(s.edit_weight(0, 0.9), Err(SpinError::AlreadySpinning));
        assert_eq!(s.add_option("C", None), Err(SpinError::AlreadySpinning));
        assert_eq!(s.remove_option(0), Err(SpinError::AlreadySpinning));
        assert_eq!(s.reseed(9), Err(SpinError::AlreadySpinning));
    }

    #[test]
    fn respin_targets_the_previous_winner() {
        let mut s = session(&[("A", 0.5), ("B", 0.5)]);
        s.spin(0).unwrap();
        let first = run_to_completion(&mut s, 0);
        let again = s.respin(100_000).unwrap();
        assert_eq!(again, first);
        let settled = run_to_completion(&mut s, 100_000);
        assert_eq!(settled, first);
    }

    #[test]
    fn respin_without_history_draws_fresh() {
        let mut s = session(&[("A", 0.5), ("B", 0.5)]);
        let winner = s.respin(0).unwrap();
        assert!(winner == "A" || winner == "B");
    }

    #[test]
    fn respin_falls_back_when_winner_was_removed() {
        let mut s = session(&[("A", 1.0), ("B", 0.0)]);
        s.spin(0).unwrap();
        let first = run_to_completion(&mut s, 0);
        assert_eq!(first, "A");
        // Give B mass so the winner can be removed, then remove it.
        s.edit_weight(1, 0.5).unwrap();
        s.remove_option(0).unwrap();
        let again = s.respin(100_000).unwrap();
        assert_eq!(again, "B");
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let make = || {
            let model = WeightModel::from_entries(vec![
                ("A".to_string(), 0.2),
                ("B".to_string(), 0.5),
                ("C".to_string(), 0.3),
            ])
            .unwrap();
            WheelSession::new(model, PinnedSlots::default(), SpinConfig::default(), 7).unwrap()
        };
        let mut a = make();
        let mut b = make();
        for round in 0..5_u64 {
            let start = round * 10_000;
            assert_eq!(a.spin(start).unwrap(), b.spin(start).unwrap());
            assert_eq!(
                run_to_completion(&mut a, start),
                run_to_completion(&mut b, start)
            );
            assert!((a.rotation() - b.rotation()).abs() < WEIGHT_EPSILON);
        }
    }

    #[test]
    fn edits_rebuild_geometry() {
        let mut s = session(&[("A", 0.5), ("B", 0.5)]);
        s.edit_weight(0, 0.8).unwrap();
        let sectors = s.sectors();
        assert!((sectors[0].width() - 0.8 * FULL_TURN).abs() < 1e-9);

        s.add_option("C", Some(0.5)).unwrap();
        assert_eq!(s.model().len(), 3);
        let total: f64 = s.sectors().iter().map(Sector::width).sum();
        assert!((total - FULL_TURN).abs() < WEIGHT_EPSILON);
    }

    #[test]
    fn removal_clears_stale_pins_and_history() {
        let model = WeightModel::from_entries(vec![
            ("A".to_string(), 0.4),
            ("B".to_string(), 0.6),
        ])
        .unwrap();
        let pinned = PinnedSlots {
            top: Some("A".to_string()),
            bottom: Some("B".to_string()),
        };
        let mut s = WheelSession::new(model, pinned, SpinConfig::default(), 3).unwrap();
        s.remove_option(0).unwrap();
        assert_eq!(s.pinned().top, None);
        assert_eq!(s.pinned().bottom.as_deref(), Some("B"));
    }

    #[test]
    fn rename_follows_through_pins() {
        let model = WeightModel::from_entries(vec![
            ("A".to_string(), 0.5),
            ("B".to_string(), 0.5),
        ])
        .unwrap();
        let pinned = PinnedSlots {
            top: Some("A".to_string()),
            bottom: None,
        };
        let mut s = WheelSession::new(model, pinned, SpinConfig::default(), 3).unwrap();
        s.rename_option(0, "Alpha").unwrap();
        assert_eq!(s.pinned().top.as_deref(), Some("Alpha"));
        assert_eq!(s.model().get(0).unwrap().name, "Alpha");
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let model =
            WeightModel::from_entries(vec![("A".to_string(), 1.0)]).unwrap();
        let config = SpinConfig {
            duration_ms: 0,
            ..SpinConfig::default()
        };
        assert!(WheelSession::new(model, PinnedSlots::default(), config, 0).is_err());
    }

    #[test]
    fn each_spin_consumes_one_draw_per_stream() {
        let mut s = session(&[("A", 0.5), ("B", 0.5)]);
        assert_eq!(s.rng_draws(), (0, 0));
        s.spin(0).unwrap();
        let (draws, turns) = s.rng_draws();
        assert_eq!(draws, 1);
        assert!(turns >= 1);
        run_to_completion(&mut s, 0);
        // Settling consumes nothing further.
        assert_eq!(s.rng_draws().0, 1);

        // A rejected spin consumes nothing.
        s.spin(100_000).unwrap();
        let before = s.rng_draws();
        assert_eq!(s.spin(100_001), Err(SpinError::AlreadySpinning));
        assert_eq!(s.rng_draws(), before);
    }

    #[test]
    fn tick_while_idle_reports_current_rotation() {
        let mut s = session(&[("A", 1.0)]);
        let outcome = s.tick(500);
        assert_eq!(outcome.completed, None);
        assert!(outcome.rotation.abs() < WEIGHT_EPSILON);
    }
}
