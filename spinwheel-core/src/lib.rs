//! Spinwheel Core
//!
//! Platform-agnostic logic for a weighted-random spinning wheel: the weight
//! model, sector geometry, spin planning and animation state, and the outcome
//! ledger. This crate provides all wheel mechanics without UI or
//! platform-specific dependencies.

pub mod config;
pub mod constants;
pub mod ledger;
pub mod model;
pub mod numbers;
pub mod rng;
pub mod sampler;
pub mod sector;
pub mod session;
pub mod spin;
pub mod stats;

// Re-export commonly used types
pub use config::{ConfigError, ItemRecord, WheelData};
pub use ledger::{HistoryEntry, LedgerStore, MemoryLedger, record_outcome, user_id_for};
pub use model::{ModelError, WeightModel, WheelOption};
pub use rng::{CountingRng, RngBundle};
pub use sampler::{draw, draw_with};
pub use sector::{
    PinnedSlots, Sector, SectorList, compute_offset, compute_sectors, find_at_angle,
    normalize_angle,
};
pub use session::{SpinError, TickOutcome, WheelSession};
pub use spin::{
    SpinConfig, SpinConfigError, SpinPhase, SpinPlan, SpinState, ease_out_cubic, plan_spin,
};
pub use stats::{
    UserActivity, WinnerTally, day_index, recent, tally_results, user_activity, window,
};

/// Trait for abstracting configuration loading
/// Platform-specific implementations should provide this
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the wheel data document from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the wheel data cannot be loaded.
    fn load_wheel_data(&self) -> Result<WheelData, Self::Error>;

    /// Load the spin configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_spin_config(&self) -> Result<SpinConfig, Self::Error>;
}

/// Trait for abstracting persisted model state
/// Platform-specific implementations should provide this
pub trait StateStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save the edited weight model
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be saved.
    fn save_model(&self, pairs: &[(String, f64)]) -> Result<(), Self::Error>;

    /// Load the previously saved weight model, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the saved model cannot be loaded.
    fn load_model(&self) -> Result<Option<Vec<(String, f64)>>, Self::Error>;

    /// Discard the saved weight model
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn clear_model(&self) -> Result<(), Self::Error>;
}

/// Trait the presentation layer implements to draw the wheel. The core calls
/// it with derived geometry and never renders anything itself.
pub trait WheelRenderer {
    fn render(&mut self, sectors: &[Sector], rotation: f64);
}

/// Main engine for constructing and persisting wheel sessions
pub struct WheelEngine<L, S>
where
    L: ConfigLoader,
    S: StateStore,
{
    config_loader: L,
    state_store: S,
    pinned: PinnedSlots,
}

impl<L, S> WheelEngine<L, S>
where
    L: ConfigLoader,
    S: StateStore,
{
    /// Create a new engine with the provided config loader and state store
    pub const fn new(config_loader: L, state_store: S) -> Self {
        Self {
            config_loader,
            state_store,
            pinned: PinnedSlots {
                top: None,
                bottom: None,
            },
        }
    }

    /// Set the pinned-slot assignment applied to every created session
    #[must_use]
    pub fn with_pinned(mut self, pinned: PinnedSlots) -> Self {
        self.pinned = pinned;
        self
    }

    /// Construct a session, preferring the persisted model over the initial
    /// wheel data when one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a saved nor an initial model can be
    /// loaded and validated, or if the spin configuration is invalid.
    pub fn create_session(&self, seed: u64) -> Result<WheelSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let model = if let Some(pairs) = self.state_store.load_model().map_err(Into::into)? {
            WeightModel::from_pairs(pairs)?
        } else {
            let data = self.config_loader.load_wheel_data().map_err(Into::into)?;
            data.into_model()?
        };
        let spin_config = self
            .config_loader
            .load_spin_config()
            .map_err(Into::into)?;
        let session = WheelSession::new(model, self.pinned.clone(), spin_config, seed)?;
        Ok(session)
    }

    /// Persist a session's current weight model
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be saved.
    pub fn save_session(&self, session: &WheelSession) -> Result<(), S::Error> {
        self.state_store.save_model(&session.model().to_pairs())
    }

    /// Discard the persisted model and rebuild a session from the initial
    /// wheel data.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be cleared or the initial data
    /// cannot be loaded.
    pub fn reset(&self, seed: u64) -> Result<WheelSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        self.state_store.clear_model().map_err(Into::into)?;
        self.create_session(seed)
    }
}
