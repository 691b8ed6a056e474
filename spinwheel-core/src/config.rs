//! Wheel data input, including the legacy bare-array JSON document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ModelError, WeightModel};

/// Errors raised while loading wheel data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse wheel data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// One option record as it appears in the wheel data document.
///
/// Older documents capitalize the field names and carry derived columns
/// (`Votes`, `Percent`, `Angle_deg`); the aliases accept them and the
/// derived columns are ignored on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Prob")]
    pub weight: f64,
}

/// The wheel data document: a bare JSON array of item records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WheelData {
    pub items: Vec<ItemRecord>,
}

impl WheelData {
    /// Parse a wheel data document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the records into a weight model.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Model`] when the records violate a model
    /// invariant (empty list, duplicate names, all-zero weights).
    pub fn into_model(self) -> Result<WeightModel, ConfigError> {
        let model = WeightModel::from_entries(
            self.items.into_iter().map(|item| (item.name, item.weight)),
        )?;
        Ok(model)
    }
}
