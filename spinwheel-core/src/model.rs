//! Weighted option set with probability conservation.
//!
//! The model owns an ordered list of named options whose weights always sum
//! to 1.0 within [`WEIGHT_EPSILON`] after every mutation. Editing one weight
//! redistributes the difference across the other options in proportion to
//! their share of the remaining mass.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::WEIGHT_EPSILON;
use crate::numbers::clamp_unit;

/// A single named option on the wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelOption {
    pub name: String,
    pub weight: f64,
}

/// Errors raised by weight-model construction and edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("option name is empty")]
    EmptyName,
    #[error("option named {0:?} already exists")]
    DuplicateName(String),
    #[error("option index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot remove the last remaining option")]
    LastOption,
    #[error("edit would leave every weight at zero")]
    AllZeroWeights,
    #[error("weight model requires at least one option")]
    Empty,
}

/// Ordered set of weighted options. Never empty, never all-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightModel {
    options: Vec<WheelOption>,
}

impl WeightModel {
    /// Build a model from ordered `(name, weight)` records. Weights need not
    /// pre-sum to 1; they are clamped and normalized on load.
    ///
    /// # Errors
    ///
    /// Fails on empty input, invalid or duplicate names, or an all-zero
    /// weight set.
    pub fn from_entries<I>(entries: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut model = Self {
            options: Vec::new(),
        };
        for (name, weight) in entries {
            let name = model.validate_name(&name, None)?;
            model.options.push(WheelOption {
                name,
                weight: clamp_unit(weight),
            });
        }
        if model.options.is_empty() {
            return Err(ModelError::Empty);
        }
        if model.weight_sum() < WEIGHT_EPSILON {
            return Err(ModelError::AllZeroWeights);
        }
        model.normalize();
        Ok(model)
    }

    /// Rebuild a model from the flat pairs produced by [`Self::to_pairs`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::from_entries`].
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self::from_entries(pairs)
    }

    /// Flatten the model into ordered `(name, weight)` pairs for persistence.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, f64)> {
        self.options
            .iter()
            .map(|opt| (opt.name.clone(), opt.weight))
            .collect()
    }

    /// Borrow the ordered option list.
    #[must_use]
    pub fn options(&self) -> &[WheelOption] {
        &self.options
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WheelOption> {
        self.options.get(index)
    }

    /// Current total weight; 1.0 within tolerance after any mutation.
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.options.iter().map(|opt| opt.weight).sum()
    }

    /// Rescale all weights by `1/sum` when the sum is positive; an all-zero
    /// set is left unchanged. Idempotent.
    pub fn normalize(&mut self) {
        let sum = self.weight_sum();
        if sum > 0.0 {
            for opt in &mut self.options {
                opt.weight /= sum;
            }
        }
    }

    /// Set one option's weight, conserving the total at 1.0 by redistributing
    /// the delta across the other options in proportion to their share of the
    /// remaining mass. Each other weight is floored at zero; a final
    /// [`Self::normalize`] absorbs floor-clamping losses.
    ///
    /// Non-finite and out-of-range input is clamped, never rejected. Edits
    /// smaller than the tolerance are no-ops.
    ///
    /// # Errors
    ///
    /// Rejects unknown indices and edits that would zero out every weight.
    pub fn set_weight(&mut self, index: usize, new_weight: f64) -> Result<(), ModelError> {
        let len = self.options.len();
        let Some(current) = self.options.get(index) else {
            return Err(ModelError::IndexOutOfRange { index, len });
        };
        let clamped = clamp_unit(new_weight);
        let delta = clamped - current.weight;
        if delta.abs() < WEIGHT_EPSILON {
            return Ok(());
        }
        let other_sum: f64 = self
            .options
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, opt)| opt.weight)
            .sum();
        if clamped < WEIGHT_EPSILON && other_sum < WEIGHT_EPSILON {
            return Err(ModelError::AllZeroWeights);
        }
        self.options[index].weight = clamped;
        if other_sum > 0.0 {
            for (i, opt) in self.options.iter_mut().enumerate() {
                if i == index {
                    continue;
                }
                let share = opt.weight / other_sum;
                opt.weight = (opt.weight - delta * share).max(0.0);
            }
        }
        self.normalize();
        Ok(())
    }

    /// Append a new option and renormalize.
    ///
    /// # Errors
    ///
    /// Rejects empty (after trimming) or duplicate names.
    pub fn add_option(&mut self, name: &str, weight: f64) -> Result<(), ModelError> {
        let name = self.validate_name(name, None)?;
        self.options.push(WheelOption {
            name,
            weight: clamp_unit(weight),
        });
        self.normalize();
        Ok(())
    }

    /// Remove an option and renormalize the survivors.
    ///
    /// # Errors
    ///
    /// Rejects unknown indices, removal of the last remaining option, and
    /// removals that would leave an all-zero survivor set.
    pub fn remove_option(&mut self, index: usize) -> Result<WheelOption, ModelError> {
        let len = self.options.len();
        if index >= len {
            return Err(ModelError::IndexOutOfRange { index, len });
        }
        if len == 1 {
            return Err(ModelError::LastOption);
        }
        let survivor_sum = self.weight_sum() - self.options[index].weight;
        if survivor_sum < WEIGHT_EPSILON {
            return Err(ModelError::AllZeroWeights);
        }
        let removed = self.options.remove(index);
        self.normalize();
        Ok(removed)
    }

    /// Rename an option in place. No renormalization is needed.
    ///
    /// # Errors
    ///
    /// Rejects unknown indices and empty or duplicate names.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<(), ModelError> {
        let len = self.options.len();
        if index >= len {
            return Err(ModelError::IndexOutOfRange { index, len });
        }
        let name = self.validate_name(new_name, Some(index))?;
        self.options[index].name = name;
        Ok(())
    }

    fn validate_name(&self, name: &str, skip: Option<usize>) -> Result<String, ModelError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyName);
        }
        let duplicate = self
            .options
            .iter()
            .enumerate()
            .any(|(i, opt)| Some(i) != skip && opt.name == trimmed);
        if duplicate {
            return Err(ModelError::DuplicateName(trimmed.to_string()));
        }
        Ok(trimmed.to_string())
    }
}
