//! Special ordered sets.

use std::collections::BTreeSet;

use reopt_expr::ids::{SosId, VariableId};

use crate::model::error::ModelError;
use crate::model::{Model, ModelChange};
use crate::types::{SosKind, SosSet};

impl Model {
    /// Register a special ordered set over existing variables.
    ///
    /// Weights default to `1..=n` in the given member order. Members are
    /// stored in ascending weight order, which is the adjacency order SOS2
    /// uses.
    pub fn add_sos(
        &mut self,
        kind: SosKind,
        members: Vec<VariableId>,
        weights: Option<Vec<f64>>,
    ) -> Result<SosId, ModelError> {
        if members.is_empty() {
            return Err(ModelError::InvalidSosSet {
                reason: "set has no members".to_string(),
            });
        }
        let weights = weights.unwrap_or_else(|| (1..=members.len()).map(|w| w as f64).collect());
        if weights.len() != members.len() {
            return Err(ModelError::ArityMismatch {
                items: members.len(),
                coefficients: weights.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for var_id in &members {
            self.ensure_variable_exists(*var_id)?;
            if !seen.insert(*var_id) {
                return Err(ModelError::InvalidSosSet {
                    reason: format!("variable {var_id} appears more than once"),
                });
            }
        }
        if let Some(weight) = weights.iter().find(|w| !w.is_finite()) {
            return Err(ModelError::InvalidSosSet {
                reason: format!("weight {weight} is not finite"),
            });
        }

        let mut ordered: Vec<(VariableId, f64)> = members.into_iter().zip(weights).collect();
        ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
        if let Some(pair) = ordered.windows(2).find(|pair| pair[0].1 == pair[1].1) {
            return Err(ModelError::InvalidSosSet {
                reason: format!("weight {} is used twice", pair[0].1),
            });
        }
        let (members, weights): (Vec<_>, Vec<_>) = ordered.into_iter().unzip();

        let id = SosId::new(self.sos_sets.len() as u32);
        let set = SosSet {
            kind,
            members,
            weights,
        };
        self.sos_sets.push(set.clone());
        tracing::debug!(
            component = "model",
            operation = "add_sos",
            status = "success",
            sos_id = id.inner(),
            kind = kind.as_str(),
            members = set.members.len(),
            "Added special ordered set"
        );
        self.record_change(ModelChange::AddSos { id, set });
        Ok(id)
    }

    /// Get a special ordered set by id.
    pub fn sos_set(&self, sos_id: SosId) -> Result<&SosSet, ModelError> {
        self.sos_sets
            .get(sos_id.index())
            .ok_or(ModelError::UnknownSos(sos_id))
    }

    /// All special ordered sets in registration order.
    pub fn sos_sets(&self) -> impl Iterator<Item = (SosId, &SosSet)> {
        self.sos_sets
            .iter()
            .enumerate()
            .map(|(index, set)| (SosId::new(index as u32), set))
    }

    pub fn num_sos_sets(&self) -> usize {
        self.sos_sets.len()
    }
}
