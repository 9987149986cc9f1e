//! Named circuit inputs.

use std::{collections::BTreeMap, path::Path};

use num_bigint::BigUint;
use serde_json::{Map, Value};

use crate::error::ProverError;

/// Private circuit inputs keyed by signal name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessInputs {
    inputs: BTreeMap<String, BigUint>,
}

impl WitnessInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<BigUint>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<BigUint>) {
        self.inputs.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&BigUint> {
        self.inputs.get(name)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Parse a flat JSON object of integers (numbers or decimal/hex strings).
    pub fn from_json(value: &Value) -> Result<Self, ProverError> {
        let object = value
            .as_object()
            .ok_or_else(|| ProverError::Witness("witness must be a json object".into()))?;

        let mut witness = Self::new();
        for (name, raw) in object {
            let parsed = zkmint_common::parse_uint(raw)
                .map_err(|err| ProverError::Witness(format!("input `{name}`: {err}")))?;
            witness.insert(name.clone(), parsed);
        }
        Ok(witness)
    }

    pub async fn from_file(path: &Path) -> Result<Self, ProverError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| ProverError::io(path, err))?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|err| ProverError::Witness(format!("{}: {err}", path.display())))?;
        Self::from_json(&value)
    }

    /// JSON object with decimal string values, the form circom witness
    /// calculators accept for field elements of any size.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .inputs
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.to_str_radix(10))))
            .collect();
        Value::Object(map)
    }
}
