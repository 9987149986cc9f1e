//! Proof artifacts and verifier call bundles.

use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CalldataError;

/// Proving scheme, which also fixes the verifier ABI shape of `mintNFT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofSystem {
    /// `mintNFT(bytes, uint256[])`
    Plonk,
    /// `mintNFT(uint256[2], uint256[2][2], uint256[2], uint256[])`
    Groth16,
}

impl ProofSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofSystem::Plonk => "plonk",
            ProofSystem::Groth16 => "groth16",
        }
    }
}

impl fmt::Display for ProofSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProofSystem {
    type Err = CalldataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plonk" => Ok(ProofSystem::Plonk),
            "groth16" => Ok(ProofSystem::Groth16),
            other => Err(CalldataError::Shape(format!("unknown proof system `{other}`"))),
        }
    }
}

/// Output of a full prove: the scheme-specific proof object plus its ordered
/// public signals.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofArtifact {
    pub proof: Value,
    pub public_signals: Vec<BigUint>,
}

impl ProofArtifact {
    pub fn new(proof: Value, public_signals: Vec<BigUint>) -> Self {
        Self {
            proof,
            public_signals,
        }
    }

    /// Build an artifact from the prover's `proof.json` and `public.json`
    /// documents. Public signals arrive as decimal strings.
    pub fn from_json(proof: Value, public: &Value) -> Result<Self, CalldataError> {
        let signals = public
            .as_array()
            .ok_or_else(|| CalldataError::Shape("public signals must be a json array".into()))?
            .iter()
            .map(parse_uint)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(proof, signals))
    }

    /// Public signals in the decimal string form the prover emits.
    pub fn public_signals_json(&self) -> Value {
        Value::Array(
            self.public_signals
                .iter()
                .map(|s| Value::String(s.to_str_radix(10)))
                .collect(),
        )
    }
}

/// Verifier call arguments for one of the two supported ABI shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalldataBundle {
    Plonk {
        proof_bytes: Vec<u8>,
        signals: Vec<BigUint>,
    },
    Groth16 {
        a: [BigUint; 2],
        b: [[BigUint; 2]; 2],
        c: [BigUint; 2],
        signals: Vec<BigUint>,
    },
}

impl CalldataBundle {
    pub fn system(&self) -> ProofSystem {
        match self {
            CalldataBundle::Plonk { .. } => ProofSystem::Plonk,
            CalldataBundle::Groth16 { .. } => ProofSystem::Groth16,
        }
    }

    pub fn signals(&self) -> &[BigUint] {
        match self {
            CalldataBundle::Plonk { signals, .. } | CalldataBundle::Groth16 { signals, .. } => {
                signals
            }
        }
    }

    /// Size of the proof portion of the call in bytes.
    pub fn proof_len(&self) -> usize {
        match self {
            CalldataBundle::Plonk { proof_bytes, .. } => proof_bytes.len(),
            CalldataBundle::Groth16 { .. } => 8 * 32,
        }
    }

    /// `0x`-prefixed hex of the PLONK proof bytes.
    pub fn proof_hex(&self) -> Option<String> {
        match self {
            CalldataBundle::Plonk { proof_bytes, .. } => {
                Some(format!("0x{}", hex::encode(proof_bytes)))
            }
            CalldataBundle::Groth16 { .. } => None,
        }
    }
}

/// Renders the bundle in the prover's exported calldata layout, so that it can
/// be reparsed by [`crate::calldata::parse_calldata`].
impl fmt::Display for CalldataBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalldataBundle::Plonk {
                proof_bytes,
                signals,
            } => {
                let words: Vec<String> = proof_bytes
                    .chunks(32)
                    .map(|word| format!("\"0x{}\"", hex::encode(word)))
                    .collect();
                write!(f, "[{}]{}", words.join(","), word_list(signals))
            }
            CalldataBundle::Groth16 { a, b, c, signals } => write!(
                f,
                "{},[{},{}],{},{}",
                word_list(a),
                word_list(&b[0]),
                word_list(&b[1]),
                word_list(c),
                word_list(signals)
            ),
        }
    }
}

fn word_list(values: &[BigUint]) -> String {
    let words: Vec<String> = values.iter().map(|v| format!("\"0x{:064x}\"", v)).collect();
    format!("[{}]", words.join(","))
}

/// Parse an unsigned integer from a JSON string (`0x` hex or decimal) or a JSON
/// unsigned number.
pub fn parse_uint(value: &Value) -> Result<BigUint, CalldataError> {
    match value {
        Value::String(s) => parse_uint_str(s),
        Value::Number(n) => n
            .as_u64()
            .map(BigUint::from)
            .ok_or_else(|| CalldataError::Integer(n.to_string())),
        other => Err(CalldataError::Integer(other.to_string())),
    }
}

pub fn parse_uint_str(s: &str) -> Result<BigUint, CalldataError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => BigUint::parse_bytes(digits.as_bytes(), 16),
        None => BigUint::parse_bytes(s.as_bytes(), 10),
    };
    parsed.ok_or_else(|| CalldataError::Integer(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_uint_forms() {
        assert_eq!(parse_uint(&json!("0x1f")).unwrap(), BigUint::from(31u32));
        assert_eq!(parse_uint(&json!("31")).unwrap(), BigUint::from(31u32));
        assert_eq!(parse_uint(&json!(31)).unwrap(), BigUint::from(31u32));
        assert!(parse_uint(&json!("0xzz")).is_err());
        assert!(parse_uint(&json!(-1)).is_err());
        assert!(parse_uint(&json!(null)).is_err());
    }

    #[test]
    fn test_parse_uint_exceeds_u64() {
        let field = "21888242871839275222246405745257275088548364400416034343698204186575808495616";
        let parsed = parse_uint_str(field).unwrap();
        assert_eq!(parsed.to_str_radix(10), field);
    }

    #[test]
    fn test_artifact_from_json() {
        let artifact =
            ProofArtifact::from_json(json!({"protocol": "plonk"}), &json!(["1", "42"])).unwrap();
        assert_eq!(
            artifact.public_signals,
            vec![BigUint::from(1u32), BigUint::from(42u32)]
        );
        assert_eq!(artifact.public_signals_json(), json!(["1", "42"]));
        assert!(ProofArtifact::from_json(json!({}), &json!({"not": "array"})).is_err());
    }

    #[test]
    fn test_proof_system_from_str() {
        assert_eq!("PLONK".parse::<ProofSystem>().unwrap(), ProofSystem::Plonk);
        assert_eq!("groth16".parse::<ProofSystem>().unwrap(), ProofSystem::Groth16);
        assert!("fflonk".parse::<ProofSystem>().is_err());
    }

    #[test]
    fn test_proof_hex() {
        let bundle = CalldataBundle::Plonk {
            proof_bytes: vec![0xab, 0xcd],
            signals: vec![],
        };
        assert_eq!(bundle.proof_hex().as_deref(), Some("0xabcd"));
        assert_eq!(bundle.proof_len(), 2);
        assert_eq!(bundle.system(), ProofSystem::Plonk);
    }
}
