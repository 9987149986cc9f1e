//! Verifier calldata transcoding.
//!
//! The prover exports call arguments as a run of top-level values, e.g.
//!
//! ```text
//! plonk:    ["0x..","0x.."]["0x..","0x.."]
//! groth16:  ["0x..","0x.."],[["0x..","0x.."],["0x..","0x.."]],["0x..","0x.."],["0x..",...]
//! ```
//!
//! Older PLONK exports emit the proof as one bare hex token followed by a comma:
//! `0xabcd...,["0x.."]`. The blob is split into top-level values first and the
//! sequence is then matched against the grammar of the selected proof system, so
//! both layouts parse without guessing at split points.

use num_bigint::BigUint;
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    error::CalldataError,
    types::{parse_uint, CalldataBundle, ProofArtifact, ProofSystem},
};

/// One top-level value of an exported calldata blob.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Json(Value),
    BareHex(String),
}

/// Turns exported prover calldata into a [`CalldataBundle`] for one verifier
/// ABI shape.
#[derive(Debug, Clone)]
pub struct CalldataTranscoder {
    system: ProofSystem,
    expected_signals: Option<usize>,
}

impl CalldataTranscoder {
    pub fn new(system: ProofSystem) -> Self {
        Self {
            system,
            expected_signals: None,
        }
    }

    /// Require exactly `count` public signals, matching the deployed verifier.
    pub fn with_expected_signals(mut self, count: usize) -> Self {
        self.expected_signals = Some(count);
        self
    }

    pub fn system(&self) -> ProofSystem {
        self.system
    }

    /// Public signal count enforced on every transcode, if any.
    pub fn expected_signals(&self) -> Option<usize> {
        self.expected_signals
    }

    /// Parse `calldata` and check its signals against the artifact it was
    /// exported from.
    pub fn transcode(
        &self,
        artifact: &ProofArtifact,
        calldata: &str,
    ) -> Result<CalldataBundle, CalldataError> {
        let result = parse_calldata(self.system, calldata).and_then(|bundle| {
            check_signals(&bundle, &artifact.public_signals, self.expected_signals)?;
            Ok(bundle)
        });

        match &result {
            Ok(bundle) => debug!(
                system = %self.system,
                proof_len = bundle.proof_len(),
                signals = bundle.signals().len(),
                "transcoded calldata"
            ),
            Err(err) => error!(
                system = %self.system,
                code = err.error_code(),
                raw = %calldata,
                "failed to transcode calldata: {}",
                err
            ),
        }
        result
    }
}

/// Parse a calldata blob according to the grammar of `system`.
pub fn parse_calldata(system: ProofSystem, blob: &str) -> Result<CalldataBundle, CalldataError> {
    let segments = split_segments(blob)?;
    match system {
        ProofSystem::Plonk => plonk_from_segments(segments),
        ProofSystem::Groth16 => groth16_from_segments(segments),
    }
}

pub fn parse_plonk_calldata(blob: &str) -> Result<CalldataBundle, CalldataError> {
    parse_calldata(ProofSystem::Plonk, blob)
}

pub fn parse_groth16_calldata(blob: &str) -> Result<CalldataBundle, CalldataError> {
    parse_calldata(ProofSystem::Groth16, blob)
}

fn check_signals(
    bundle: &CalldataBundle,
    artifact_signals: &[BigUint],
    expected: Option<usize>,
) -> Result<(), CalldataError> {
    let signals = bundle.signals();
    if let Some(expected) = expected {
        if signals.len() != expected {
            return Err(CalldataError::SignalCount {
                expected,
                actual: signals.len(),
            });
        }
    }
    if signals.len() != artifact_signals.len() {
        return Err(CalldataError::SignalCount {
            expected: artifact_signals.len(),
            actual: signals.len(),
        });
    }
    if let Some(index) = signals
        .iter()
        .zip(artifact_signals)
        .position(|(ours, theirs)| ours != theirs)
    {
        return Err(CalldataError::SignalMismatch { index });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKENIZER
// ═══════════════════════════════════════════════════════════════════════════════

fn split_segments(blob: &str) -> Result<Vec<Segment>, CalldataError> {
    let mut segments = Vec::new();
    let mut rest = blob;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        if rest.starts_with("0x") || rest.starts_with("0X") {
            let end = rest[2..]
                .find(|c: char| !c.is_ascii_hexdigit())
                .map(|i| i + 2)
                .unwrap_or(rest.len());
            segments.push(Segment::BareHex(rest[..end].to_string()));
            rest = &rest[end..];
            continue;
        }

        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => {
                let consumed = stream.byte_offset();
                segments.push(Segment::Json(value));
                rest = &rest[consumed..];
            }
            Some(Err(err)) => return Err(err.into()),
            None => break,
        }
    }

    Ok(segments)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLONK
// ═══════════════════════════════════════════════════════════════════════════════

fn plonk_from_segments(segments: Vec<Segment>) -> Result<CalldataBundle, CalldataError> {
    let [proof, signals]: [Segment; 2] = segments.try_into().map_err(|found: Vec<Segment>| {
        CalldataError::Shape(format!(
            "plonk calldata needs a proof and a signal array, found {} top-level values",
            found.len()
        ))
    })?;

    let proof_bytes = match proof {
        Segment::BareHex(hex) => decode_hex(&hex)?,
        Segment::Json(Value::String(hex)) => decode_hex(&hex)?,
        Segment::Json(Value::Array(words)) => {
            let mut digits = String::new();
            for word in &words {
                let word = word.as_str().ok_or_else(|| {
                    CalldataError::Shape(format!("plonk proof element is not a string: {word}"))
                })?;
                digits.push_str(strip_0x(word));
            }
            hex::decode(&digits)?
        }
        Segment::Json(other) => {
            return Err(CalldataError::Shape(format!(
                "plonk proof must be a hex array or hex string, found {other}"
            )))
        }
    };

    let signals = match signals {
        Segment::Json(value) => uint_array(&value, None, "plonk signals")?,
        Segment::BareHex(hex) => {
            return Err(CalldataError::Shape(format!(
                "plonk signals must be an array, found bare hex {hex}"
            )))
        }
    };

    Ok(CalldataBundle::Plonk {
        proof_bytes,
        signals,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// GROTH16
// ═══════════════════════════════════════════════════════════════════════════════

fn groth16_from_segments(segments: Vec<Segment>) -> Result<CalldataBundle, CalldataError> {
    let values = segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Json(value) => Ok(value),
            Segment::BareHex(hex) => Err(CalldataError::Shape(format!(
                "groth16 calldata cannot contain bare hex {hex}"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let [a, b, c, signals]: [Value; 4] = values.try_into().map_err(|found: Vec<Value>| {
        CalldataError::Shape(format!(
            "groth16 calldata needs a, b, c and signals, found {} top-level values",
            found.len()
        ))
    })?;

    let b_rows = b
        .as_array()
        .filter(|rows| rows.len() == 2)
        .ok_or_else(|| CalldataError::Shape(format!("groth16 `b` must be a 2x2 matrix: {b}")))?;

    Ok(CalldataBundle::Groth16 {
        a: pair(&a, "a")?,
        b: [pair(&b_rows[0], "b[0]")?, pair(&b_rows[1], "b[1]")?],
        c: pair(&c, "c")?,
        signals: uint_array(&signals, None, "groth16 signals")?,
    })
}

fn pair(value: &Value, what: &str) -> Result<[BigUint; 2], CalldataError> {
    uint_array(value, Some(2), what)?
        .try_into()
        .map_err(|_| CalldataError::Shape(format!("`{what}` must have two elements")))
}

fn uint_array(value: &Value, len: Option<usize>, what: &str) -> Result<Vec<BigUint>, CalldataError> {
    let items = value
        .as_array()
        .ok_or_else(|| CalldataError::Shape(format!("`{what}` must be an array, found {value}")))?;
    if let Some(len) = len {
        if items.len() != len {
            return Err(CalldataError::Shape(format!(
                "`{what}` must have {len} elements, found {}",
                items.len()
            )));
        }
    }
    items.iter().map(parse_uint).collect()
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn decode_hex(s: &str) -> Result<Vec<u8>, CalldataError> {
    Ok(hex::decode(strip_0x(s))?)
}
