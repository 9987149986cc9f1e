//! zkmint-common
//!
//! Shared types for the zkmint pipeline: proof artifacts, the two verifier
//! calldata shapes, the calldata transcoder, and decoding of the artwork the
//! token contract generates on chain.

pub mod artwork;
pub mod calldata;
pub mod error;
pub mod types;

pub use artwork::{extract_artwork, ArtworkAsset, SVG_DATA_URI_HEADER};
pub use calldata::{parse_calldata, parse_groth16_calldata, parse_plonk_calldata, CalldataTranscoder};
pub use error::{ArtworkError, CalldataError};
pub use types::{parse_uint, parse_uint_str, CalldataBundle, ProofArtifact, ProofSystem};
