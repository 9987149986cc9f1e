//! Decoding of contract-generated token artwork.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use crate::error::ArtworkError;

/// Header of the only image encoding the token contract emits.
pub const SVG_DATA_URI_HEADER: &str = "data:image/svg+xml;base64";

/// SVG document recovered from a token's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkAsset {
    pub svg_text: String,
}

/// Decode the `image` data URI embedded in a token URI JSON document.
pub fn extract_artwork(token_uri: &str) -> Result<ArtworkAsset, ArtworkError> {
    let metadata: Value = serde_json::from_str(token_uri)?;
    let image = metadata
        .get("image")
        .and_then(Value::as_str)
        .ok_or(ArtworkError::MissingImage)?;

    let (header, payload) = image
        .split_once(',')
        .ok_or_else(|| ArtworkError::UnsupportedImage(truncate(image)))?;
    if !header.eq_ignore_ascii_case(SVG_DATA_URI_HEADER) {
        return Err(ArtworkError::UnsupportedImage(header.to_string()));
    }

    let bytes = STANDARD.decode(payload.trim())?;
    let svg_text = String::from_utf8(bytes)?;
    Ok(ArtworkAsset { svg_text })
}

fn truncate(s: &str) -> String {
    s.chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_svg() {
        let asset =
            extract_artwork(r#"{"image":"data:image/svg+xml;base64,PHN2Zz4="}"#).unwrap();
        assert_eq!(asset.svg_text, "<svg>");
    }

    #[test]
    fn test_ignores_other_metadata_fields() {
        let uri = r#"{"name":"Token #10","attributes":[{"trait_type":"bg","value":3}],"image":"data:image/svg+xml;base64,PHN2Zz48L3N2Zz4="}"#;
        assert_eq!(extract_artwork(uri).unwrap().svg_text, "<svg></svg>");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            extract_artwork("not json"),
            Err(ArtworkError::Metadata(_))
        ));
    }

    #[test]
    fn test_missing_image() {
        assert!(matches!(
            extract_artwork(r#"{"name":"x"}"#),
            Err(ArtworkError::MissingImage)
        ));
        assert!(matches!(
            extract_artwork(r#"{"image":42}"#),
            Err(ArtworkError::MissingImage)
        ));
    }

    #[test]
    fn test_unsupported_uri() {
        assert!(matches!(
            extract_artwork(r#"{"image":"ipfs://bafy"}"#),
            Err(ArtworkError::UnsupportedImage(_))
        ));
        assert!(matches!(
            extract_artwork(r#"{"image":"data:image/png;base64,AAAA"}"#),
            Err(ArtworkError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_bad_base64() {
        assert!(matches!(
            extract_artwork(r#"{"image":"data:image/svg+xml;base64,!!!"}"#),
            Err(ArtworkError::Base64(_))
        ));
    }
}
