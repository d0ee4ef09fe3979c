//! Opaque region token codec.
//!
//! A region token is the API-facing handle for one map tile: the
//! `(zoom, x, y)` triple joined with `|` and base64-encoded. Clients
//! treat it as an opaque cursor and hand it back to drill into a
//! cluster; decoding is the single validation gate between client input
//! and the tile/SQL math downstream, so it rejects anything malformed
//! instead of letting garbage propagate.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// A decoded region token: one tile address plus its zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Zoom level of the tile.
    pub z: u8,
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
}

/// Errors produced by [`decode_region`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionTokenError {
    /// The token is not valid base64 or does not decode to UTF-8.
    #[error("Invalid region token encoding")]
    Encoding,

    /// The decoded payload is not three `|`-separated integers.
    #[error("Invalid region token payload")]
    Payload,
}

/// Encodes a tile address into an opaque, URL-safe token.
#[must_use]
pub fn encode_region(z: u8, x: u32, y: u32) -> String {
    URL_SAFE_NO_PAD.encode(format!("{z}|{x}|{y}"))
}

/// Decodes a region token back into its tile address.
///
/// # Errors
///
/// Returns [`RegionTokenError`] if the token is not base64, not UTF-8,
/// does not split into exactly three segments, or any segment fails
/// integer parsing.
pub fn decode_region(token: &str) -> Result<Region, RegionTokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| RegionTokenError::Encoding)?;
    let payload = String::from_utf8(bytes).map_err(|_| RegionTokenError::Encoding)?;

    let segments: Vec<&str> = payload.split('|').collect();
    let [z, x, y] = segments.as_slice() else {
        return Err(RegionTokenError::Payload);
    };

    Ok(Region {
        z: z.parse().map_err(|_| RegionTokenError::Payload)?,
        x: x.parse().map_err(|_| RegionTokenError::Payload)?,
        y: y.parse().map_err(|_| RegionTokenError::Payload)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_tile_addresses() {
        for (z, x, y) in [(0u8, 0u32, 0u32), (8, 142, 84), (16, 38_153, 21_234)] {
            let token = encode_region(z, x, y);
            assert_eq!(decode_region(&token), Ok(Region { z, x, y }));
        }
    }

    #[test]
    fn rejects_non_base64_garbage() {
        assert_eq!(
            decode_region("not-a-valid-token-base64!!"),
            Err(RegionTokenError::Encoding)
        );
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let token = URL_SAFE_NO_PAD.encode("8|142");
        assert_eq!(decode_region(&token), Err(RegionTokenError::Payload));

        let token = URL_SAFE_NO_PAD.encode("8|142|84|1");
        assert_eq!(decode_region(&token), Err(RegionTokenError::Payload));
    }

    #[test]
    fn rejects_non_numeric_segments() {
        let token = URL_SAFE_NO_PAD.encode("8|abc|84");
        assert_eq!(decode_region(&token), Err(RegionTokenError::Payload));

        let token = URL_SAFE_NO_PAD.encode("8|-1|84");
        assert_eq!(decode_region(&token), Err(RegionTokenError::Payload));
    }

    #[test]
    fn tokens_are_url_safe() {
        let token = encode_region(16, 65_535, 65_535);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
