//! Encoded polyline codec.
//!
//! Implements the standard compact route-geometry encoding: coordinates are
//! scaled by `1e5`, delta-encoded against the previous point, zig-zag signed
//! (odd values are inverted two's-complement style), and emitted as 5-bit
//! groups offset by 63 with `0x20` as the continuation bit.
//!
//! Decoding an empty string yields an empty sequence; a string that ends
//! mid-varint is an error rather than a truncated point list.

use thiserror::Error;

use crate::GeoPoint;

const SCALE: f64 = 1e5;
const CONTINUATION: u8 = 0x20;
const OFFSET: u8 = 63;

/// Errors from [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// The input ended in the middle of a varint group.
    #[error("encoded polyline ends mid-value at byte {position}")]
    UnexpectedEnd {
        /// Byte offset where the input was exhausted.
        position: usize,
    },
    /// A byte outside the printable encoding range was encountered.
    #[error("invalid polyline byte {byte:#04x} at offset {position}")]
    InvalidByte {
        /// The offending byte.
        byte: u8,
        /// Byte offset of the offending byte.
        position: usize,
    },
    /// A single value ran past the 64-bit accumulator.
    #[error("polyline value overflows at offset {position}")]
    ValueOverflow {
        /// Byte offset of the continuation group that overflowed.
        position: usize,
    },
}

/// Decode an encoded polyline into an ordered point sequence.
///
/// # Errors
///
/// Returns [`PolylineError`] when the input is not a well-formed encoding.
///
/// # Examples
/// ```
/// use halfway_core::polyline;
///
/// let points = polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@")?;
/// assert_eq!(points.len(), 3);
/// assert!((points[0].lat - 38.5).abs() < 1e-9);
/// assert!((points[0].lng - -120.2).abs() < 1e-9);
/// # Ok::<(), polyline::PolylineError>(())
/// ```
pub fn decode(encoded: &str) -> Result<Vec<GeoPoint>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat += decode_value(bytes, &mut index)?;
        lng += decode_value(bytes, &mut index)?;
        points.push(GeoPoint::new(f64_from_scaled(lat), f64_from_scaled(lng)));
    }
    Ok(points)
}

/// Encode a point sequence into the compact polyline format.
///
/// # Examples
/// ```
/// use halfway_core::{GeoPoint, polyline};
///
/// let encoded = polyline::encode(&[
///     GeoPoint::new(38.5, -120.2),
///     GeoPoint::new(40.7, -120.95),
///     GeoPoint::new(43.252, -126.453),
/// ]);
/// assert_eq!(encoded, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
#[must_use]
pub fn encode(points: &[GeoPoint]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;
    for point in points {
        let lat = scaled(point.lat);
        let lng = scaled(point.lng);
        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }
    out
}

fn scaled(degrees: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation, reason = "coordinates fit i64 after 1e5 scaling")]
    let value = (degrees * SCALE).round() as i64;
    value
}

fn f64_from_scaled(value: i64) -> f64 {
    #[allow(clippy::cast_precision_loss, reason = "scaled coordinates are well within f64 mantissa")]
    let degrees = value as f64 / SCALE;
    degrees
}

fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut result: u64 = 0;
    let mut shift = 0;
    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(PolylineError::UnexpectedEnd { position: *index });
        };
        if !(OFFSET..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte {
                byte,
                position: *index,
            });
        }
        // A value fits in at most 13 five-bit groups; further continuation
        // bytes would shift past the accumulator.
        if shift >= u64::BITS {
            return Err(PolylineError::ValueOverflow { position: *index });
        }
        *index += 1;
        let group = byte - OFFSET;
        result |= u64::from(group & 0x1f) << shift;
        shift += 5;
        if group < CONTINUATION {
            break;
        }
    }
    // Zig-zag: odd values are inverted negatives.
    #[allow(clippy::cast_possible_wrap, reason = "zig-zag halving keeps the value in i64 range")]
    let half = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !half } else { half })
}

fn encode_value(delta: i64, out: &mut String) {
    let shifted = delta << 1;
    let zigzag = if delta < 0 { !shifted } else { shifted };
    #[allow(clippy::cast_sign_loss, reason = "zig-zag encoding is non-negative")]
    let mut value = zigzag as u64;
    loop {
        #[allow(clippy::cast_possible_truncation, reason = "masked to five bits")]
        let mut group = (value & 0x1f) as u8;
        value >>= 5;
        if value > 0 {
            group |= CONTINUATION;
        }
        out.push(char::from(group + OFFSET));
        if value == 0 {
            break;
        }
    }
}
