//! Encoded polyline codec.
//!
//! Routing providers ship route geometry in the encoded polyline format: each
//! coordinate is stored as a zig-zag encoded delta from the previous point,
//! split into 5-bit chunks offset by 63 so the result is printable ASCII.
//! Latitude precedes longitude. OSRM and Google use precision 5.
//!
//! Decoding preserves point order, so a route polyline still runs from origin
//! to destination.

use thiserror::Error;

use crate::{Coordinate, CoordinateError};

/// Precision used by OSRM's `geometries=polyline` output.
pub const DEFAULT_PRECISION: u8 = 5;

const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const MAX_CHUNK: i64 = 0x3f;
const ASCII_OFFSET: i64 = 63;
// Eleven 5-bit chunks exceed every value a valid coordinate can produce.
const MAX_SHIFT: u32 = 55;

/// Errors raised while decoding an encoded polyline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolylineError {
    /// A byte fell outside the encoding alphabet.
    #[error("invalid polyline character {character:?} at byte {index}")]
    InvalidCharacter {
        /// Byte offset of the offending character.
        index: usize,
        /// The character found.
        character: char,
    },
    /// A value used more chunks than any coordinate needs.
    #[error("polyline value starting before byte {index} is too long")]
    Overlong {
        /// Byte offset where the limit was exceeded.
        index: usize,
    },
    /// Input ended in the middle of a value or after a lone latitude.
    #[error("polyline ended mid-value")]
    Truncated,
    /// A decoded value does not fit in a coordinate.
    #[error("decoded point is not a valid coordinate: {0}")]
    OutOfRange(#[from] CoordinateError),
}

fn scale(precision: u8) -> f64 {
    10_f64.powi(i32::from(precision))
}

/// Decode `encoded` into an ordered list of coordinates.
///
/// # Errors
///
/// Returns [`PolylineError`] when the input is malformed or decodes to
/// out-of-range coordinates.
///
/// # Examples
/// ```
/// use nearby_core::polyline::{decode, DEFAULT_PRECISION};
///
/// let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@", DEFAULT_PRECISION).unwrap();
/// assert_eq!(points.len(), 3);
/// assert_eq!(points[0].latitude(), 38.5);
/// assert_eq!(points[2].longitude(), -126.453);
/// ```
pub fn decode(encoded: &str, precision: u8) -> Result<Vec<Coordinate>, PolylineError> {
    let factor = scale(precision);
    let mut bytes = encoded.bytes().enumerate();
    let mut points = Vec::new();
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while let Some(delta_lat) = next_value(&mut bytes)? {
        let delta_lon = next_value(&mut bytes)?.ok_or(PolylineError::Truncated)?;
        lat += delta_lat;
        lon += delta_lon;
        let point = Coordinate::new(lat as f64 / factor, lon as f64 / factor)?;
        points.push(point);
    }
    Ok(points)
}

/// Read one zig-zag encoded value, or `None` at a clean end of input.
fn next_value(
    bytes: &mut impl Iterator<Item = (usize, u8)>,
) -> Result<Option<i64>, PolylineError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    loop {
        let Some((index, byte)) = bytes.next() else {
            return if shift == 0 {
                Ok(None)
            } else {
                Err(PolylineError::Truncated)
            };
        };
        let chunk = i64::from(byte) - ASCII_OFFSET;
        if !(0..=MAX_CHUNK).contains(&chunk) {
            return Err(PolylineError::InvalidCharacter {
                index,
                character: char::from(byte),
            });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overlong { index });
        }
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        if chunk & CONTINUATION == 0 {
            break;
        }
    }
    let value = if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok(Some(value))
}

/// Encode coordinates with the given precision.
#[must_use]
pub fn encode(points: &[Coordinate], precision: u8) -> String {
    let factor = scale(precision);
    let mut out = String::new();
    let mut previous = (0_i64, 0_i64);
    for point in points {
        let current = (
            (point.latitude() * factor).round() as i64,
            (point.longitude() * factor).round() as i64,
        );
        push_value(&mut out, current.0 - previous.0);
        push_value(&mut out, current.1 - previous.1);
        previous = current;
    }
    out
}

fn push_value(out: &mut String, delta: i64) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= CONTINUATION {
        push_chunk(out, (value & CHUNK_MASK) | CONTINUATION);
        value >>= CHUNK_BITS;
    }
    push_chunk(out, value);
}

fn push_chunk(out: &mut String, chunk: i64) {
    if let Ok(byte) = u8::try_from(chunk + ASCII_OFFSET) {
        out.push(char::from(byte));
    }
}
