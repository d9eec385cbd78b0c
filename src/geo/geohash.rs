//! Fixed-precision geohash encoding.
//!
//! Encodes a coordinate into a 5-character base-32 bucket string by
//! interleaved binary bisection of the longitude and latitude ranges,
//! longitude bit first. Five characters (25 bits) give cells on the order of
//! a few kilometers across, which is the granularity the aggregation layer
//! groups on.
//!
//! This is a lossy, order-preserving spatial hash, not a general geohash
//! library: precision is fixed, there is no decoding and no neighbor lookup.
//! The alphabet and bit order match the app's historically stored buckets,
//! so output strings are compatible with existing data.

use crate::models::Coordinate;

/// Base-32 alphabet used for bucket characters (standard geohash subset).
pub const GEOHASH_ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Length of every bucket key produced by [`encode5`].
pub const GEOHASH_LEN: usize = 5;

const BITS: usize = GEOHASH_LEN * 5;

/// Encode a coordinate into its 5-character spatial bucket.
///
/// Deterministic: identical input always yields the identical bucket.
pub fn encode5(coord: Coordinate) -> String {
    let lat = coord.latitude();
    let lon = coord.longitude();

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut out = String::with_capacity(GEOHASH_LEN);
    let mut current_bits: u8 = 0;
    let mut bit_count = 0;
    let mut is_lon = true;

    for _ in 0..BITS {
        if is_lon {
            let mid = (lon_range.0 + lon_range.1) / 2.0;
            if lon >= mid {
                current_bits = (current_bits << 1) | 1;
                lon_range.0 = mid;
            } else {
                current_bits <<= 1;
                lon_range.1 = mid;
            }
        } else {
            let mid = (lat_range.0 + lat_range.1) / 2.0;
            if lat >= mid {
                current_bits = (current_bits << 1) | 1;
                lat_range.0 = mid;
            } else {
                current_bits <<= 1;
                lat_range.1 = mid;
            }
        }

        is_lon = !is_lon;
        bit_count += 1;

        if bit_count == 5 {
            out.push(GEOHASH_ALPHABET[current_bits as usize] as char);
            current_bits = 0;
            bit_count = 0;
        }
    }

    out
}

/// Check whether a string is a well-formed bucket key.
///
/// Used to validate bucket keys arriving as query input before they reach
/// the datastore.
pub fn is_valid_bucket(key: &str) -> bool {
    key.len() == GEOHASH_LEN && key.bytes().all(|b| GEOHASH_ALPHABET.contains(&b))
}
