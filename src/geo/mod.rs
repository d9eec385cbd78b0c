//! Pure geospatial math.
//!
//! Two independent, stateless components: the Qibla bearing calculator and
//! the geohash-5 encoder. Neither performs I/O or holds state, so both are
//! safe to call concurrently from any number of tasks.

pub mod geohash;
pub mod qibla;

pub use geohash::{encode5, is_valid_bucket, GEOHASH_ALPHABET, GEOHASH_LEN};
pub use qibla::{bearing_to_kaaba, normalize_degrees, relative_bearing, KAABA};
