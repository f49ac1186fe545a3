pub const BUFFER_DEG: f64 = 15.0;
pub const TENTHS_PER_DEG: f64 = 10.0;

/// Stands in for a latitude or longitude the catalog left null.
pub const UNKNOWN_COORD: f64 = 200.0;

pub const FIELD_DATE: usize = 0;
pub const FIELD_ENERGY: usize = 1;
pub const FIELD_LAT: usize = 3;
pub const FIELD_LON: usize = 5;

pub const DEFAULT_CATALOG_URL: &str = "https://ssd-api.jpl.nasa.gov/fireball.api";
pub const DEFAULT_DATE_MIN: &str = "2017-01-01";
pub const DEFAULT_DATE_MAX: &str = "2020-01-01";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const DIRECTION_LETTERS: [char; 8] = ['N', 'n', 'S', 's', 'E', 'e', 'W', 'w'];
