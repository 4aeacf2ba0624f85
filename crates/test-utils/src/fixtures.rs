//! Common fixtures for pipeline tests.

use goes_common::{Extent, ScanTime};

/// Region used by the night fog product: southern Brazil, Uruguay and
/// north-eastern Argentina.
pub const FOG_EXTENT: [f64; 4] = [-60.0, -35.0, -45.0, -25.0];

/// Scan whose scenes the fog example was built from.
pub const FOG_SCAN_TIME: &str = "202107071000";

/// `time_coverage_start` of that scan.
pub const FOG_COVERAGE_START: &str = "2021-07-07T10:00:20.6Z";

/// A scan time for which nothing is ever published in test stores.
pub const MISSING_SCAN_TIME: &str = "202107071003";

pub fn fog_extent() -> Extent {
    Extent::try_from(FOG_EXTENT).expect("fixture extent is valid")
}

pub fn fog_scan_time() -> ScanTime {
    ScanTime::parse(FOG_SCAN_TIME).expect("fixture scan time is valid")
}

/// Object key of a full-disk CMIP scene for `channel` in the fixture scan.
pub fn sample_object_key(channel: u8) -> String {
    format!(
        "ABI-L2-CMIPF/2021/188/10/OR_ABI-L2-CMIPF-M6C{:02}_G16_s20211881000206_e20211881009526_c20211881010012.nc",
        channel
    )
}

/// Base name (no directory, no extension) of [`sample_object_key`].
pub fn sample_base_name(channel: u8) -> String {
    let key = sample_object_key(channel);
    let file = key.rsplit('/').next().unwrap_or(&key);
    file.trim_end_matches(".nc").to_string()
}

/// A small places table in the bundled CSV layout.
pub const PLACES_CSV: &str = "lon,lat,id\n\
-51.23,-30.03,Porto Alegre\n\
-56.16,-34.90,Montevideo\n\
-58.38,-34.60,Buenos Aires\n";
