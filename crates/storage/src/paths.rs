//! Archive key layout for ABI scenes.
//!
//! `{product}/{year}/{doy}/{hour}/OR_{product}-M{mode}C{band}_{sat}_s{year}{doy}{hour}{minute}...`

use goes_common::{Channel, ScanTime};

use crate::object_store::ArchiveConfig;

/// Location of one channel at one scan time, up to the minute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenePath {
    pub product: String,
    pub satellite: String,
    pub scan_mode: u8,
    pub channel: Channel,
    pub time: ScanTime,
}

impl ScenePath {
    pub fn new(archive: &ArchiveConfig, channel: Channel, time: ScanTime) -> Self {
        Self {
            product: archive.product.clone(),
            satellite: archive.satellite.clone(),
            scan_mode: archive.scan_mode,
            channel,
            time,
        }
    }

    /// Hourly directory holding the scene, e.g. `ABI-L2-CMIPF/2021/188/10`.
    pub fn directory(&self) -> String {
        format!(
            "{}/{}/{:03}/{:02}",
            self.product,
            self.time.year(),
            self.time.day_of_year(),
            self.time.hour()
        )
    }

    /// File name prefix up to the start minute. Seconds and the end and
    /// creation stamps are unknown until listing.
    pub fn file_prefix(&self) -> String {
        format!(
            "OR_{}-M{}{}_{}_s{}{:03}{:02}{:02}",
            self.product,
            self.scan_mode,
            self.channel.tag(),
            self.satellite,
            self.time.year(),
            self.time.day_of_year(),
            self.time.hour(),
            self.time.minute()
        )
    }

    /// Full key prefix used to search the archive.
    pub fn key_prefix(&self) -> String {
        format!("{}/{}", self.directory(), self.file_prefix())
    }

    /// Whether a file name (no directory) belongs to this scene.
    pub fn matches_file(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.file_prefix()) && file_name.ends_with(".nc")
    }
}
