//! ABI channel numbering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GoesError;

/// Physical quantity carried by a channel's CMI variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Channels 1-6: reflectance factor (unitless).
    Reflective,
    /// Channels 7-16: brightness temperature in Kelvin.
    Emissive,
}

/// An ABI channel, 1 through 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Channel(u8);

impl Channel {
    pub fn new(number: u8) -> Result<Self, GoesError> {
        if (1..=16).contains(&number) {
            Ok(Self(number))
        } else {
            Err(GoesError::InvalidChannel(number))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn kind(&self) -> ChannelKind {
        if self.0 <= 6 {
            ChannelKind::Reflective
        } else {
            ChannelKind::Emissive
        }
    }

    /// Tag used in file names, e.g. "C07".
    pub fn tag(&self) -> String {
        format!("C{:02}", self.0)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl TryFrom<u8> for Channel {
    type Error = GoesError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Channel> for u8 {
    fn from(c: Channel) -> Self {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_tag_and_kind() {
        let c7 = Channel::new(7).unwrap();
        assert_eq!(c7.tag(), "C07");
        assert_eq!(c7.kind(), ChannelKind::Emissive);
        assert_eq!(Channel::new(2).unwrap().kind(), ChannelKind::Reflective);
        assert_eq!(Channel::new(13).unwrap().to_string(), "C13");
    }

    #[test]
    fn test_channel_out_of_range() {
        assert!(Channel::new(0).is_err());
        assert!(Channel::new(17).is_err());
    }
}
