//! Target keys: the storefronts a scrape job can run against.
//!
//! Each platform owns one progress entry and one deal collection at a time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Amazon,
    Noon,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Amazon, Platform::Noon];

    /// Stable lowercase key used in URLs, logs, and backup file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Amazon => "amazon",
            Platform::Noon => "noon",
        }
    }

    /// Maps a URL host such as `www.amazon.ae` or `noon.com` to its platform.
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        if host.contains("amazon") {
            Some(Platform::Amazon)
        } else if host.contains("noon") {
            Some(Platform::Noon)
        } else {
            None
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amazon" => Ok(Platform::Amazon),
            "noon" => Ok(Platform::Noon),
            other => Err(CoreError::UnsupportedPlatform(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_accepts_mixed_case_and_whitespace() {
        assert_eq!(" Amazon ".parse::<Platform>().unwrap(), Platform::Amazon);
        assert_eq!("NOON".parse::<Platform>().unwrap(), Platform::Noon);
    }

    #[test]
    fn from_str_rejects_unknown_platform() {
        let err = "ebay".parse::<Platform>().unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedPlatform(ref p) if p == "ebay"));
    }

    #[test]
    fn from_host_detects_regional_storefronts() {
        assert_eq!(Platform::from_host("www.amazon.ae"), Some(Platform::Amazon));
        assert_eq!(Platform::from_host("WWW.NOON.COM"), Some(Platform::Noon));
        assert_eq!(Platform::from_host("example.com"), None);
    }

    #[test]
    fn serializes_as_lowercase_key() {
        let json = serde_json::to_string(&Platform::Noon).unwrap();
        assert_eq!(json, "\"noon\"");
        assert_eq!(Platform::Amazon.to_string(), "amazon");
    }
}
