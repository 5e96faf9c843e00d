//! User-agent fingerprints and signatures
//!
//! A [`UaFingerprint`] is what a collaborator extracts from a User-Agent
//! header; a [`UaSignature`] is the pattern a corpus record carries. Enum
//! fields match conjunctively, with the `Unknown`/`Any` sentinel acting as a
//! wildcard on the signature side only: a fingerprint that could not be
//! attributed to a concrete browser matches wildcard records, not concrete
//! ones. The quirk signature supplies the `Unlikely` dimension.

use crate::errors::{AppError, AppResult};
use crate::types::common::{fmt_string_list, parse_string_list, Match, StringList};
use crate::types::string_signature::StringListSignature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Browser family identified from a User-Agent header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserName {
    #[default]
    Unknown,
    Chrome,
    Firefox,
    Safari,
    InternetExplorer,
    Edge,
    Opera,
}

impl fmt::Display for BrowserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            BrowserName::Unknown => "*",
            BrowserName::Chrome => "chrome",
            BrowserName::Firefox => "firefox",
            BrowserName::Safari => "safari",
            BrowserName::InternetExplorer => "ie",
            BrowserName::Edge => "edge",
            BrowserName::Opera => "opera",
        };
        write!(f, "{}", token)
    }
}

impl std::str::FromStr for BrowserName {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "*" => Ok(BrowserName::Unknown),
            "chrome" => Ok(BrowserName::Chrome),
            "firefox" => Ok(BrowserName::Firefox),
            "safari" => Ok(BrowserName::Safari),
            "ie" => Ok(BrowserName::InternetExplorer),
            "edge" => Ok(BrowserName::Edge),
            "opera" => Ok(BrowserName::Opera),
            other => Err(AppError::InvalidData(format!("unknown browser: {}", other))),
        }
    }
}

/// Operating system identified from a User-Agent header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsName {
    #[default]
    Unknown,
    Windows,
    MacOs,
    Linux,
    Android,
    Ios,
    ChromeOs,
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            OsName::Unknown => "*",
            OsName::Windows => "windows",
            OsName::MacOs => "macos",
            OsName::Linux => "linux",
            OsName::Android => "android",
            OsName::Ios => "ios",
            OsName::ChromeOs => "chromeos",
        };
        write!(f, "{}", token)
    }
}

impl std::str::FromStr for OsName {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "*" => Ok(OsName::Unknown),
            "windows" => Ok(OsName::Windows),
            "macos" => Ok(OsName::MacOs),
            "linux" => Ok(OsName::Linux),
            "android" => Ok(OsName::Android),
            "ios" => Ok(OsName::Ios),
            "chromeos" => Ok(OsName::ChromeOs),
            other => Err(AppError::InvalidData(format!("unknown os: {}", other))),
        }
    }
}

/// Device class identified from a User-Agent header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Unknown,
    Computer,
    Phone,
    Tablet,
    Console,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            DeviceType::Unknown => "*",
            DeviceType::Computer => "computer",
            DeviceType::Phone => "phone",
            DeviceType::Tablet => "tablet",
            DeviceType::Console => "console",
        };
        write!(f, "{}", token)
    }
}

impl std::str::FromStr for DeviceType {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "*" => Ok(DeviceType::Unknown),
            "computer" => Ok(DeviceType::Computer),
            "phone" => Ok(DeviceType::Phone),
            "tablet" => Ok(DeviceType::Tablet),
            "console" => Ok(DeviceType::Console),
            other => Err(AppError::InvalidData(format!("unknown device: {}", other))),
        }
    }
}

/// Coarse browser version bucket (major version), with `Any` as sentinel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowserVersion {
    #[default]
    Any,
    Major(u16),
}

impl fmt::Display for BrowserVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserVersion::Any => write!(f, "*"),
            BrowserVersion::Major(v) => write!(f, "{}", v),
        }
    }
}

impl std::str::FromStr for BrowserVersion {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        if s == "*" {
            return Ok(BrowserVersion::Any);
        }
        s.parse::<u16>()
            .map(BrowserVersion::Major)
            .map_err(|_| AppError::InvalidData(format!("invalid browser version: {:?}", s)))
    }
}

/// Inclusive browser-version range; `Any` bounds are wildcards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub min: BrowserVersion,
    pub max: BrowserVersion,
}

impl VersionRange {
    pub const ANY: VersionRange = VersionRange {
        min: BrowserVersion::Any,
        max: BrowserVersion::Any,
    };

    /// A concrete fingerprint version satisfies wildcard bounds; an `Any`
    /// fingerprint version satisfies only wildcard bounds.
    pub fn contains(&self, version: BrowserVersion) -> bool {
        let above_min = match (self.min, version) {
            (BrowserVersion::Any, _) => true,
            (BrowserVersion::Major(_), BrowserVersion::Any) => false,
            (BrowserVersion::Major(min), BrowserVersion::Major(v)) => v >= min,
        };
        let below_max = match (self.max, version) {
            (BrowserVersion::Any, _) => true,
            (BrowserVersion::Major(_), BrowserVersion::Any) => false,
            (BrowserVersion::Major(max), BrowserVersion::Major(v)) => v <= max,
        };
        above_min && below_max
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl std::str::FromStr for VersionRange {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| AppError::InvalidData(format!("invalid version range: {:?}", s)))?;
        Ok(VersionRange {
            min: min.parse()?,
            max: max.parse()?,
        })
    }
}

/// Observed user-agent fingerprint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UaFingerprint {
    pub browser_name: BrowserName,
    pub browser_version: BrowserVersion,
    pub os_name: OsName,
    pub device_type: DeviceType,
    pub quirk: StringList,
}

/// Rendered as `browser:version:os:device:quirks`
impl fmt::Display for UaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.browser_name,
            self.browser_version,
            self.os_name,
            self.device_type,
            fmt_string_list(&self.quirk)
        )
    }
}

impl std::str::FromStr for UaFingerprint {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 5 {
            return Err(AppError::InvalidData(format!(
                "user agent fingerprint needs 5 fields, got {}",
                fields.len()
            )));
        }
        Ok(UaFingerprint {
            browser_name: fields[0].parse()?,
            browser_version: fields[1].parse()?,
            os_name: fields[2].parse()?,
            device_type: fields[3].parse()?,
            quirk: parse_string_list(fields[4])?,
        })
    }
}

/// User-agent signature carried by a corpus record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UaSignature {
    pub browser_name: BrowserName,
    pub version_range: VersionRange,
    pub os_name: OsName,
    pub device_type: DeviceType,
    pub quirk: StringListSignature,
}

impl UaSignature {
    /// Match an observed user-agent fingerprint against this signature
    pub fn matches(&self, fingerprint: &UaFingerprint) -> Match {
        if !sentinel_eq(self.browser_name, fingerprint.browser_name, BrowserName::Unknown)
            || !sentinel_eq(self.os_name, fingerprint.os_name, OsName::Unknown)
            || !sentinel_eq(self.device_type, fingerprint.device_type, DeviceType::Unknown)
            || !self.version_range.contains(fingerprint.browser_version)
        {
            return Match::Impossible;
        }
        self.quirk.matches(&fingerprint.quirk)
    }
}

fn sentinel_eq<T: Copy + PartialEq>(signature: T, fingerprint: T, sentinel: T) -> bool {
    signature == sentinel || signature == fingerprint
}

/// Rendered as `browser:minver-maxver:os:device:quirks`
impl fmt::Display for UaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.browser_name, self.version_range, self.os_name, self.device_type, self.quirk
        )
    }
}

impl std::str::FromStr for UaSignature {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 5 {
            return Err(AppError::InvalidData(format!(
                "user agent signature needs 5 fields, got {}",
                fields.len()
            )));
        }
        Ok(UaSignature {
            browser_name: fields[0].parse()?,
            version_range: fields[1].parse()?,
            os_name: fields[2].parse()?,
            device_type: fields[3].parse()?,
            quirk: fields[4].parse()?,
        })
    }
}
