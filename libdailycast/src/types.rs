//! Core types for Dailycast

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Platforms a scheduled post can be published to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Twitter,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Facebook,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 3] = [
        PlatformKind::Twitter,
        PlatformKind::LinkedIn,
        PlatformKind::Facebook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Twitter => "twitter",
            PlatformKind::LinkedIn => "linkedin",
            PlatformKind::Facebook => "facebook",
        }
    }

    /// Parse a comma-separated platform list such as `"twitter,facebook"`
    pub fn parse_list(s: &str) -> Result<Vec<Self>, String> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twitter" | "x" => Ok(PlatformKind::Twitter),
            "linkedin" => Ok(PlatformKind::LinkedIn),
            "facebook" => Ok(PlatformKind::Facebook),
            _ => Err(format!(
                "Invalid platform: '{}'. Valid options: twitter, linkedin, facebook",
                s
            )),
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_kind_from_str() {
        assert_eq!("twitter".parse::<PlatformKind>().unwrap(), PlatformKind::Twitter);
        assert_eq!("X".parse::<PlatformKind>().unwrap(), PlatformKind::Twitter);
        assert_eq!("LinkedIn".parse::<PlatformKind>().unwrap(), PlatformKind::LinkedIn);
        assert_eq!("facebook".parse::<PlatformKind>().unwrap(), PlatformKind::Facebook);
    }

    #[test]
    fn test_platform_kind_from_str_invalid() {
        let result = "myspace".parse::<PlatformKind>();
        assert!(result.unwrap_err().contains("Invalid platform: 'myspace'"));
    }

    #[test]
    fn test_parse_list() {
        let kinds = PlatformKind::parse_list("twitter, facebook,").unwrap();
        assert_eq!(kinds, vec![PlatformKind::Twitter, PlatformKind::Facebook]);
        assert!(PlatformKind::parse_list("twitter,nope").is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for kind in PlatformKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }
}
