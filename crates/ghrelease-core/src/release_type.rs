use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ReleaseType {
    #[default]
    Stable,
    Beta,
    Alpha,
}

impl ReleaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseType::Stable => "stable",
            ReleaseType::Beta => "beta",
            ReleaseType::Alpha => "alpha",
        }
    }

    /// Anything other than stable is published as a GitHub prerelease.
    pub fn is_prerelease(self) -> bool {
        self != ReleaseType::Stable
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown release type '{0}'; expected stable, beta, or alpha")]
pub struct ReleaseTypeError(pub String);

impl FromStr for ReleaseType {
    type Err = ReleaseTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(ReleaseType::Stable),
            "beta" => Ok(ReleaseType::Beta),
            "alpha" => Ok(ReleaseType::Alpha),
            _ => Err(ReleaseTypeError(value.to_string())),
        }
    }
}

impl TryFrom<String> for ReleaseType {
    type Error = ReleaseTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
