//! Three-part application version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The `main.primary.patch` version of the application being patched.
///
/// Only used to name outputs: `main` and `primary` select the version
/// directory and manifest file, `patch` goes into the archive name.
///
/// Components are numbers, so names use their canonical decimal form:
/// `01.0.5` and `1.0.5` are the same version and both publish under `1_0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionTuple {
    pub main: u32,
    pub primary: u32,
    pub patch: u32,
}

impl VersionTuple {
    pub const fn new(main: u32, primary: u32, patch: u32) -> Self {
        Self { main, primary, patch }
    }

    /// Directory name shared by every patch of this `main.primary` line.
    pub fn version_dir(&self) -> String {
        format!("{}_{}", self.main, self.primary)
    }
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.main, self.primary, self.patch)
    }
}

impl FromStr for VersionTuple {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(TypeError::InvalidVersion(format!(
                "expected main.primary.patch, got {s:?}"
            )));
        }
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|e| TypeError::InvalidVersion(format!("{part:?}: {e}")))
        };
        Ok(Self {
            main: parse(parts[0])?,
            primary: parse(parts[1])?,
            patch: parse(parts[2])?,
        })
    }
}
