use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Default toolchain variant to assemble when none was requested.
pub const DEFAULT_VARIANT: &str = "mipsel32r6-uClibc";

/// Identifier of a pre-built cross-compilation toolchain bundle.
///
/// A variant name has the form `<arch>-<libc>`, such as `mipsel32r6-uClibc`,
/// where `arch` describes the target processor and `libc` the C library the
/// toolchain links against. The identifier doubles as the bundle's file name
/// inside the bundle store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantId(String);

impl VariantId {
    /// The target architecture part, e.g. `mipsel32r6`.
    pub fn arch(&self) -> &str {
        // Constructor guarantees at least one '-'.
        self.0.split_once('-').map(|(arch, _)| arch).unwrap()
    }

    /// The C library part, e.g. `uClibc`.
    pub fn libc(&self) -> &str {
        self.0.split_once('-').map(|(_, libc)| libc).unwrap()
    }
}

impl Default for VariantId {
    fn default() -> Self {
        Self(DEFAULT_VARIANT.to_string())
    }
}

impl FromStr for VariantId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((arch, libc)) if !arch.is_empty() && !libc.is_empty() => {
                Ok(Self(s.to_string()))
            }
            _ => bail!("invalid toolchain variant '{s}', expecting '<arch>-<libc>'"),
        }
    }
}

impl TryFrom<String> for VariantId {
    type Error = anyhow::Error;
    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VariantId> for String {
    fn from(value: VariantId) -> Self {
        value.0
    }
}

impl Deref for VariantId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
