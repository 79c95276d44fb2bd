use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Integer-component decomposition of a version string.
///
/// Exists only for the duration of a comparison; nothing persists these.
/// Ordering zero-pads the shorter vector on the right, so `1.0` and `1.0.0`
/// compare equal while keeping their original component counts.
#[derive(Debug, Clone)]
pub struct VersionVector(Vec<u64>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("Empty version string")]
    Empty,
    #[error("Invalid version component '{component}' in '{input}'")]
    InvalidComponent { input: String, component: String },
}

impl FromStr for VersionVector {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // A single leading 'v' or 'V' is tolerated; anything else must be
        // dot-separated non-negative integers.
        let digits = trimmed
            .strip_prefix(['v', 'V'])
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let mut components = Vec::new();
        for part in digits.split('.') {
            let value = part
                .parse::<u64>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    input: s.to_string(),
                    component: part.to_string(),
                })?;
            components.push(value);
        }
        Ok(Self(components))
    }
}

impl VersionVector {
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl Ord for VersionVector {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let left = self.0.get(i).copied().unwrap_or(0);
            let right = other.0.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality must agree with the zero-padded ordering, so it cannot be derived
// from the raw component list.
impl PartialEq for VersionVector {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionVector {}

impl fmt::Display for VersionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

/// Whether `remote` describes a strictly newer version than `current`.
///
/// # Errors
/// Returns an error when either string contains a non-numeric or empty
/// component.
pub fn is_newer(remote: &str, current: &str) -> Result<bool, VersionParseError> {
    let remote: VersionVector = remote.parse()?;
    let current: VersionVector = current.parse()?;
    Ok(remote > current)
}
