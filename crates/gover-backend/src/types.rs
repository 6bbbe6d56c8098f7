use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Pre-release channel of a toolchain release. Betas sort before release
/// candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PreReleaseKind {
    Beta,
    Rc,
}

impl PreReleaseKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Beta => "beta",
            Self::Rc => "rc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PreRelease {
    pub kind: PreReleaseKind,
    pub number: u32,
}

/// Orderable form of a toolchain version identifier such as `1.22.0`,
/// `1.21rc2` or `1.20`.
///
/// Only used to sort listings; everywhere else version identifiers stay opaque
/// strings so that an unparseable directory name never hides an installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
    pub pre: Option<PreRelease>,
}

impl ToolchainVersion {
    #[must_use]
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch: Some(patch),
            pre: None,
        }
    }

    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.pre.is_none()
    }
}

impl Ord for ToolchainVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.unwrap_or(0).cmp(&other.patch.unwrap_or(0)))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for ToolchainVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ToolchainVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToolchainVersion {}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        if let Some(pre) = self.pre {
            write!(f, "{}{}", pre.kind.as_str(), pre.number)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
    PreRelease,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::PreRelease => write!(f, "pre-release"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Expected X.Y[.Z][rcN|betaN] format, got: {input}")]
    InvalidFormat { input: String },
    #[error("Invalid {component} version: {value}")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
    },
}

fn parse_component(value: &str, component: VersionComponent) -> Result<u32, VersionParseError> {
    value
        .parse()
        .map_err(|_| VersionParseError::InvalidComponent {
            component,
            value: value.to_string(),
        })
}

impl FromStr for ToolchainVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let s = trimmed.strip_prefix("go").unwrap_or(trimmed);

        let (base, pre) = match ["beta", "rc"]
            .iter()
            .find_map(|tag| s.find(tag).map(|idx| (idx, *tag)))
        {
            Some((idx, tag)) => {
                let kind = if tag == "rc" {
                    PreReleaseKind::Rc
                } else {
                    PreReleaseKind::Beta
                };
                let number = parse_component(&s[idx + tag.len()..], VersionComponent::PreRelease)?;
                (&s[..idx], Some(PreRelease { kind, number }))
            }
            None => (s, None),
        };

        let invalid = || VersionParseError::InvalidFormat {
            input: s.to_string(),
        };

        let mut parts = base.split('.');
        let major_str = parts.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        let minor_str = parts.next().ok_or_else(invalid)?;
        let patch_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            major: parse_component(major_str, VersionComponent::Major)?,
            minor: parse_component(minor_str, VersionComponent::Minor)?,
            patch: patch_str
                .map(|patch| parse_component(patch, VersionComponent::Patch))
                .transpose()?,
            pre,
        })
    }
}

/// A toolchain copy present under the versions root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledVersion {
    pub version: String,
    pub path: PathBuf,
    pub disk_size: u64,
    pub installed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl InstalledVersion {
    #[must_use]
    pub fn parsed(&self) -> Option<ToolchainVersion> {
        self.version.parse().ok()
    }

    /// Newest first; identifiers that do not parse sort last, alphabetically.
    pub fn sort_newest_first(versions: &mut [InstalledVersion]) {
        versions.sort_by(|a, b| match (a.parsed(), b.parsed()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.version.cmp(&b.version),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed(version: &str) -> InstalledVersion {
        InstalledVersion {
            version: version.to_string(),
            path: PathBuf::from(format!("/versions/go{version}")),
            disk_size: 0,
            installed_at: None,
        }
    }

    #[test]
    fn test_parse_full_version() {
        let v: ToolchainVersion = "1.22.3".parse().unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 22);
        assert_eq!(v.patch, Some(3));
        assert!(v.is_stable());
    }

    #[test]
    fn test_parse_with_go_prefix_and_whitespace() {
        let v: ToolchainVersion = "  go1.21.0\n".parse().unwrap();
        assert_eq!(v, ToolchainVersion::new(1, 21, 0));
    }

    #[test]
    fn test_parse_release_candidate() {
        let v: ToolchainVersion = "1.23rc2".parse().unwrap();
        assert_eq!(v.patch, None);
        assert_eq!(
            v.pre,
            Some(PreRelease {
                kind: PreReleaseKind::Rc,
                number: 2
            })
        );
        assert!(!v.is_stable());
        assert_eq!(v.to_string(), "1.23rc2");
    }

    #[test]
    fn test_parse_invalid_inputs() {
        assert!("".parse::<ToolchainVersion>().is_err());
        assert!("1".parse::<ToolchainVersion>().is_err());
        assert!("1.x.0".parse::<ToolchainVersion>().is_err());
        assert!("1.2.3.4".parse::<ToolchainVersion>().is_err());
        assert!("1.22rc".parse::<ToolchainVersion>().is_err());
    }

    #[test]
    fn test_ordering_puts_prerelease_before_release() {
        let beta: ToolchainVersion = "1.22beta1".parse().unwrap();
        let rc: ToolchainVersion = "1.22rc1".parse().unwrap();
        let release: ToolchainVersion = "1.22.0".parse().unwrap();
        let previous: ToolchainVersion = "1.21.9".parse().unwrap();

        assert!(previous < beta);
        assert!(beta < rc);
        assert!(rc < release);
    }

    #[test]
    fn test_missing_patch_equals_zero_patch() {
        let short: ToolchainVersion = "1.20".parse().unwrap();
        let full: ToolchainVersion = "1.20.0".parse().unwrap();
        assert_eq!(short, full);
        assert_eq!(short.to_string(), "1.20");
    }

    #[test]
    fn test_sort_newest_first_keeps_unparseable_last() {
        let mut versions = vec![
            installed("1.21.0"),
            installed("custom"),
            installed("1.22.1"),
            installed("1.22rc1"),
        ];

        InstalledVersion::sort_newest_first(&mut versions);

        let order: Vec<_> = versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(order, vec!["1.22.1", "1.22rc1", "1.21.0", "custom"]);
    }
}
