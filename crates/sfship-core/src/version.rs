//! Positional version rewriting
//!
//! Service Fabric versions are dot-separated integer tuples addressed by
//! position: major=0, minor=1, patch=2. Rewriting either substitutes an
//! explicit value at a position or increments the existing component.

use crate::error::{CoreError, Result};

const VERSION_DELIMITER: char = '.';

/// Addressable position within a version string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionField {
    Major,
    #[default]
    Minor,
    Patch,
}

impl VersionField {
    /// Zero-based component index
    pub const fn index(&self) -> usize {
        match self {
            Self::Major => 0,
            Self::Minor => 1,
            Self::Patch => 2,
        }
    }
}

impl std::fmt::Display for VersionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

impl std::str::FromStr for VersionField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            _ => Err(format!("unknown version field: {}", s)),
        }
    }
}

/// Rewrite one component of a dot-separated version string.
///
/// With an explicit `value` the component is substituted verbatim; without
/// one the existing component is parsed as an integer and incremented.
///
/// When the version has fewer components than the addressed position, the
/// last existing component is targeted instead (the index is walked back by
/// one). Existing descriptors in the field rely on this fallback, so it is
/// kept rather than rejected.
pub fn rewrite_component(
    version: &str,
    field: VersionField,
    value: Option<&str>,
) -> Result<String> {
    if version.is_empty() {
        return Err(CoreError::InvalidVersion {
            version: version.to_string(),
            component: String::new(),
            message: "version string is empty".to_string(),
        });
    }

    let mut components: Vec<String> = version
        .split(VERSION_DELIMITER)
        .map(str::to_string)
        .collect();

    let mut index = field.index();
    if index > 0 && components.len() - 1 < index {
        index -= 1;
    }
    let index = index.min(components.len() - 1);

    components[index] = match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            let current: u64 =
                components[index]
                    .parse()
                    .map_err(|_| CoreError::InvalidVersion {
                        version: version.to_string(),
                        component: components[index].clone(),
                        message: "component is not a non-negative integer".to_string(),
                    })?;
            (current + 1).to_string()
        }
    };

    Ok(components.join("."))
}
