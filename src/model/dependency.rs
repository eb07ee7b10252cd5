use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// A specifier written in a manifest; may be an exact pin or a range.
    Declared,
    /// A concrete version recorded in a lockfile.
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    Dependencies,
    DevDependencies,
    PeerDependencies,
    OptionalDependencies,
    /// `package-lock.json` v2/v3 `packages` map keyed by install path.
    PackageLock,
    /// `package-lock.json` v1 nested `dependencies` tree.
    PackageLockLegacy,
    YarnLock,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Dependencies => "dependencies",
            Origin::DevDependencies => "devDependencies",
            Origin::PeerDependencies => "peerDependencies",
            Origin::OptionalDependencies => "optionalDependencies",
            Origin::PackageLock => "package-lock",
            Origin::PackageLockLegacy => "package-lock-v1",
            Origin::YarnLock => "yarn.lock",
        }
    }

    pub fn kind(&self) -> DependencyKind {
        match self {
            Origin::Dependencies
            | Origin::DevDependencies
            | Origin::PeerDependencies
            | Origin::OptionalDependencies => DependencyKind::Declared,
            Origin::PackageLock | Origin::PackageLockLegacy | Origin::YarnLock => {
                DependencyKind::Resolved
            }
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One dependency as seen by the matcher.
///
/// `version_text` is a specifier for declared records and a concrete version
/// for resolved ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    pub name: String,
    pub version_text: String,
    pub kind: DependencyKind,
    pub origin: Origin,
    pub source_location: String,
}

impl DependencyRecord {
    pub fn declared(
        name: impl Into<String>,
        specifier: impl Into<String>,
        origin: Origin,
        source_location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version_text: specifier.into(),
            kind: DependencyKind::Declared,
            origin,
            source_location: source_location.into(),
        }
    }

    pub fn resolved(
        name: impl Into<String>,
        version: impl Into<String>,
        origin: Origin,
        source_location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version_text: version.into(),
            kind: DependencyKind::Resolved,
            origin,
            source_location: source_location.into(),
        }
    }

    pub fn is_declared(&self) -> bool {
        self.kind == DependencyKind::Declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_kind() {
        assert_eq!(Origin::DevDependencies.kind(), DependencyKind::Declared);
        assert_eq!(Origin::PeerDependencies.kind(), DependencyKind::Declared);
        assert_eq!(Origin::PackageLockLegacy.kind(), DependencyKind::Resolved);
        assert_eq!(Origin::YarnLock.kind(), DependencyKind::Resolved);
    }

    #[test]
    fn test_constructors_set_kind() {
        let declared = DependencyRecord::declared("a", "^1.0.0", Origin::Dependencies, "p.json");
        let resolved = DependencyRecord::resolved("a", "1.0.0", Origin::PackageLock, "p-l.json");
        assert!(declared.is_declared());
        assert!(!resolved.is_declared());
        assert_eq!(resolved.kind, DependencyKind::Resolved);
    }
}
