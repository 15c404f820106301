use std::fmt;

use crate::engine::scroll::progress_mapper::RegionName;

/// Errors surfaced by lookups and measurements at the scene boundary.
///
/// Duplicate triggers and repeated disposals are not errors; those paths
/// return `false` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    UnknownRegion(String),
    UnknownGroup(String),
    UnknownColor(String),
    DuplicateRegion(RegionName),
    InvalidRegion {
        name: RegionName,
        reason: &'static str,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRegion(name) => write!(f, "unknown scroll region '{}'", name),
            Self::UnknownGroup(name) => write!(f, "unknown disposal group '{}'", name),
            Self::UnknownColor(id) => write!(f, "unknown product colour '{}'", id),
            Self::DuplicateRegion(name) => write!(f, "region '{}' measured twice", name),
            Self::InvalidRegion { name, reason } => {
                write!(f, "invalid measurement for region '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for SceneError {}
