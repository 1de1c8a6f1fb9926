//! Strongly typed identifiers.
//!
//! Every entity is keyed by a UUID wrapped in its own newtype so a track id
//! can never be passed where a version id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::HarmonicError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = HarmonicError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).map_err(|e| {
                    HarmonicError::Validation(format!(
                        "invalid {} '{}': {}",
                        stringify!($name),
                        s,
                        e
                    ))
                })
            }
        }
    };
}

define_id!(
    /// Identifies a project.
    ProjectId
);
define_id!(
    /// Identifies a track within a project.
    TrackId
);
define_id!(
    /// Identifies one immutable version of a track.
    VersionId
);
define_id!(
    /// Identifies a checkpoint.
    CheckpointId
);
define_id!(
    /// Identifies a timeline comment.
    CommentId
);
define_id!(
    /// Identifies a user.
    UserId
);
