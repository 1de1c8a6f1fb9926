//! Users, collaborators and roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::emotion::Emotion;
use crate::error::HarmonicError;
use crate::ids::UserId;

/// A person using Harmonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Avatar URL or initials.
    pub avatar: String,
    /// Current mood, used for color-coding only.
    #[serde(default)]
    pub mood: Emotion,
}

impl User {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            avatar: avatar.into(),
            mood: Emotion::Neutral,
        }
    }

    pub fn with_mood(mut self, mood: Emotion) -> Self {
        self.mood = mood;
        self
    }
}

/// Access level of a collaborator on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
}

impl Role {
    /// Owners and editors may upload versions and create checkpoints.
    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Owner | Role::Editor)
    }

    /// Only owners resolve conflicts.
    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Owner)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HarmonicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(HarmonicError::Validation(format!("unknown role '{}'", other))),
        }
    }
}

/// A user attached to a project with a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub user: User,
    pub role: Role,
}

impl Collaborator {
    pub fn new(user: User, role: Role) -> Self {
        Self { user, role }
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Owner.can_edit());
        assert!(Role::Editor.can_edit());
        assert!(!Role::Viewer.can_edit());
        assert!(Role::Owner.can_moderate());
        assert!(!Role::Editor.can_moderate());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Editor".parse::<Role>().unwrap(), Role::Editor);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_defaults_to_neutral_mood() {
        let user = User::new("Mira", "MK");
        assert_eq!(user.mood, Emotion::Neutral);
        let user = user.with_mood(Emotion::Inspired);
        assert_eq!(user.mood, Emotion::Inspired);
    }
}
