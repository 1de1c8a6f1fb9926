//! Project templates: preset track layouts for new projects.

use harmonic_core::{HarmonicError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::project::Project;

/// A starting layout for a new project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectTemplate {
    Blank,
    Band,
    Electronic,
    Podcast,
    Orchestral,
}

impl ProjectTemplate {
    pub const ALL: [ProjectTemplate; 5] = [
        ProjectTemplate::Blank,
        ProjectTemplate::Band,
        ProjectTemplate::Electronic,
        ProjectTemplate::Podcast,
        ProjectTemplate::Orchestral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProjectTemplate::Blank => "blank",
            ProjectTemplate::Band => "band",
            ProjectTemplate::Electronic => "electronic",
            ProjectTemplate::Podcast => "podcast",
            ProjectTemplate::Orchestral => "orchestral",
        }
    }

    /// Track names created by this template, in order.
    pub fn track_names(&self) -> &'static [&'static str] {
        match self {
            ProjectTemplate::Blank => &[],
            ProjectTemplate::Band => &["Vocals", "Guitar", "Bass", "Drums"],
            ProjectTemplate::Electronic => &["Kick", "Bassline", "Synth Lead", "Pads", "FX"],
            ProjectTemplate::Podcast => &["Host", "Guest", "Music Bed"],
            ProjectTemplate::Orchestral => &["Strings", "Brass", "Woodwinds", "Percussion"],
        }
    }

    /// Default tags for projects built from this template.
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            ProjectTemplate::Blank => &[],
            ProjectTemplate::Band => &["band", "live"],
            ProjectTemplate::Electronic => &["electronic"],
            ProjectTemplate::Podcast => &["spoken word"],
            ProjectTemplate::Orchestral => &["orchestral", "score"],
        }
    }

    /// Build a project with this template's tracks and tags.
    pub fn instantiate(&self, title: impl Into<String>) -> Project {
        let mut project = Project::new(title).with_tags(self.tags().iter().copied());
        for name in self.track_names() {
            project.add_track(*name);
        }
        project
    }
}

impl fmt::Display for ProjectTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectTemplate {
    type Err = HarmonicError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == needle)
            .ok_or_else(|| HarmonicError::Validation(format!("unknown template '{}'", s)))
    }
}
