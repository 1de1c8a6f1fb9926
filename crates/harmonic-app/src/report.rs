//! Plain-text catalog summary.

use harmonic_project::{Project, ProjectStore};
use std::fmt::{self, Write};

pub fn catalog_summary(store: &ProjectStore) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for project in store.list() {
        project_summary(&mut out, project)?;
    }
    if store.is_empty() {
        out.push_str("(no projects)\n");
    }
    Ok(out)
}

fn project_summary(out: &mut impl Write, project: &Project) -> fmt::Result {
    writeln!(out, "{}", project.title)?;
    if !project.description.is_empty() {
        writeln!(out, "  {}", project.description)?;
    }
    if !project.tags.is_empty() {
        writeln!(out, "  tags: {}", project.tags.join(", "))?;
    }

    writeln!(out, "  collaborators:")?;
    for c in &project.collaborators {
        writeln!(out, "    {} ({}, feeling {})", c.user.name, c.role, c.user.mood)?;
    }

    writeln!(out, "  tracks:")?;
    for track in &project.tracks {
        let current = track
            .current_version()
            .map_or("no versions".to_string(), |v| v.label().to_string());
        writeln!(
            out,
            "    {:<14} {:>8}  {} of {}",
            track.name,
            harmonic_core::format_clock(track.duration),
            current,
            track.version_count()
        )?;
    }

    if !project.checkpoints.is_empty() {
        writeln!(out, "  checkpoints:")?;
        let current = project.current_checkpoint_id();
        for checkpoint in &project.checkpoints {
            let marker = if Some(checkpoint.id) == current { "*" } else { " " };
            writeln!(
                out,
                "   {}{} {} ({} tracks)",
                marker,
                checkpoint.label,
                checkpoint.name,
                checkpoint.track_versions.len()
            )?;
        }
    }

    let comments = project.comments();
    writeln!(
        out,
        "  comments: {} ({} open conflicts)",
        comments.len(),
        comments.open_conflicts().count()
    )?;
    for (emotion, count) in comments.emotion_summary() {
        let palette = emotion.palette();
        writeln!(out, "    {:<11} {} {}", palette.label, palette.color, count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonic_project::sample_catalog;

    #[test]
    fn test_summary_lists_projects_and_checkpoints() {
        let store = sample_catalog().unwrap();
        let text = catalog_summary(&store).unwrap();
        assert!(text.contains("Midnight Echoes"));
        assert!(text.contains("Neon Skyline"));
        assert!(text.contains("Rough mix"));
        assert!(text.contains("1 open conflicts"));
        assert!(text.contains("v2 of 2"));
    }

    #[test]
    fn test_project_summary_writes_to_any_sink() {
        let store = sample_catalog().unwrap();
        let project = &store.list()[0];
        let mut text = String::new();
        project_summary(&mut text, project).unwrap();
        assert!(text.starts_with("Midnight Echoes\n"));
        assert!(text.trim_end().lines().count() > 4);
        assert!(catalog_summary(&store).unwrap().starts_with(&text));
    }

    #[test]
    fn test_summary_empty_store() {
        assert_eq!(
            catalog_summary(&ProjectStore::new()).unwrap(),
            "(no projects)\n"
        );
    }
}
