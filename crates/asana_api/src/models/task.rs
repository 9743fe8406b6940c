//! Task payloads from the project task listing endpoint.

use serde::Deserialize;

use super::ProjectRef;

/// A task as returned with the `opt_fields` the tracker requests:
/// name, gid, completed flag and project/section memberships.
#[derive(Debug, Deserialize, Clone)]
pub struct Task {
    pub gid: String,
    pub name: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

/// A task's placement in one project's board.
#[derive(Debug, Deserialize, Clone)]
pub struct Membership {
    pub project: Option<ProjectRef>,
    pub section: Option<SectionRef>,
}

/// Section (board column) reference inside a membership.
#[derive(Debug, Deserialize, Clone)]
pub struct SectionRef {
    pub gid: Option<String>,
    pub name: Option<String>,
}

impl Task {
    /// True when this task sits in a section of `project_gid` whose display
    /// name contains the case-insensitive substring `section_needle`.
    pub fn in_section_of(&self, project_gid: &str, section_needle: &str) -> bool {
        let needle = section_needle.to_lowercase();
        self.memberships.iter().any(|membership| {
            let in_project = membership
                .project
                .as_ref()
                .map(|project| project.gid == project_gid)
                .unwrap_or(false);
            let section_matches = membership
                .section
                .as_ref()
                .and_then(|section| section.name.as_deref())
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false);
            in_project && section_matches
        })
    }
}
