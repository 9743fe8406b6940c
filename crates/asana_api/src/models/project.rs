use serde::Deserialize;

/// Full project payload from `/projects/{gid}`.
#[derive(Debug, Deserialize, Clone)]
pub struct Project {
    pub gid: String,
    pub name: Option<String>,
}

/// Compact project reference used in listings and task memberships.
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectRef {
    #[serde(default)]
    pub gid: String,
    pub name: Option<String>,
}
