//! Identity payload returned by `/users/me`.

use serde::Deserialize;

/// The authenticated user's profile. A non-empty `gid` is what proves the
/// session cookie is still live.
#[derive(Debug, Deserialize, Clone)]
pub struct User {
    #[serde(default)]
    pub gid: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl User {
    /// True when the payload carries a usable identity id.
    pub fn has_identity(&self) -> bool {
        !self.gid.trim().is_empty()
    }
}
