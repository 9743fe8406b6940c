//! Payload models for the Asana endpoints the client consumes.

mod project;
mod task;
mod user;

pub use project::{Project, ProjectRef};
pub use task::{Membership, SectionRef, Task};
pub use user::User;

use serde::Deserialize;

/// Asana wraps every response body in a `{"data": ...}` envelope.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}
