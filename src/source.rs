//! Remote ticket source: fetches a project's tasks and maps the ones
//! sitting in the "In Progress" section into fresh tickets.

use crate::error::ErrorKind;
use crate::ticket::Ticket;
use asana_api::{AsanaClient, AsanaError};
use log::{debug, info};

/// Case-insensitive substring a section name must contain for its tasks to
/// count as in-progress work.
pub const IN_PROGRESS_SECTION: &str = "in progress";

/// Queries the remote project and produces untracked tickets. Stateless
/// apart from the configured section filter.
pub struct RemoteTicketSource {
    section_filter: String,
}

impl RemoteTicketSource {
    pub fn new() -> Self {
        Self {
            section_filter: IN_PROGRESS_SECTION.to_string(),
        }
    }

    /// Confirms the project is accessible, then lists and filters its tasks.
    ///
    /// Error mapping follows the probe contract: 401/403 anywhere means the
    /// credential is dead, a project id that does not resolve is `NotFound`,
    /// anything else is `Transport`. Callers keep existing ticket state on
    /// failure; an incomplete fetch never clears anything.
    pub async fn fetch_tickets(
        &self,
        client: &AsanaClient,
        project_id: &str,
    ) -> Result<Vec<Ticket>, ErrorKind> {
        client
            .get_project(project_id)
            .await
            .map_err(classify_probe_error)?;

        let tasks = client
            .list_project_tasks(project_id)
            .await
            .map_err(|err| ErrorKind::from(&err))?;
        debug!("Received {} tasks from remote", tasks.len());

        let tickets: Vec<Ticket> = tasks
            .into_iter()
            .filter(|task| !task.completed && task.in_section_of(project_id, &self.section_filter))
            .map(|task| Ticket::new(task.gid, task.name.unwrap_or_default()))
            .collect();
        info!("Filtered to {} in-progress tickets", tickets.len());
        Ok(tickets)
    }

    /// Resolves the project's display name; absent on any failure.
    pub async fn project_name(&self, client: &AsanaClient, project_id: &str) -> Option<String> {
        match client.get_project(project_id).await {
            Ok(project) => project.name,
            Err(err) => {
                debug!("Project name lookup failed: {}", err);
                None
            }
        }
    }

    /// Remote probe for a user-supplied project id: Ok(true) when the id
    /// resolves, Ok(false) when it does not, Err when the credential or the
    /// transport failed and no judgement can be made about the id.
    pub async fn validate_project_id(
        &self,
        client: &AsanaClient,
        project_id: &str,
    ) -> Result<bool, ErrorKind> {
        match client.get_project(project_id).await {
            Ok(_) => Ok(true),
            Err(AsanaError::NotFound(_)) | Err(AsanaError::Http { .. }) => Ok(false),
            Err(AsanaError::Authentication(_)) => Err(ErrorKind::Unauthenticated),
            Err(_) => Err(ErrorKind::Transport),
        }
    }

    /// Lists the project ids the session can see, for validation flows.
    pub async fn accessible_projects(
        &self,
        client: &AsanaClient,
    ) -> Result<Vec<String>, ErrorKind> {
        let projects = client
            .list_projects()
            .await
            .map_err(|err| ErrorKind::from(&err))?;
        Ok(projects.into_iter().map(|project| project.gid).collect())
    }
}

impl Default for RemoteTicketSource {
    fn default() -> Self {
        Self::new()
    }
}

/// A user-supplied project id must be a non-empty string of digits.
pub fn looks_like_project_id(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

fn classify_probe_error(err: AsanaError) -> ErrorKind {
    match err {
        AsanaError::Authentication(_) => ErrorKind::Unauthenticated,
        AsanaError::NotFound(_) | AsanaError::Http { .. } => ErrorKind::NotFound,
        _ => ErrorKind::Transport,
    }
}
