use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use git_timelog_core::{CandidateTask, TargetKind, TimeEntry};
use tracing::{debug, info};
use ureq::Agent;
use ureq::http::Response;

use crate::error::{BasecampError, Result};
use crate::xml;

const XML_MEDIA_TYPE: &str = "application/xml";

/// Status line, `Location` header and body of a finished request.
struct Reply {
    status: u16,
    location: Option<String>,
    body: String,
}

impl Reply {
    fn read(mut response: Response<ureq::Body>) -> Result<Self> {
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get("Location")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.body_mut().read_to_string()?;
        Ok(Self {
            status,
            location,
            body,
        })
    }

    const fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Turn a non-success reply into the matching error.
    fn into_rejection(self) -> BasecampError {
        if self.is_unauthorized() {
            return BasecampError::Unauthorized(self.status);
        }
        BasecampError::Rejected(xml::error_messages(&self.body).unwrap_or_default())
    }

    /// Body of a `200 OK` read request.
    fn into_body(self, path: &str) -> Result<String> {
        if self.is_unauthorized() {
            return Err(BasecampError::Unauthorized(self.status));
        }
        if self.status != 200 {
            return Err(BasecampError::UnexpectedStatus {
                status: self.status,
                path: path.to_owned(),
            });
        }
        Ok(self.body)
    }

    /// Id of the resource announced by a `201 Created` reply.
    fn into_created_id(self) -> Result<u64> {
        if self.status != 201 {
            return Err(self.into_rejection());
        }
        self.location
            .as_deref()
            .and_then(trailing_id)
            .ok_or(BasecampError::MissingField("Location header"))
    }

    fn into_completed(self) -> Result<()> {
        if self.status != 200 {
            return Err(self.into_rejection());
        }
        Ok(())
    }
}

/// Blocking client for one Basecamp account.
pub struct BasecampClient {
    agent: Agent,
    endpoint: String,
    authorization: String,
}

impl BasecampClient {
    /// Client for the account at `endpoint`, authenticating with `token`.
    #[must_use]
    pub fn new(endpoint: &str, token: &str) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        let credentials = STANDARD.encode(format!("{token}:X"));
        Self {
            agent,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            authorization: format!("Basic {credentials}"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}.xml", self.endpoint)
    }

    fn get(&self, path: &str) -> Result<Reply> {
        debug!(path, "GET");
        let response = self
            .agent
            .get(&self.url(path))
            .header("Accept", XML_MEDIA_TYPE)
            .header("Content-Type", XML_MEDIA_TYPE)
            .header("Authorization", self.authorization.as_str())
            .call()?;
        Reply::read(response)
    }

    fn post(&self, path: &str, body: &str) -> Result<Reply> {
        debug!(path, "POST");
        let response = self
            .agent
            .post(&self.url(path))
            .header("Accept", XML_MEDIA_TYPE)
            .header("Content-Type", XML_MEDIA_TYPE)
            .header("Authorization", self.authorization.as_str())
            .send(body)?;
        Reply::read(response)
    }

    fn put_empty(&self, path: &str) -> Result<Reply> {
        debug!(path, "PUT");
        let response = self
            .agent
            .put(&self.url(path))
            .header("Accept", XML_MEDIA_TYPE)
            .header("Content-Type", XML_MEDIA_TYPE)
            .header("Authorization", self.authorization.as_str())
            .send("")?;
        Reply::read(response)
    }

    /// Id of the person owning the API token.
    ///
    /// # Errors
    /// Returns [`BasecampError::Unauthorized`] when the token is refused, or a
    /// transport/format error.
    pub fn me(&self) -> Result<u64> {
        let body = self.get("me")?.into_body("me")?;
        parse_person_id(&body)
    }

    /// Incomplete to-do items of the project.
    ///
    /// # Errors
    /// Returns an error if the to-do lists cannot be fetched or parsed.
    pub fn incomplete_tasks(&self, project_id: u64) -> Result<Vec<CandidateTask>> {
        let body = self.get("todo_lists")?.into_body("todo_lists")?;
        let tasks = xml::incomplete_tasks(&body, project_id)?;
        debug!(project_id, count = tasks.len(), "Fetched incomplete tasks");
        Ok(tasks)
    }

    /// File `entry` and return the id of the created time entry.
    ///
    /// # Errors
    /// Returns [`BasecampError::Rejected`] with the service's messages when the
    /// entry is not created.
    pub fn create_time_entry(&self, target: TargetKind, entry: &TimeEntry) -> Result<u64> {
        let id = self
            .post(&target.time_entries_path(), &entry.to_xml())?
            .into_created_id()?;
        info!(%target, id, hours = %entry.hours, "Created time entry");
        Ok(id)
    }

    /// Mark a to-do item as completed.
    ///
    /// # Errors
    /// Returns [`BasecampError::Rejected`] with the service's messages when the
    /// item is not completed.
    pub fn complete_task(&self, task_id: u64) -> Result<()> {
        self.put_empty(&format!("todo_items/{task_id}/complete"))?
            .into_completed()?;
        info!(task_id, "Completed task");
        Ok(())
    }
}

fn parse_person_id(body: &str) -> Result<u64> {
    xml::person_id(body)?.ok_or(BasecampError::MissingField("person id"))
}

/// Digits at the very end of a `Location` header value.
fn trailing_id(location: &str) -> Option<u64> {
    let digits_start = location
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |idx| idx + 1);
    location[digits_start..].parse().ok()
}
