//! GraphQL-over-HTTP client for the host platform
//!
//! Every operation is a fixed query document plus a JSON `variables` object;
//! user input (emails, ids) only ever travels as a bound variable.

use reqwest::blocking::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::api::{ApiError, BoardApi};
use crate::core::config::Config;
use crate::core::model::{Board, BoardId, InvitedUser, RoleSelection, User, UserId};

const BOARDS_QUERY: &str = "query ($limit: Int) { boards(limit: $limit) { id name } }";

const USERS_QUERY: &str = "query { users { id name email } }";

const INVITE_MUTATION: &str = "mutation ($emails: [String!]!, $role: UserRole) { \
     invite_users(emails: $emails, user_role: $role) { \
     invited_users { id email } errors { message code email } } }";

const ADD_TO_BOARD_MUTATION: &str = "mutation ($boardId: ID!, $userIds: [ID!]!) { \
     add_users_to_board(board_id: $boardId, user_ids: $userIds) { id } }";

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlErrorEntry>>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct BoardsData {
    boards: Vec<Board>,
}

#[derive(Debug, Deserialize)]
struct UsersData {
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct InviteData {
    invite_users: InviteResult,
}

#[derive(Debug, Deserialize)]
struct InviteResult {
    invited_users: Option<Vec<InvitedUser>>,
    errors: Option<Vec<InviteErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct InviteErrorEntry {
    message: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddToBoardData {
    #[allow(dead_code)]
    add_users_to_board: IgnoredAny,
}

/// Blocking GraphQL client implementing [`BoardApi`]
pub struct GraphqlClient {
    http: Client,
    endpoint: String,
    token: String,
    api_version: Option<String>,
}

impl GraphqlClient {
    /// Create a client for `endpoint` authenticated with `token`
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bprov/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
            api_version: None,
        })
    }

    /// Build a client from the effective configuration
    pub fn from_config(config: &Config) -> miette::Result<Self> {
        let token = config.api_token().map_err(miette::Report::new)?;
        let client = Self::new(config.api_url(), token, config.timeout())
            .map_err(|e| miette::miette!("{}", e))?;
        Ok(client.with_api_version(config.api_version.clone()))
    }

    /// Pin the `API-Version` header
    pub fn with_api_version(mut self, version: Option<String>) -> Self {
        self.api_version = version;
        self
    }

    /// Execute one GraphQL operation and decode its `data`
    fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, ApiError> {
        debug!(endpoint = %self.endpoint, %variables, "graphql request");

        let mut request = self
            .http
            .post(&self.endpoint)
            .header("Authorization", &self.token)
            .json(&GraphqlRequest { query, variables });
        if let Some(ref version) = self.api_version {
            request = request.header("API-Version", version);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        parse_response(&body)
    }
}

/// Decode a GraphQL response body, surfacing remote errors
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let response: GraphqlResponse<T> =
        serde_json::from_str(body).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })?;

    let errors = response.errors.unwrap_or_default();
    if !errors.is_empty() {
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        return Err(ApiError::Remote {
            message: messages.join("; "),
        });
    }
    if let Some(message) = response.error_message {
        return Err(ApiError::Remote { message });
    }

    response.data.ok_or_else(|| ApiError::Decode {
        message: "response has no data".to_string(),
    })
}

impl BoardApi for GraphqlClient {
    fn list_boards(&self, limit: u32) -> Result<Vec<Board>, ApiError> {
        let data: BoardsData = self.execute(BOARDS_QUERY, json!({ "limit": limit }))?;
        Ok(data.boards)
    }

    fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let data: UsersData = self.execute(USERS_QUERY, json!({}))?;
        Ok(data.users)
    }

    fn invite_users(
        &self,
        emails: &[String],
        role: RoleSelection,
    ) -> Result<Vec<InvitedUser>, ApiError> {
        let data: InviteData = self.execute(
            INVITE_MUTATION,
            json!({ "emails": emails, "role": role.as_api_value() }),
        )?;
        let invited = data.invite_users.invited_users.unwrap_or_default();
        let errors = data.invite_users.errors.unwrap_or_default();

        for error in &errors {
            warn!(
                email = error.email.as_deref().unwrap_or("-"),
                "invite error: {}", error.message
            );
        }
        if invited.is_empty() && !errors.is_empty() {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ApiError::Remote {
                message: messages.join("; "),
            });
        }

        Ok(invited)
    }

    fn add_users_to_board(&self, board_id: &BoardId, user_ids: &[UserId]) -> Result<(), ApiError> {
        let _: AddToBoardData = self.execute(
            ADD_TO_BOARD_MUTATION,
            json!({ "boardId": board_id, "userIds": user_ids }),
        )?;
        Ok(())
    }
}
