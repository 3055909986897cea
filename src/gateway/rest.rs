use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::gateway::error::ServiceError;
use crate::gateway::TodoGateway;
use crate::model::{NewTodo, Todo, TodoUpdate};

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_MINIMAL: &str = "return=minimal";

/// [`TodoGateway`] over the PostgREST endpoint `{url}/rest/v1/{table}`.
pub struct RestGateway {
    client: Client,
    endpoint: Url,
    table: String,
    schema: String,
    api_key: String,
}

/// PostgREST answers with an array unless asked for a single object; accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum Rows {
    Many(Vec<Todo>),
    One(Todo),
}

impl Rows {
    fn into_single(self) -> Option<Todo> {
        match self {
            Rows::Many(rows) => rows.into_iter().next(),
            Rows::One(row) => Some(row),
        }
    }
}

impl RestGateway {
    pub fn new(config: &Config) -> Result<Self, ServiceError> {
        let base = config
            .service_url()
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Self::from_parts(
            base,
            &config.supabase.anon_key,
            &config.table.name,
            &config.table.schema,
            Duration::from_secs(config.defaults.connect_timeout_seconds),
        )
    }

    pub fn from_parts(
        base: Url,
        api_key: &str,
        table: &str,
        schema: &str,
        connect_timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ServiceError::Internal(format!("Failed to build HTTP client: {e}")))?;

        let mut endpoint = base;
        endpoint.set_query(None);
        let not_a_base = format!("'{endpoint}' cannot be a base URL");
        endpoint
            .path_segments_mut()
            .map_err(|()| ServiceError::Internal(not_a_base))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);

        Ok(Self {
            client,
            endpoint,
            table: table.to_string(),
            schema: schema.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Collection URL, e.g. `https://x.supabase.co/rest/v1/todos`.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url_for_id(&self, id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        // Reads select the schema with Accept-Profile, writes with Content-Profile.
        let profile_header = if method == Method::GET {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(ACCEPT, "application/json")
            .header(profile_header, &self.schema)
    }

    async fn execute(&self, builder: RequestBuilder, op: &'static str) -> Result<Vec<u8>, ServiceError> {
        let response = builder.send().await.map_err(|e| self.transport(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport(e))?;

        tracing::debug!(
            op,
            table = %self.table,
            status = status.as_u16(),
            bytes = body.len(),
            "gateway response"
        );

        if !status.is_success() {
            return Err(ServiceError::from_response(status.as_u16(), &body));
        }
        Ok(body.to_vec())
    }

    fn transport(&self, source: reqwest::Error) -> ServiceError {
        ServiceError::Transport {
            table: self.table.clone(),
            source,
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|e| ServiceError::Decode(e.to_string()))
}

#[async_trait]
impl TodoGateway for RestGateway {
    async fn list(&self) -> Result<Vec<Todo>, ServiceError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");
        let body = self.execute(self.request(Method::GET, url), "list").await?;
        decode(&body)
    }

    async fn create(&self, draft: &NewTodo) -> Result<Todo, ServiceError> {
        let builder = self
            .request(Method::POST, self.endpoint.clone())
            .header("Prefer", PREFER_REPRESENTATION)
            .json(draft);
        let body = self.execute(builder, "create").await?;
        decode::<Rows>(&body)?
            .into_single()
            .ok_or_else(|| ServiceError::Decode("insert returned no row".to_string()))
    }

    async fn update(&self, id: &str, update: &TodoUpdate) -> Result<Todo, ServiceError> {
        let builder = self
            .request(Method::PATCH, self.url_for_id(id))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(update);
        let body = self.execute(builder, "update").await?;
        decode::<Rows>(&body)?
            .into_single()
            .ok_or_else(|| ServiceError::NotFound { id: id.to_string() })
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let builder = self
            .request(Method::DELETE, self.url_for_id(id))
            .header("Prefer", PREFER_MINIMAL)
            .header(CONTENT_TYPE, "application/json");
        self.execute(builder, "delete").await?;
        Ok(())
    }
}
