//! HTTP client for the feed endpoints.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use social_shared::dto::{
    CommentCreatedResponse, CommentListResponse, NewCommentRequest, PostCreatedResponse,
    PostListResponse,
};
use social_shared::{ErrorResponse, MessageResponse};

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Cannot connect to the server. Is it running?")]
    Connection,

    #[error("The server did not answer in time")]
    Timeout,

    /// The server answered with an error status.
    #[error("{0}")]
    Api(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ClientError::Connection
        } else if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// An image to attach to a new post.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Feed API client.
pub struct FeedClient {
    client: Client,
    base_url: String,
}

impl FeedClient {
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Whether the server answers the feed endpoint.
    pub async fn is_running(&self) -> bool {
        match self
            .client
            .get(self.url("get-posts/"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(error = %err, "Probe failed");
                false
            }
        }
    }

    pub async fn get_posts(&self) -> Result<PostListResponse, ClientError> {
        self.send(self.client.get(self.url("get-posts/"))).await
    }

    pub async fn create_post(
        &self,
        content: &str,
        username: &str,
        image: Option<Attachment>,
    ) -> Result<PostCreatedResponse, ClientError> {
        let mut form = multipart::Form::new()
            .text("content", content.to_string())
            .text("username", username.to_string());
        if let Some(image) = image {
            form = form.part(
                "image",
                multipart::Part::bytes(image.bytes).file_name(image.filename),
            );
        }

        self.send(
            self.client
                .post(self.url("create-post/"))
                .multipart(form)
                .timeout(UPLOAD_TIMEOUT),
        )
        .await
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<MessageResponse, ClientError> {
        self.send(
            self.client
                .delete(self.url(&format!("delete-post/{post_id}/"))),
        )
        .await
    }

    pub async fn add_comment(
        &self,
        post_id: i64,
        content: &str,
        username: Option<&str>,
    ) -> Result<CommentCreatedResponse, ClientError> {
        let body = NewCommentRequest {
            content: content.to_string(),
            username: username.map(str::to_owned),
        };
        self.send(
            self.client
                .post(self.url(&format!("add-comment/{post_id}/")))
                .json(&body),
        )
        .await
    }

    pub async fn get_comments(&self, post_id: i64) -> Result<CommentListResponse, ClientError> {
        self.send(
            self.client
                .get(self.url(&format!("get-comments/{post_id}/"))),
        )
        .await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let mut request = request.build()?;
        if request.timeout().is_none() {
            *request.timeout_mut() = Some(DEFAULT_TIMEOUT);
        }
        tracing::debug!(method = %request.method(), url = %request.url(), "Sending request");

        let response = self.client.execute(request).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()));
    }

    tracing::debug!(status = %status, "Request rejected");
    Err(ClientError::Api(error_message(&body)))
}

/// The server's error text, or "Unknown error" if there is none.
pub fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(ErrorResponse::Message { error }) => error,
        Ok(fields @ ErrorResponse::Fields { .. }) => fields.summary(),
        Err(_) => "Unknown error".to_string(),
    }
}
