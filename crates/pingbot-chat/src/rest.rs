//! Metadata client: authenticated lookups against the platform REST API.
//!
//! Exactly two operations are needed for the chat-session lifecycle:
//! "who owns this token" and "how do I connect to this channel's chat".
//! Single request/response each; no pagination, no retry.

use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;

use pingbot_core::{ConnectionDescriptor, Credential, Identity};

use crate::error::{ChatError, ChatResult};

/// REST client holding the bearer credential.
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
    credential: Credential,
}

/// `GET users/current` response.
#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    id: u64,
    username: String,
    channel: ChannelRef,
}

/// Nested channel object on the current-user response.
#[derive(Debug, Deserialize)]
struct ChannelRef {
    id: u64,
}

/// `GET chats/{channel_id}` response.
#[derive(Debug, Deserialize)]
struct JoinResponse {
    endpoints: Vec<String>,
    authkey: String,
}

impl MetadataClient {
    /// Create a client for `base_url` presenting `credential`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, credential: Credential) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            credential,
        }
    }

    /// Attach the bearer credential to an outbound request.
    ///
    /// Refuses to build the request once the credential has expired.
    /// Expiry is terminal for new requests, never retried.
    fn authorize(&self, request: RequestBuilder) -> ChatResult<RequestBuilder> {
        if self.credential.is_expired(Utc::now()) {
            return Err(ChatError::ExpiredCredential {
                expired_at: self.credential.expires_at(),
            });
        }
        Ok(request.bearer_auth(self.credential.token()))
    }

    /// Look up the identity owning the bearer token.
    ///
    /// # Errors
    ///
    /// [`ChatError::AuthRejected`] on any non-2xx response,
    /// [`ChatError::Network`] on transport failure,
    /// [`ChatError::ExpiredCredential`] once the token's expiry passed.
    pub async fn current_identity(&self) -> ChatResult<Identity> {
        let url = format!("{}/users/current", self.base_url);
        let response = self.authorize(self.http.get(&url))?.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::AuthRejected {
                status: status.as_u16(),
            });
        }

        let body: CurrentUserResponse = response.json().await?;
        debug!(user_id = body.id, username = %body.username, "Fetched current identity");
        Ok(Identity {
            user_id: body.id,
            username: body.username,
            channel_id: body.channel.id,
        })
    }

    /// Fetch the connection descriptor for one join attempt.
    ///
    /// The returned auth key is single-use and time-limited: consume it in
    /// the handshake immediately. It is never cached here.
    ///
    /// # Errors
    ///
    /// [`ChatError::ChannelNotFound`] for an unknown channel id,
    /// [`ChatError::AuthRejected`] on credential failure,
    /// [`ChatError::Network`] otherwise.
    pub async fn connection_descriptor(&self, channel_id: u64) -> ChatResult<ConnectionDescriptor> {
        let url = format!("{}/chats/{channel_id}", self.base_url);
        let response = self.authorize(self.http.get(&url))?.send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ChatError::ChannelNotFound { channel_id }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ChatError::AuthRejected {
                    status: response.status().as_u16(),
                });
            },
            _ => {},
        }
        let response = response.error_for_status()?;

        let body: JoinResponse = response.json().await?;
        debug!(
            channel_id,
            endpoints = body.endpoints.len(),
            "Fetched connection descriptor"
        );
        Ok(ConnectionDescriptor {
            endpoints: body.endpoints,
            auth_key: body.authkey,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fresh_credential() -> Credential {
        Credential::issued_now("secret-token")
    }

    fn expired_credential() -> Credential {
        let past = Utc::now()
            .checked_sub_signed(Duration::hours(1))
            .expect("in range");
        Credential::new("secret-token", past)
    }

    #[tokio::test]
    async fn current_identity_sends_bearer_and_maps_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/current"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "username": "Bot",
                "channel": {"id": 99, "token": "Bot"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = MetadataClient::new(server.uri(), fresh_credential());
        let identity = client.current_identity().await.unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.username, "Bot");
        assert_eq!(identity.channel_id, 99);
    }

    #[tokio::test]
    async fn current_identity_rejection_maps_to_auth_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/current"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = MetadataClient::new(server.uri(), fresh_credential());
        let err = client.current_identity().await.unwrap_err();
        assert!(matches!(err, ChatError::AuthRejected { status: 401 }));
    }

    #[tokio::test]
    async fn connection_descriptor_uses_the_requested_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chats/99"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "endpoints": ["wss://a.example", "wss://b.example"],
                "authkey": "K",
                "permissions": ["chat", "connect"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = MetadataClient::new(server.uri(), fresh_credential());
        let descriptor = client.connection_descriptor(99).await.unwrap();
        assert_eq!(
            descriptor.endpoints,
            vec!["wss://a.example".to_string(), "wss://b.example".to_string()]
        );
        assert_eq!(descriptor.auth_key, "K");
    }

    #[tokio::test]
    async fn unknown_channel_maps_to_channel_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chats/12345"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = MetadataClient::new(server.uri(), fresh_credential());
        let err = client.connection_descriptor(12345).await.unwrap_err();
        assert!(matches!(err, ChatError::ChannelNotFound { channel_id: 12345 }));
    }

    #[tokio::test]
    async fn forbidden_join_maps_to_auth_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chats/99"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = MetadataClient::new(server.uri(), fresh_credential());
        let err = client.connection_descriptor(99).await.unwrap_err();
        assert!(matches!(err, ChatError::AuthRejected { status: 403 }));
    }

    #[tokio::test]
    async fn expired_credential_fails_before_any_request() {
        // No mock mounted: an expired credential must short-circuit
        // without touching the network.
        let server = MockServer::start().await;
        let client = MetadataClient::new(server.uri(), expired_credential());

        let err = client.current_identity().await.unwrap_err();
        assert!(matches!(err, ChatError::ExpiredCredential { .. }));

        let err = client.connection_descriptor(99).await.unwrap_err();
        assert!(matches!(err, ChatError::ExpiredCredential { .. }));
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/current"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "username": "Bot",
                "channel": {"id": 2},
            })))
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        let client = MetadataClient::new(base, fresh_credential());
        assert!(client.current_identity().await.is_ok());
    }
}
