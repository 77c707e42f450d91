use super::{RemoteError, RemoteResult};
use crate::gcp::{
    oauth2::{
        self,
        token::{AccessToken, Token, TokenGenerator},
    },
    Client, DeserializedResponse,
};
use bytes::BufMut;
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

struct TokenStateHolder<T> {
    client: Client,
    token_generator: T,
    token: RwLock<Token>,
}

impl<T> TokenStateHolder<T>
where
    T: TokenGenerator,
{
    async fn new(client: Client, token_generator: T) -> Result<Self, oauth2::Error> {
        let token = token_generator.get(&client).await?;
        tracing::debug!(scope = ?token.scope(), "access token acquired");
        Ok(Self {
            client,
            token_generator,
            token: RwLock::new(token),
        })
    }

    async fn get_token(&self) -> Option<AccessToken> {
        let t = self.token.read().await;

        if t.is_valid() {
            Some(t.access_token())
        } else {
            None
        }
    }

    async fn refresh_token(&self) -> RemoteResult<AccessToken> {
        if let Some(token) = self.get_token().await {
            Ok(token)
        } else {
            tracing::debug!("access token expired, requesting a new one");
            let t = self
                .token_generator
                .get(&self.client)
                .await
                .map_err(RemoteError::Token)?;
            let access_token = t.access_token();
            *self.token.write().await = t;
            Ok(access_token)
        }
    }
}

pub(super) struct DriveHttpClient<T> {
    client: Client,
    token_state_holder: TokenStateHolder<T>,
}

const MT_BOUNDARY: &str = "drive-csv-sync";
const MT_SEPARATOR: &[u8] = b"--drive-csv-sync\r\n";
const MT_END_SEPARATOR: &[u8] = b"\r\n--drive-csv-sync--";
const MT_METADATA_TYPE: &[u8] = b"Content-Type: application/json; charset=UTF-8\r\n\r\n";
const MT_CONTENT_TYPE: &[u8] = b"Content-Type: ";

// Specs: https://developers.google.com/drive/api/guides/manage-uploads#multipart
// POST https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart HTTP/1.1
// Authorization: Bearer <Token>
// Content-Type: multipart/related; boundary=drive-csv-sync
//
// --drive-csv-sync
// Content-Type: application/json; charset=UTF-8
//
// {"name": "test.csv", "mimeType": "text/csv", "parents": ["<folder id>"]}
// --drive-csv-sync
// Content-Type: text/csv
//
// <Payload>
// --drive-csv-sync--
pub(super) fn multipart_body(metadata: &[u8], content_type: &str, payload: &[u8]) -> bytes::Bytes {
    let len = 2 * MT_SEPARATOR.len()
        + MT_METADATA_TYPE.len()
        + metadata.len()
        + MT_CONTENT_TYPE.len()
        + content_type.len()
        + payload.len()
        + MT_END_SEPARATOR.len()
        + 6;
    let mut body = bytes::BytesMut::with_capacity(len);
    body.put_slice(MT_SEPARATOR);
    body.put_slice(MT_METADATA_TYPE);
    body.put_slice(metadata);
    body.put_slice(b"\r\n");
    body.put_slice(MT_SEPARATOR);
    body.put_slice(MT_CONTENT_TYPE);
    body.put_slice(content_type.as_bytes());
    body.put_slice(b"\r\n\r\n");
    body.put_slice(payload);
    body.put_slice(MT_END_SEPARATOR);
    body.freeze()
}

impl<T> DriveHttpClient<T>
where
    T: TokenGenerator,
{
    pub async fn new(client: Client, token_generator: T) -> Result<Self, oauth2::Error> {
        let token_state_holder = TokenStateHolder::new(client.clone(), token_generator).await?;

        Ok(Self {
            client,
            token_state_holder,
        })
    }

    async fn success_response(
        url: &str,
        response: reqwest::Response,
    ) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::ResourceNotFound {
                url: url.to_owned(),
            });
        }

        let err = response.text().await.map_err(RemoteError::Http)?;
        Err(RemoteError::unexpected_response(url, status.as_u16(), err))
    }

    async fn with_auth(&self, request_builder: RequestBuilder) -> RemoteResult<RequestBuilder> {
        Ok(request_builder.bearer_auth(self.token_state_holder.refresh_token().await?))
    }

    async fn json_response<R>(url: &str, response: reqwest::Response) -> RemoteResult<R>
    where
        R: DeserializeOwned,
    {
        let r: DeserializedResponse<R> = Self::success_response(url, response)
            .await?
            .json()
            .await
            .map_err(RemoteError::Http)?;
        r.into_result()
            .map_err(|err| RemoteError::unexpected_json::<R>(url, err))
    }

    pub async fn delete(&self, url: &str) -> RemoteResult<()> {
        let request = self.with_auth(self.client.client.delete(url)).await?;
        let response = request.send().await.map_err(RemoteError::Http)?;
        Self::success_response(url, response).await?;
        Ok(())
    }

    pub async fn get_as_json<R, Q>(&self, url: &str, query: &Q) -> RemoteResult<R>
    where
        R: DeserializeOwned,
        Q: Serialize,
    {
        let request = self
            .with_auth(self.client.client.get(url).query(query))
            .await?;
        let response = request.send().await.map_err(RemoteError::Http)?;
        Self::json_response(url, response).await
    }

    pub async fn send_multipart<M, R>(
        &self,
        method: Method,
        url: &str,
        metadata: &M,
        content_type: &str,
        payload: &[u8],
    ) -> RemoteResult<R>
    where
        M: Serialize,
        R: DeserializeOwned,
    {
        let json = serde_json::ser::to_vec(metadata).map_err(RemoteError::invalid_metadata::<M>)?;
        let body = multipart_body(&json, content_type, payload);

        let request = self.client.client.request(method, url);
        let request = self.with_auth(request).await?;
        let response = request
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", MT_BOUNDARY),
            )
            .body(body)
            .send()
            .await
            .map_err(RemoteError::Http)?;

        Self::json_response(url, response).await
    }
}
