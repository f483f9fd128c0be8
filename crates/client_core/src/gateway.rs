use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use shared::error::{ApiErrorBody, ClientError};
use storage::SessionStore;

/// Protocol adapter in front of the backend API.
///
/// Reads the session store on every call to attach the bearer token, and
/// normalizes all failure responses into [`ClientError`]. It never mutates
/// the session itself; 401 policy lives in the session controller.
pub struct ApiGateway {
    http: Client,
    base_url: String,
    store: SessionStore,
}

impl ApiGateway {
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    pub async fn get<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Default,
    {
        let request = self.http.get(format!("{}{path}", self.base_url));
        self.dispatch(request).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let request = self.http.post(format!("{}{path}", self.base_url)).json(body);
        self.dispatch(request).await
    }

    /// POST for endpoints whose success body carries nothing the client
    /// consumes (plain-text acknowledgements included).
    pub async fn post_discard<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.http.post(format!("{}{path}", self.base_url)).json(body);
        self.dispatch_raw(request).await?;
        Ok(())
    }

    async fn dispatch<T>(&self, request: RequestBuilder) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Default,
    {
        let (status, bytes) = self.dispatch_raw(request).await?;
        if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            return Ok(T::default());
        }
        // A response did arrive, so a body we cannot decode is still an API
        // failure, not a transport one.
        serde_json::from_slice(&bytes).map_err(|err| {
            ClientError::api(status.as_u16(), format!("invalid response body: {err}"))
        })
    }

    async fn dispatch_raw(
        &self,
        request: RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let session = self.store.load().await;
        let request = match session.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|body| body.message)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            return Err(ClientError::api(status.as_u16(), message));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok((status, bytes.to_vec()))
    }
}
