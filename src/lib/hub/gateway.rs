use log::{debug, info, warn};
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client, Method, StatusCode,
};
use serde::Serialize;

use super::{
    error::ApiError,
    models::dto_model::{AuthResponse, RefreshRequest},
    session::{SessionStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY},
};

/// A file sent as one part of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FilePart>),
}

/// A request that can be sent more than once, which a refresh-and-retry needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        ApiRequest {
            method,
            url: url.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn query<K: Into<String>, V: Into<String>>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FilePart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }
}

/// Status, content type and the whole body of an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.contains("application/json"))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A trait, necessary for every entity that can deliver a request to the backend.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError>;
}

/// Allows Client to deliver requests to the real backend.
impl Transport for Client {
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        info!("{} {}", request.method, request.url);
        let mut builder = self.request(request.method.clone(), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => {
                let form = parts.iter().fold(Form::new(), |form, part| {
                    form.part(
                        part.field.clone(),
                        Part::bytes(part.bytes.clone()).file_name(part.file_name.clone()),
                    )
                });
                builder.multipart(form)
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?.to_vec();
        debug!("{} {} answered {}", request.method, request.url, status);
        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Sends requests under the backend's API prefix, attaching and refreshing
/// the session's bearer token where asked to.
pub struct Gateway<T, S> {
    transport: T,
    session: S,
    base_url: String,
}

impl<T: Transport, S: SessionStore> Gateway<T, S> {
    pub fn new(transport: T, session: S, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Gateway {
            transport,
            session,
            base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a public request, without any token.
    pub async fn fetch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport.execute(request, None).await
    }

    /// Sends a request with the stored access token. A 401 answer triggers
    /// one token refresh and one retry; when the refresh gives nothing, the
    /// original 401 response is returned as is.
    pub async fn auth_fetch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = self.session.get(ACCESS_TOKEN_KEY);
        let response = self.transport.execute(request, token.as_deref()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        match self.refresh_access_token().await {
            Some(new_token) => {
                debug!("Retrying {} {} with a refreshed token", request.method, request.url);
                self.transport.execute(request, Some(&new_token)).await
            }
            None => Ok(response),
        }
    }

    /// Writes both tokens; `None` removes the corresponding key.
    pub fn store_tokens(&self, access: Option<&str>, refresh: Option<&str>) {
        for (key, value) in [(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)] {
            if let Err(err) = self.session.set(key, value) {
                warn!("Could not store {}: {}", key, err);
            }
        }
    }

    async fn refresh_access_token(&self) -> Option<String> {
        let refresh_token = self.session.get(REFRESH_TOKEN_KEY)?;
        let request = ApiRequest::post(self.url("auth/refresh-token"))
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .ok()?;

        let response = match self.transport.execute(&request, None).await {
            Ok(response) => response,
            Err(err) => {
                warn!("Could not refresh access token: {}", err);
                return None;
            }
        };
        if !response.status.is_success() {
            info!("Refresh token rejected with {}, signing out", response.status);
            self.store_tokens(None, None);
            return None;
        }

        let tokens: AuthResponse = match serde_json::from_slice(&response.body) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!("Could not read refreshed tokens: {}", err);
                return None;
            }
        };
        let access = tokens.access()?.to_owned();
        let refresh = tokens.refresh_token.unwrap_or(refresh_token);
        self.store_tokens(Some(&access), Some(&refresh));
        Some(access)
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
