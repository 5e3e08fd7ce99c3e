//! Typed client for the recipe and secure APIs.

use hearth::basic_models::{
    LoginDto, LoginResponse, RecipeCreateDto, RecipeDetailDto, RecipeSummaryDto, RegisterDto,
    SecureProbeResponse,
};
use serde::de::DeserializeOwned;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Server answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct HearthClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HearthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send this bearer token with every request from now on.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        Ok(self.send(builder).await?.json().await?)
    }

    pub async fn list_recipes(&self) -> Result<Vec<RecipeSummaryDto>, ApiError> {
        self.send_json(self.request(reqwest::Method::GET, "/api/recipes"))
            .await
    }

    pub async fn create_recipe(&self, recipe: &RecipeCreateDto) -> Result<RecipeDetailDto, ApiError> {
        self.send_json(self.request(reqwest::Method::POST, "/api/recipes").json(recipe))
            .await
    }

    pub async fn register(&self, credentials: &RegisterDto) -> Result<(), ApiError> {
        self.send(
            self.request(reqwest::Method::POST, "/api/Auth/register")
                .json(credentials),
        )
        .await?;
        Ok(())
    }

    pub async fn login(&self, credentials: &LoginDto) -> Result<LoginResponse, ApiError> {
        self.send_json(
            self.request(reqwest::Method::POST, "/api/Auth/login")
                .json(credentials),
        )
        .await
    }

    pub async fn test_secure(&self) -> Result<SecureProbeResponse, ApiError> {
        self.send_json(self.request(reqwest::Method::GET, "/api/Auth/test-secure"))
            .await
    }
}
