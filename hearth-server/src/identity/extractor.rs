use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use super::token::TokenService;
use crate::errors::WebError;

/// The caller identified by a valid `Authorization: Bearer` token.
///
/// Adding this to a handler's arguments is what makes the route protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Result<&str, WebError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| WebError::Unauthenticated("no Authorization header".into()))?
        .to_str()
        .map_err(|_| WebError::Unauthenticated("Authorization header is not text".into()))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("Bearer") => Ok(token.trim()),
        _ => Err(WebError::Unauthenticated("not a bearer token".into())),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);
        let claims = tokens
            .validate(bearer_token(parts)?)
            .map_err(|e| WebError::Unauthenticated(e.to_string()))?;
        Ok(Self {
            user_id: claims.nameid,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{models::ApplicationUser, token::tests::jwt_config};
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    async fn extract(authorization: Option<&str>) -> Result<AuthenticatedUser, WebError> {
        let tokens = TokenService::new(&jwt_config()).unwrap();
        let mut request = Request::builder().uri("/");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = request.body(()).unwrap().into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &tokens).await
    }

    #[tokio::test]
    async fn accepts_a_valid_bearer_token() {
        let tokens = TokenService::new(&jwt_config()).unwrap();
        let user = ApplicationUser::new("cook@example.com", "hash".into());
        let token = tokens.create_token(&user).unwrap();
        let caller = extract(Some(&format!("Bearer {}", token))).await.unwrap();
        assert_eq!(caller.email, "cook@example.com");
        assert_eq!(caller.user_id, user.user_id);
    }

    #[tokio::test]
    async fn rejects_everything_else() {
        for header in [None, Some("Basic Y29vaw=="), Some("Bearer nope"), Some("Bearer")] {
            let rejection = extract(header).await.unwrap_err();
            assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
