use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hearth::basic_models::{
    LoginDto, LoginResponse, RegisterDto, RegisterErrors, SecureProbeResponse,
};

use super::extractor::AuthenticatedUser;
use super::models::ApplicationUser;
use super::password::{hash_password, verify_against_decoy, verify_password};
use super::store::UserStore;
use super::token::TokenService;
use super::IdentityResult;
use crate::config::PasswordPolicy;
use crate::errors::{WebError, WebResult};
use crate::validation::ValidatedJson;

#[derive(Clone)]
pub struct AuthState {
    pub users: UserStore,
    pub tokens: TokenService,
    pub policy: PasswordPolicy,
}

impl FromRef<AuthState> for TokenService {
    fn from_ref(state: &AuthState) -> Self {
        state.tokens.clone()
    }
}

/// The secure API. Auth routes answer under `/api/Auth` and `/api/auth` alike.
pub fn router(state: AuthState) -> Router {
    let auth = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/test-secure", get(test_secure));
    Router::new()
        .route("/", get(root))
        .nest("/api/Auth", auth.clone())
        .nest("/api/auth", auth)
        .with_state(state)
}

async fn root() -> &'static str {
    "API is running! Try /api/Auth/register"
}

async fn create_user(state: &AuthState, dto: &RegisterDto) -> IdentityResult<()> {
    state.policy.check(&dto.password)?;
    let hash = hash_password(&dto.password)?;
    state.users.create(ApplicationUser::new(&dto.email, hash)).await
}

async fn register(
    State(state): State<AuthState>,
    ValidatedJson(dto): ValidatedJson<RegisterDto>,
) -> WebResult<Response> {
    match create_user(&state, &dto).await {
        Ok(()) => {
            tracing::info!("Registered {}", dto.email);
            Ok((StatusCode::OK, "User registered successfully.").into_response())
        }
        Err(err) => match err.descriptions() {
            Some(errors) => {
                tracing::info!("Refused registration for {}: {}", dto.email, err);
                Ok((StatusCode::BAD_REQUEST, Json(RegisterErrors { errors })).into_response())
            }
            None => Err(WebError::Internal(err.into())),
        },
    }
}

async fn login(
    State(state): State<AuthState>,
    ValidatedJson(dto): ValidatedJson<LoginDto>,
) -> WebResult<Json<LoginResponse>> {
    let user = state
        .users
        .find_by_email(&dto.email)
        .await
        .map_err(|e| WebError::Internal(e.into()))?;
    let Some(user) = user else {
        verify_against_decoy(&dto.password);
        return Err(WebError::Auth(format!("unknown user {}", dto.email)));
    };
    if !verify_password(&dto.password, &user.password_hash) {
        return Err(WebError::Auth(format!("wrong password for {}", dto.email)));
    }
    let token = state
        .tokens
        .create_token(&user)
        .map_err(|e| WebError::Internal(e.into()))?;
    Ok(Json(LoginResponse {
        token,
        email: user.email,
    }))
}

async fn test_secure(user: AuthenticatedUser) -> Json<SecureProbeResponse> {
    Json(SecureProbeResponse {
        message: "Secure access granted!".into(),
        authenticated_user: Some(user.email),
    })
}
