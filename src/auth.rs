use std::sync::Arc;
use tracing::{info, warn};

use crate::backend_service::{BackendClient, SigninRequest, SignupForm, UserProfile};
use crate::error::BackendError;

/// Signed-in user, held in memory only.
pub struct AuthSession {
    backend: Arc<BackendClient>,
    user: Option<UserProfile>,
}

impl AuthSession {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend, user: None }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&UserProfile, String> {
        let request = SigninRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.backend.signin(&request).await {
            Ok(response) => {
                info!("Signed in as {}", response.user.email);
                Ok(self.user.insert(response.user))
            }
            Err(e) => {
                warn!("Sign-in failed: {}", e);
                Err(server_detail_or(&e, "Login failed"))
            }
        }
    }

    /// Create an account, then sign in locally with the submitted email and name.
    pub async fn sign_up(&mut self, form: &SignupForm) -> Result<&UserProfile, String> {
        match self.backend.signup(form).await {
            Ok(response) if response.user_id.is_some() => {
                info!("Created account for {}", form.email);
                Ok(self.user.insert(UserProfile {
                    id: response.user_id,
                    email: form.email.clone(),
                    name: Some(form.full_name.clone()),
                    gpu: None,
                    ros_level: None,
                    programming_level: None,
                    preferred_language: None,
                }))
            }
            Ok(_) => Err("Signup failed".to_string()),
            Err(e) => {
                warn!("Sign-up failed: {}", e);
                Err(server_detail_or(&e, "Signup failed"))
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }
}

/// Auth forms show the server's detail, otherwise a fixed message.
fn server_detail_or(err: &BackendError, fallback: &str) -> String {
    match err {
        BackendError::Server {
            detail: Some(detail),
            ..
        } if !detail.trim().is_empty() => detail.clone(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_backend, unreachable_base_url};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn auth_app() -> Router {
        Router::new()
            .route(
                "/auth/signin",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "blank-detail" {
                        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "  "})))
                    } else if body["password"] == "secret" {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "message": "Login successful",
                                "user": {
                                    "id": "u-1",
                                    "email": body["email"],
                                    "name": "Ada",
                                    "gpu": "RTX 4090",
                                    "ros_level": "Expert",
                                    "programming_level": "Expert",
                                    "preferred_language": "ur"
                                },
                                "tokens": {"access_token": "a", "refresh_token": "r"}
                            })),
                        )
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"detail": "Invalid credentials"})),
                        )
                    }
                }),
            )
            .route(
                "/auth/signup",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["gpu"], "None");
                    Json(json!({"message": "User created successfully", "user_id": "u-2"}))
                }),
            )
    }

    #[tokio::test]
    async fn test_sign_in_stores_user() {
        let backend = Arc::new(BackendClient::new(spawn_backend(auth_app()).await));
        let mut auth = AuthSession::new(backend);

        let user = auth.sign_in("ada@example.org", "secret").await.unwrap();
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert!(auth.is_signed_in());

        auth.sign_out();
        assert!(auth.user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_failure_shows_detail() {
        let backend = Arc::new(BackendClient::new(spawn_backend(auth_app()).await));
        let mut auth = AuthSession::new(backend);

        let err = auth.sign_in("ada@example.org", "wrong").await.unwrap_err();
        assert_eq!(err, "Invalid credentials");
        assert!(!auth.is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_up_signs_in_locally() {
        let backend = Arc::new(BackendClient::new(spawn_backend(auth_app()).await));
        let mut auth = AuthSession::new(backend);
        let form = SignupForm {
            email: "grace@example.org".to_string(),
            password: "pw".to_string(),
            full_name: "Grace".to_string(),
            ..SignupForm::default()
        };

        let user = auth.sign_up(&form).await.unwrap();
        assert_eq!(user.email, "grace@example.org");
        assert_eq!(user.name.as_deref(), Some("Grace"));
        assert_eq!(user.id, Some(json!("u-2")));
        assert!(user.gpu.is_none());
        assert!(user.preferred_language.is_none());
    }

    #[tokio::test]
    async fn test_blank_detail_falls_back() {
        let backend = Arc::new(BackendClient::new(spawn_backend(auth_app()).await));
        let mut auth = AuthSession::new(backend);

        let err = auth.sign_in("ada@example.org", "blank-detail").await.unwrap_err();
        assert_eq!(err, "Login failed");
    }

    #[test]
    fn test_server_detail_or() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        let with_detail = BackendError::Server {
            status,
            detail: Some("Email already registered".to_string()),
        };
        let empty = BackendError::Server {
            status,
            detail: Some(String::new()),
        };
        assert_eq!(server_detail_or(&with_detail, "Signup failed"), "Email already registered");
        assert_eq!(server_detail_or(&empty, "Signup failed"), "Signup failed");
        assert_eq!(
            server_detail_or(&BackendError::Transport("refused".to_string()), "Login failed"),
            "Login failed"
        );
    }

    #[tokio::test]
    async fn test_unreachable_uses_fallback_messages() {
        let backend = Arc::new(BackendClient::new(unreachable_base_url().await));
        let mut auth = AuthSession::new(backend);

        assert_eq!(auth.sign_in("a", "b").await.unwrap_err(), "Login failed");
        assert_eq!(
            auth.sign_up(&SignupForm::default()).await.unwrap_err(),
            "Signup failed"
        );
    }
}
