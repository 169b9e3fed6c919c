use tracing::debug;

use crate::api::{ApiResult, HttpClient};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, User};

/// Auth endpoints. Login and register are the only calls that go out
/// without a bearer credential attached.
#[derive(Clone)]
pub struct AuthService {
    http: HttpClient,
}

impl AuthService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        debug!(email = %request.email, "Attempting login");
        self.http.post("/auth/login", request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        debug!(email = %request.email, "Attempting registration");
        self.http.post("/auth/register", request).await
    }

    /// Fetch the authenticated user's profile.
    pub async fn profile(&self) -> ApiResult<User> {
        self.http.get("/auth/profile").await
    }
}
