use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub google_api_base_url: String,
    pub google_token_url: String,
    pub calendar_id: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            google_api_base_url: "http://localhost:9999/calendar/v3".to_string(),
            google_token_url: "http://localhost:9999/token".to_string(),
            calendar_id: "agenda@studio.example".to_string(),
        }
    }
}

impl TestConfig {
    /// Points both Google endpoints at a mock server root.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            google_api_base_url: format!("{}/calendar/v3", uri),
            google_token_url: format!("{}/token", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            google_client_id: "test-client-id".to_string(),
            google_client_secret: "test-client-secret".to_string(),
            google_refresh_token: "test-refresh-token".to_string(),
            google_calendar_id: self.calendar_id.clone(),
            google_api_base_url: self.google_api_base_url.clone(),
            google_token_url: self.google_token_url.clone(),
            calendar_time_zone: "America/Sao_Paulo".to_string(),
            default_duration_minutes: 50,
            auth_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            role: "PACIENTE".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: "Test User".to_string(),
            role: role.to_string(),
        }
    }

    pub fn practitioner(email: &str) -> Self {
        Self::new(email, "PROFESSOR")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "ADMIN")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            name: Some(self.name.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "name": user.name,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockGoogleResponses;

impl MockGoogleResponses {
    pub fn token_response() -> Value {
        json!({
            "access_token": "ya29.test-access-token",
            "expires_in": 3599,
            "scope": "https://www.googleapis.com/auth/calendar",
            "token_type": "Bearer"
        })
    }

    /// A timed event as Google returns it when listed with `timeZone=America/Sao_Paulo`.
    pub fn event_response(id: &str, start: &str, end: &str, private: Value) -> Value {
        json!({
            "kind": "calendar#event",
            "id": id,
            "status": "confirmed",
            "htmlLink": format!("https://www.google.com/calendar/event?eid={}", id),
            "summary": private.get("patientName").cloned().unwrap_or(Value::Null),
            "start": { "dateTime": start, "timeZone": "America/Sao_Paulo" },
            "end": { "dateTime": end, "timeZone": "America/Sao_Paulo" },
            "extendedProperties": { "private": private }
        })
    }

    pub fn events_list_response(items: Vec<Value>) -> Value {
        json!({
            "kind": "calendar#events",
            "summary": "Agenda",
            "timeZone": "America/Sao_Paulo",
            "items": items
        })
    }

    pub fn error_response(code: u16, message: &str) -> Value {
        json!({
            "error": {
                "code": code,
                "message": message,
                "errors": [{ "message": message, "domain": "global", "reason": "backendError" }]
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.google_calendar_id, "agenda@studio.example");
        assert_eq!(app_config.calendar_time_zone, "America/Sao_Paulo");
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_mock_server_config() {
        let config = TestConfig::with_mock_server("http://127.0.0.1:4000").to_app_config();
        assert_eq!(config.google_api_base_url, "http://127.0.0.1:4000/calendar/v3");
        assert_eq!(config.google_token_url, "http://127.0.0.1:4000/token");
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::practitioner("ana@studio.example");
        assert_eq!(user.role, "PROFESSOR");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
