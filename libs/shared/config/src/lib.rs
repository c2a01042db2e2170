use std::env;
use tracing::warn;

pub const DEFAULT_GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_TIME_ZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_DURATION_MINUTES: u32 = 50;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_refresh_token: String,
    pub google_calendar_id: String,
    pub google_api_base_url: String,
    pub google_token_url: String,
    /// IANA zone every wall-clock string in the system is interpreted in.
    pub calendar_time_zone: String,
    pub default_duration_minutes: u32,
    pub auth_jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .unwrap_or_else(|_| {
                    warn!("GOOGLE_CLIENT_ID not set, using empty value");
                    String::new()
                }),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("GOOGLE_CLIENT_SECRET not set, using empty value");
                    String::new()
                }),
            google_refresh_token: env::var("GOOGLE_REFRESH_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("GOOGLE_REFRESH_TOKEN not set, using empty value");
                    String::new()
                }),
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|_| {
                    warn!("GOOGLE_CALENDAR_ID not set, using empty value");
                    String::new()
                }),
            google_api_base_url: env::var("GOOGLE_CALENDAR_API_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_API_BASE_URL.to_string()),
            google_token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_TOKEN_URL.to_string()),
            calendar_time_zone: env::var("CALENDAR_TIME_ZONE")
                .unwrap_or_else(|_| DEFAULT_TIME_ZONE.to_string()),
            default_duration_minutes: parse_duration_var(env::var("DEFAULT_DURATION_MINUTES").ok()),
            auth_jwt_secret: env::var("AUTH_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("AUTH_JWT_SECRET not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.is_calendar_configured() && !self.auth_jwt_secret.is_empty()
    }

    pub fn is_calendar_configured(&self) -> bool {
        !self.google_client_id.is_empty()
            && !self.google_client_secret.is_empty()
            && !self.google_refresh_token.is_empty()
            && !self.google_calendar_id.is_empty()
    }
}

fn parse_duration_var(raw: Option<String>) -> u32 {
    match raw {
        None => DEFAULT_DURATION_MINUTES,
        Some(value) => match value.trim().parse::<u32>() {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                warn!("DEFAULT_DURATION_MINUTES={} is not a positive integer, using {}",
                      value, DEFAULT_DURATION_MINUTES);
                DEFAULT_DURATION_MINUTES
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_var_parsing() {
        assert_eq!(parse_duration_var(None), 50);
        assert_eq!(parse_duration_var(Some("60".to_string())), 60);
        assert_eq!(parse_duration_var(Some("0".to_string())), 50);
        assert_eq!(parse_duration_var(Some("abc".to_string())), 50);
    }
}
