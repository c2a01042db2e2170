use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;

use crate::models::{
    CalendarError, CalendarEvent, EventsPage, GoogleErrorBody, TimeRange, TokenResponse,
};
use crate::store::CalendarStore;

/// Upper bound Google accepts for a single events page.
const MAX_RESULTS: &str = "2500";

/// Google Calendar v3 client for a single calendar.
///
/// Holds the OAuth refresh token and exchanges it for an access token on
/// every call, so a client can be built per request from `AppConfig`.
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
    token_url: String,
    calendar_id: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    time_zone: String,
}

impl GoogleCalendarClient {
    pub fn new(config: &AppConfig) -> Result<Self, CalendarError> {
        if !config.is_calendar_configured() {
            return Err(CalendarError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.google_api_base_url.trim_end_matches('/').to_string(),
            token_url: config.google_token_url.clone(),
            calendar_id: config.google_calendar_id.clone(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            refresh_token: config.google_refresh_token.clone(),
            time_zone: config.calendar_time_zone.clone(),
        })
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    async fn access_token(&self) -> Result<String, CalendarError> {
        debug!("Exchanging refresh token at {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Google token exchange failed ({}): {}", status, body);
            return Err(CalendarError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| CalendarError::Decode(format!("token response: {}", e)))?;

        Ok(token.access_token)
    }

    fn get_headers(&self, access_token: &str) -> Result<HeaderMap, CalendarError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token))
                .map_err(|_| CalendarError::Auth("access token is not a valid header value".to_string()))?,
        );

        Ok(headers)
    }

    fn events_url(&self, event_id: Option<&str>) -> String {
        let calendar = urlencoding::encode(&self.calendar_id);
        match event_id {
            Some(id) => format!(
                "{}/calendars/{}/events/{}",
                self.base_url,
                calendar,
                urlencoding::encode(id)
            ),
            None => format!("{}/calendars/{}/events", self.base_url, calendar),
        }
    }

    async fn request<T>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&CalendarEvent>,
    ) -> Result<T, CalendarError>
    where
        T: DeserializeOwned,
    {
        let access_token = self.access_token().await?;
        debug!("Making {} request to {}", method, url);

        let mut req = self
            .client
            .request(method, url)
            .headers(self.get_headers(&access_token)?)
            .query(query);

        if let Some(event) = body {
            req = req.json(event);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GoogleErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            error!("Google Calendar API error ({}): {}", status, message);

            return Err(match status {
                StatusCode::NOT_FOUND | StatusCode::GONE => CalendarError::NotFound(message),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CalendarError::Auth(message),
                _ => CalendarError::Api { status: status.as_u16(), message },
            });
        }

        serde_json::from_str(&text).map_err(|e| CalendarError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CalendarStore for GoogleCalendarClient {
    async fn list_events(&self, range: &TimeRange) -> Result<Vec<CalendarEvent>, CalendarError> {
        let query = [
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("timeMin", range.time_min_param()),
            ("timeMax", range.time_max_param()),
            ("maxResults", MAX_RESULTS.to_string()),
            ("timeZone", self.time_zone.clone()),
        ];

        let page: EventsPage = self
            .request(Method::GET, &self.events_url(None), &query, None)
            .await?;

        if page.next_page_token.is_some() {
            warn!("Calendar {} has more than {} events in range, list truncated",
                  self.calendar_id, MAX_RESULTS);
        }

        debug!("Listed {} events from calendar {}", page.items.len(), self.calendar_id);
        Ok(page.items)
    }

    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent, CalendarError> {
        let query = [("timeZone", self.time_zone.clone())];
        self.request(Method::GET, &self.events_url(Some(event_id)), &query, None)
            .await
    }

    async fn insert_event(&self, event: &CalendarEvent) -> Result<CalendarEvent, CalendarError> {
        let created: CalendarEvent = self
            .request(Method::POST, &self.events_url(None), &[], Some(event))
            .await?;

        info!("Insert OK on {} -> {}", self.calendar_id,
              created.html_link.as_deref().unwrap_or("<no link>"));
        Ok(created)
    }

    async fn patch_event(
        &self,
        event_id: &str,
        patch: &CalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        let updated: CalendarEvent = self
            .request(Method::PATCH, &self.events_url(Some(event_id)), &[], Some(patch))
            .await?;

        info!("Patch OK on {} -> {}", self.calendar_id, event_id);
        Ok(updated)
    }
}
