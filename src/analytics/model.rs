use std::collections::HashMap;

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::utils::error::CustomError;

const MAX_FIELD_LENGTH: usize = 250;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Browser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub view_id: ObjectId,
    pub created_at: DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<Browser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<Screen>,
    /// UTM params captured on landing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Seconds until the next heartbeat of the same view; patched
    /// retroactively when that heartbeat arrives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HeartbeatRequest {
    pub datetime: Option<String>,
    pub browser: Option<Browser>,
    pub os: Option<String>,
    pub path: Option<String>,
    pub platform: Option<String>,
    pub referrer: Option<String>,
    pub screen: Option<Screen>,
    pub sources: Option<HashMap<String, String>>,
    pub timezone: Option<String>,
    pub user_agent: Option<String>,
}

fn check_len(value: &Option<String>) -> Result<(), CustomError> {
    match value {
        Some(s) if s.len() > MAX_FIELD_LENGTH => Err(CustomError::ValidationError(
            "Field exceeds maximum length".to_string(),
        )),
        _ => Ok(()),
    }
}

impl HeartbeatRequest {
    pub fn validate(&self) -> Result<(), CustomError> {
        check_len(&self.datetime)?;
        check_len(&self.os)?;
        check_len(&self.path)?;
        check_len(&self.platform)?;
        check_len(&self.referrer)?;
        check_len(&self.timezone)?;
        check_len(&self.user_agent)?;
        if let Some(browser) = &self.browser {
            check_len(&browser.name)?;
            check_len(&browser.version)?;
        }
        if let Some(screen) = &self.screen {
            check_len(&screen.orientation)?;
        }
        if let Some(sources) = &self.sources {
            for (key, value) in sources {
                if key.len() > MAX_FIELD_LENGTH || value.len() > MAX_FIELD_LENGTH {
                    return Err(CustomError::ValidationError(
                        "Field exceeds maximum length".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Client timestamp when parseable, otherwise the server clock.
    pub fn created_at(&self) -> DateTime {
        self.datetime
            .as_deref()
            .and_then(|dt| chrono::DateTime::parse_from_rfc3339(dt).ok())
            .map(|dt| DateTime::from_chrono(dt.with_timezone(&chrono::Utc)))
            .unwrap_or_else(DateTime::now)
    }

    pub fn into_event(self, view_id: ObjectId) -> AnalyticsEvent {
        let created_at = self.created_at();
        AnalyticsEvent {
            id: None,
            view_id,
            created_at,
            browser: self.browser,
            os: self.os,
            path: self.path,
            platform: self.platform,
            referrer: self.referrer,
            screen: self.screen,
            sources: self.sources.filter(|s| !s.is_empty()),
            timezone: self.timezone,
            user_agent: self.user_agent,
            duration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_request() -> HeartbeatRequest {
        HeartbeatRequest {
            datetime: None,
            browser: None,
            os: None,
            path: None,
            platform: None,
            referrer: None,
            screen: None,
            sources: None,
            timezone: None,
            user_agent: None,
        }
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let mut request = empty_request();
        request.path = Some("x".repeat(251));
        assert!(request.validate().is_err());

        request.path = Some("x".repeat(250));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn client_timestamp_is_parsed() {
        let mut request = empty_request();
        request.datetime = Some("2024-03-01T12:00:00.000Z".to_string());
        assert_eq!(request.created_at().timestamp_millis(), 1_709_294_400_000);
    }

    #[test]
    fn empty_sources_are_dropped() {
        let mut request = empty_request();
        request.sources = Some(HashMap::new());
        let event = request.into_event(ObjectId::new());
        assert!(event.sources.is_none());
    }
}
