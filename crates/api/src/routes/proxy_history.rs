//! Pass-through of the ping engine's own status history.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ProxyHistoryQuery {
    pub ip: Option<String>,
    pub minutes: Option<String>,
}

impl ProxyHistoryQuery {
    /// Both parameters are required; `minutes` must be a positive integer.
    pub fn parse(self) -> Result<(String, u32), ApiError> {
        let ip = self.ip.map(|ip| ip.trim().to_string()).unwrap_or_default();
        let minutes = self.minutes.unwrap_or_default();

        if ip.is_empty() || minutes.trim().is_empty() {
            return Err(ApiError::Validation(
                "ip and minutes are required".to_string(),
            ));
        }

        match minutes.trim().parse::<u32>() {
            Ok(minutes) if minutes > 0 => Ok((ip, minutes)),
            _ => Err(ApiError::Validation(
                "minutes must be a positive integer".to_string(),
            )),
        }
    }
}

/// GET /api/proxy-status-history?ip=&minutes=
pub async fn proxy_status_history(
    State(state): State<AppState>,
    Query(query): Query<ProxyHistoryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (ip, minutes) = query.parse()?;
    let history = state.status_source.fetch_history(&ip, minutes).await?;
    Ok(Json(history))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(ip: Option<&str>, minutes: Option<&str>) -> ProxyHistoryQuery {
        ProxyHistoryQuery {
            ip: ip.map(String::from),
            minutes: minutes.map(String::from),
        }
    }

    #[test]
    fn test_parse_valid() {
        let (ip, minutes) = query(Some("10.0.0.1"), Some("30")).parse().unwrap();
        assert_eq!(ip, "10.0.0.1");
        assert_eq!(minutes, 30);
    }

    #[test]
    fn test_parse_missing_parameters() {
        assert!(matches!(
            query(None, Some("30")).parse(),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            query(Some("10.0.0.1"), None).parse(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_minutes() {
        assert!(query(Some("10.0.0.1"), Some("0")).parse().is_err());
        assert!(query(Some("10.0.0.1"), Some("soon")).parse().is_err());
    }
}
