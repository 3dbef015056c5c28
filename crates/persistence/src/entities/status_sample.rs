//! Status sample entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SampleStatus;
use sqlx::FromRow;

/// Database row mapping for the status_samples table.
#[derive(Debug, Clone, FromRow)]
pub struct StatusSampleEntity {
    pub id: i64,
    pub ip: String,
    pub name: String,
    pub status: String,
    pub datetime: DateTime<Utc>,
    pub response_time: Option<f64>,
}

impl From<StatusSampleEntity> for domain::models::StatusSample {
    fn from(entity: StatusSampleEntity) -> Self {
        Self {
            ip: entity.ip,
            name: entity.name,
            status: entity
                .status
                .parse::<SampleStatus>()
                .unwrap_or(SampleStatus::Offline),
            datetime: entity.datetime,
            response_time: entity.response_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_entity_to_domain() {
        let now = Utc::now();
        let entity = StatusSampleEntity {
            id: 42,
            ip: "10.1.1.1".to_string(),
            name: "Printer".to_string(),
            status: "warning".to_string(),
            datetime: now,
            response_time: Some(120.5),
        };

        let sample: domain::models::StatusSample = entity.into();
        assert_eq!(sample.status, SampleStatus::Warning);
        assert_eq!(sample.datetime, now);
        assert_eq!(sample.response_time, Some(120.5));
    }
}
