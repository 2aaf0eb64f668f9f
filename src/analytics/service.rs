use futures_util::TryStreamExt;
use mongodb::bson::{DateTime, doc};
use mongodb::{Client, Collection};

use crate::analytics::model::AnalyticsEvent;
use crate::database::blog_database;
use crate::utils::error::CustomError;

pub struct AnalyticsService {
    collection: Collection<AnalyticsEvent>,
}

pub fn elapsed_seconds(from: DateTime, to: DateTime) -> f64 {
    (to.timestamp_millis() - from.timestamp_millis()) as f64 / 1000.0
}

/// Ten years of history is more than the dashboard will ever chart.
const MAX_QUERY_DAYS: i64 = 3650;

fn cutoff_for(days: i64) -> DateTime {
    let days = days.clamp(0, MAX_QUERY_DAYS);
    DateTime::from_chrono(chrono::Utc::now() - chrono::Duration::days(days))
}

impl AnalyticsService {
    pub fn new(client: &Client) -> Self {
        let collection = blog_database(client).collection::<AnalyticsEvent>("analytics");
        AnalyticsService { collection }
    }

    /// Inserts the event; first patches the `duration` of the previous
    /// event of the same view with the time elapsed between the two.
    pub async fn record(&self, event: AnalyticsEvent) -> Result<(), CustomError> {
        let last_event = self
            .collection
            .find(doc! { "viewId": event.view_id })
            .sort(doc! { "_id": -1 })
            .limit(1)
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to query events: {}", e)))?
            .try_next()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to read events: {}", e)))?;

        if let Some(last) = last_event {
            if let Some(last_id) = last.id {
                let duration = elapsed_seconds(last.created_at, event.created_at);
                self.collection
                    .update_one(
                        doc! { "_id": last_id },
                        doc! { "$set": { "duration": duration } },
                    )
                    .await
                    .map_err(|e| {
                        CustomError::InternalServerError(format!("Failed to patch duration: {}", e))
                    })?;
            }
        }

        self.collection
            .insert_one(event)
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to insert event: {}", e)))?;

        Ok(())
    }

    pub async fn views_since(&self, days: i64) -> Result<Vec<AnalyticsEvent>, CustomError> {
        let cutoff = cutoff_for(days);

        self.collection
            .find(doc! { "createdAt": { "$gte": cutoff } })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to query events: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to read events: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_elapsed_seconds() {
        let from = DateTime::from_millis(1_000_000);
        let to = DateTime::from_millis(1_012_500);
        assert_eq!(elapsed_seconds(from, to), 12.5);
    }

    #[test]
    fn duration_can_be_subsecond() {
        let from = DateTime::from_millis(5_000);
        let to = DateTime::from_millis(5_250);
        assert_eq!(elapsed_seconds(from, to), 0.25);
    }

    #[test]
    fn cutoff_survives_absurd_day_counts() {
        let now = chrono::Utc::now().timestamp_millis();
        let floor = now - (MAX_QUERY_DAYS + 1) * 24 * 60 * 60 * 1000;

        let cutoff = cutoff_for(i64::MAX);
        assert!(cutoff.timestamp_millis() >= floor);
        assert!(cutoff.timestamp_millis() <= now);

        // Negative ranges collapse to "now".
        assert!(cutoff_for(i64::MIN).timestamp_millis() >= now - 1000);
    }
}
