use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::{bed, patient, prelude::*, sea_orm_active_enums::BedStatus};

/// Row counts behind the ward gauges.
///
/// Room and bed deletes cascade in the database, so the gauges are set from
/// these counts after every structural change instead of being nudged by one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WardCounts {
    pub rooms: u64,
    pub beds: u64,
    pub occupied_beds: u64,
    pub patients: u64,
    pub needing_review: u64,
}

impl WardCounts {
    pub async fn load<C: ConnectionTrait>(db: &C) -> Result<Self, DbErr> {
        Ok(Self {
            rooms: Room::find().count(db).await?,
            beds: Bed::find().count(db).await?,
            occupied_beds: Bed::find()
                .filter(bed::Column::Status.eq(BedStatus::Occupied))
                .count(db)
                .await?,
            patients: Patient::find().count(db).await?,
            needing_review: Patient::find()
                .filter(patient::Column::NeedsReview.eq(true))
                .count(db)
                .await?,
        })
    }

    pub fn publish(&self) {
        metrics::gauge!("ward_rooms_total").set(self.rooms as f64);
        metrics::gauge!("ward_beds_total").set(self.beds as f64);
        metrics::gauge!("ward_beds_occupied").set(self.occupied_beds as f64);
        metrics::gauge!("ward_patients_total").set(self.patients as f64);
        metrics::gauge!("ward_patients_needing_review").set(self.needing_review as f64);
    }
}

/// Seeds the ward gauges from the current database state.
pub async fn init_metrics<C: ConnectionTrait>(db: &C) {
    match WardCounts::load(db).await {
        Ok(counts) => {
            counts.publish();
            tracing::info!(
                "Initialized metrics: Rooms={}, Beds={}, Patients={}",
                counts.rooms, counts.beds, counts.patients
            );
        }
        Err(err) => tracing::warn!(error = %err, "could not seed ward gauges"),
    }
}

/// Re-reads the ward gauges after a change to rooms, beds or patients.
pub async fn refresh_ward_gauges<C: ConnectionTrait>(db: &C) {
    match WardCounts::load(db).await {
        Ok(counts) => counts.publish(),
        Err(err) => tracing::warn!(error = %err, "ward gauges left stale"),
    }
}

pub fn user_created() {
    metrics::counter!("ward_users_registered_total").increment(1);
}

pub fn status_added(status_type: &str) {
    metrics::counter!("ward_patient_statuses_total", "status_type" => status_type.to_string())
        .increment(1);
}

pub fn review_flag_raised() {
    metrics::counter!("ward_review_flags_raised_total").increment(1);
}

pub fn menu_assigned() {
    metrics::counter!("ward_bed_menus_assigned_total").increment(1);
}

pub fn menu_consumed(servings: i32) {
    metrics::counter!("ward_bed_menus_consumed_total").increment(1);
    metrics::histogram!("ward_bed_menu_servings").record(f64::from(servings));
}

pub fn consumption_failed(reason: &str) {
    metrics::counter!("ward_bed_menu_consume_failed_total", "reason" => reason.to_string())
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    fn gauge_value(rendered: &str, name: &str) -> Option<f64> {
        rendered
            .lines()
            .find_map(|line| line.strip_prefix(name)?.strip_prefix(' ')?.trim().parse().ok())
    }

    #[test]
    fn publish_overwrites_previous_values() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            WardCounts {
                rooms: 3,
                beds: 7,
                occupied_beds: 2,
                patients: 4,
                needing_review: 1,
            }
            .publish();
            WardCounts {
                rooms: 2,
                beds: 5,
                ..Default::default()
            }
            .publish();
        });

        let rendered = handle.render();
        assert_eq!(gauge_value(&rendered, "ward_rooms_total"), Some(2.0));
        assert_eq!(gauge_value(&rendered, "ward_beds_total"), Some(5.0));
        assert_eq!(gauge_value(&rendered, "ward_beds_occupied"), Some(0.0));
        assert_eq!(gauge_value(&rendered, "ward_patients_needing_review"), Some(0.0));
    }
}
