use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::rates::RateSnapshot;
use crate::models::settings::Settings;
use crate::replies::{self, Reply};
use crate::services::rate_service::RateService;
use crate::storage::traits::TransactionStore;

/// Outbound side of the chat transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `reply` to the chat of `user_id`.
    async fn send(&self, user_id: &str, reply: &Reply) -> Result<(), CoreError>;
}

/// Local hours at which the market bulletin goes out.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletinSchedule {
    hours: Vec<u32>,
    offset: FixedOffset,
}

impl BulletinSchedule {
    pub fn new(hours: Vec<u32>, offset: FixedOffset) -> Self {
        Self { hours, offset }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        Ok(Self::new(settings.bulletin.hours.clone(), settings.offset()?))
    }

    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    /// True during minute 0 of a configured local hour.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_slot(now).is_some()
    }

    /// Local date and hour of the bulletin due at `now`, if any.
    pub fn due_slot(&self, now: DateTime<Utc>) -> Option<(NaiveDate, u32)> {
        let local = now.with_timezone(&self.offset);
        if local.minute() == 0 && self.hours.contains(&local.hour()) {
            Some((local.date_naive(), local.hour()))
        } else {
            None
        }
    }
}

/// Sends the market bulletin to every known user.
pub struct BulletinService {
    schedule: BulletinSchedule,
}

impl BulletinService {
    pub fn new(schedule: BulletinSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &BulletinSchedule {
        &self.schedule
    }

    /// Send the bulletin for `hour` to every user in `store`.
    ///
    /// Returns how many deliveries succeeded. A failed delivery is logged
    /// and skipped; only a failure to list the users is an error.
    pub async fn broadcast(
        &self,
        notifier: &dyn Notifier,
        store: &dyn TransactionStore,
        rates: &RateSnapshot,
        hour: u32,
    ) -> Result<usize, CoreError> {
        let message = replies::bulletin_message(rates, hour);
        let users = store.list_user_ids().await?;

        let mut delivered = 0;
        for user_id in &users {
            match notifier.send(user_id, &message).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(user_id = %user_id, error = %e, "bulletin delivery failed"),
            }
        }

        info!(delivered, users = users.len(), hour, "market bulletin sent");
        Ok(delivered)
    }

    /// Check the schedule once a minute and broadcast when due.
    ///
    /// Each local (date, hour) slot fires at most once, however the ticks
    /// line up with the clock.
    pub fn spawn(
        self,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn TransactionStore>,
        rates: Arc<RateService>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_slot: Option<(NaiveDate, u32)> = None;

            loop {
                ticker.tick().await;
                let Some(slot) = self.schedule.due_slot(Utc::now()) else {
                    continue;
                };
                if last_slot == Some(slot) {
                    debug!(hour = slot.1, "bulletin already sent for this hour");
                    continue;
                }
                last_slot = Some(slot);

                let snapshot = rates.current();
                if let Err(e) = self
                    .broadcast(notifier.as_ref(), store.as_ref(), &snapshot, slot.1)
                    .await
                {
                    warn!(error = %e, "market bulletin aborted");
                }
            }
        })
    }
}
