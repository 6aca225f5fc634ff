#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use snapshot_core::DeliveryError;
use snapshot_core::delivery::DeliveryGateway;
use snapshot_types::UserId;
use snapshot_types::events::MessageEvent;
use snapshot_types::models::SnapshotData;

/// Records every delivery; fails for users in `failing`.
#[derive(Clone, Default)]
pub struct RecordingGateway {
    delivered: Arc<Mutex<Vec<(UserId, SnapshotData)>>>,
    failing: Arc<Mutex<HashSet<UserId>>>,
}

impl RecordingGateway {
    pub fn fail_for(&self, user_id: UserId) {
        self.failing.lock().unwrap().insert(user_id);
    }

    pub fn deliveries(&self) -> Vec<(UserId, SnapshotData)> {
        let mut all = self.delivered.lock().unwrap().clone();
        all.sort_by_key(|(user, _)| *user);
        all
    }

    pub fn delivered_users(&self) -> Vec<UserId> {
        self.deliveries().into_iter().map(|(user, _)| user).collect()
    }
}

#[async_trait]
impl DeliveryGateway for RecordingGateway {
    async fn deliver(&self, user_id: UserId, snapshot: &SnapshotData) -> Result<(), DeliveryError> {
        if self.failing.lock().unwrap().contains(&user_id) {
            return Err(DeliveryError::Send(format!("user {user_id} has DMs closed")));
        }
        self.delivered.lock().unwrap().push((user_id, snapshot.clone()));
        Ok(())
    }
}

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, day, hour, minute, 0).unwrap()
}

pub fn message(user_id: UserId, text: &str) -> MessageEvent {
    MessageEvent {
        user_id,
        username: Some(format!("user{user_id}")),
        server_id: Some(1),
        channel_id: 10,
        text: text.to_string(),
        timestamp: Utc::now(),
    }
}
