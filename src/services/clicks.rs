//! Click recording
//!
//! One successful resolution produces exactly one Visit row and exactly one
//! counter increment. The increment is a relative update at the store layer,
//! so overlapping visits to the same link each land.

use std::sync::Arc;

use chrono::Utc;

use crate::errors::Result;
use crate::storage::{DeviceClass, SeaOrmStore};

#[derive(Clone)]
pub struct ClickRecorder {
    store: Arc<SeaOrmStore>,
}

impl ClickRecorder {
    pub fn new(store: Arc<SeaOrmStore>) -> Self {
        Self { store }
    }

    /// Append a Visit and bump the link's click counter.
    ///
    /// The two writes run sequentially; a failure between them leaves a
    /// transient drift between the counter and the visit stream, which the
    /// analytics summary tolerates.
    pub async fn record(
        &self,
        link_id: &str,
        address: Option<String>,
        device: DeviceClass,
    ) -> Result<()> {
        self.store
            .insert_visit(link_id, address, device, Utc::now())
            .await?;
        self.store.increment_clicks(link_id).await?;
        Ok(())
    }
}
