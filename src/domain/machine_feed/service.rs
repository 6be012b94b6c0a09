use super::aggregator::aggregate;
use super::error::MachineFeedServiceError;
use super::model::{FeedPage, PageRequest};
use crate::infrastructure::clients::MachineServiceClient;
use async_trait::async_trait;
use std::sync::Arc;

pub struct MachineFeedService {
    client: Arc<dyn MachineServiceClient>,
}

impl MachineFeedService {
    pub fn new(client: Arc<dyn MachineServiceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
pub trait MachineFeedServiceApi: Send + Sync {
    /// Build one page of a machine's merged repair/session feed.
    ///
    /// Lookups run in order (name, repairs, sessions) and stop at the first
    /// failure; a partial feed is never returned.
    async fn get_machine_feed(
        &self,
        machine_id: &str,
        request: PageRequest,
    ) -> Result<FeedPage, MachineFeedServiceError>;
}

#[async_trait]
impl MachineFeedServiceApi for MachineFeedService {
    async fn get_machine_feed(
        &self,
        machine_id: &str,
        request: PageRequest,
    ) -> Result<FeedPage, MachineFeedServiceError> {
        let machine_name = self
            .client
            .fetch_machine_name(machine_id)
            .await
            .map_err(MachineFeedServiceError::MachineName)?;

        let repairs = self
            .client
            .fetch_repairs(machine_id)
            .await
            .map_err(MachineFeedServiceError::Repairs)?;

        let sessions = self
            .client
            .fetch_sessions(machine_id)
            .await
            .map_err(MachineFeedServiceError::Sessions)?;

        tracing::debug!(
            machine_id,
            repairs = repairs.len(),
            sessions = sessions.len(),
            page = request.page(),
            size = request.size(),
            "Aggregating machine feed"
        );

        let feed = aggregate(repairs, sessions, request);
        Ok(FeedPage::new(machine_id.to_string(), machine_name, feed))
    }
}
