pub mod error;
pub mod machine_service_client;

pub use error::{FetchError, Upstream};
pub use machine_service_client::{HttpMachineServiceClient, RetryPolicy};

use crate::domain::machine_feed::FeedItem;
use async_trait::async_trait;

/// Access to the three upstream services that describe a machine.
///
/// Each call is independent and identified only by the machine id. Retries,
/// if any, happen inside the implementation; callers see one result per call.
#[async_trait]
pub trait MachineServiceClient: Send + Sync {
    /// Fetch repair records for a machine
    async fn fetch_repairs(&self, machine_id: &str) -> Result<Vec<FeedItem>, FetchError>;

    /// Fetch session records for a machine
    async fn fetch_sessions(&self, machine_id: &str) -> Result<Vec<FeedItem>, FetchError>;

    /// Resolve the display name of a machine
    async fn fetch_machine_name(&self, machine_id: &str) -> Result<String, FetchError>;
}
