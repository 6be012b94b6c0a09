use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use std::sync::Arc;

use crate::{
    domain::machine_feed::{FeedPage, MachineFeedServiceApi, PageRequest},
    error::{AppError, AppResult},
};

const MISSING_MACHINE_ID: &str = "machineId path parameter is required";

/// Raw pagination query; values are validated by [`PageRequest::parse`]
#[derive(Debug, Default, PartialEq)]
pub struct FeedQuery {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl FeedQuery {
    /// Pick `page` and `size` out of the query pairs; the first occurrence of
    /// a repeated key wins and unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "size" => &mut query.size,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

pub struct MachineFeedController {
    machine_feed_service: Arc<dyn MachineFeedServiceApi>,
}

impl MachineFeedController {
    pub fn new(machine_feed_service: Arc<dyn MachineFeedServiceApi>) -> Self {
        Self {
            machine_feed_service,
        }
    }

    /// GET /machine-feeds/{machineId}?page=&size= - One page of the merged feed
    pub async fn get_feeds(
        State(controller): State<Arc<MachineFeedController>>,
        path: Result<Path<String>, PathRejection>,
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> AppResult<Json<FeedPage>> {
        let Path(machine_id) = path?;
        if machine_id.is_empty() {
            return Err(AppError::BadRequest(MISSING_MACHINE_ID.to_string()));
        }

        let Query(pairs) = query?;
        let query = FeedQuery::from_pairs(pairs);
        let request = PageRequest::parse(query.page.as_deref(), query.size.as_deref())?;

        let page = controller
            .machine_feed_service
            .get_machine_feed(&machine_id, request)
            .await?;

        tracing::info!(
            machine_id = %machine_id,
            page = page.feed.page,
            returned = page.feed.items.len(),
            total_items = page.feed.total_items,
            "Served machine feed"
        );

        Ok(Json(page))
    }

    /// GET /machine-feeds - Request without a machine id
    pub async fn missing_machine_id() -> AppError {
        AppError::BadRequest(MISSING_MACHINE_ID.to_string())
    }
}
