pub mod aggregator;
pub mod error;
pub mod model;
pub mod service;

pub use aggregator::{aggregate, merge, paginate};
pub use error::MachineFeedServiceError;
pub use model::{FeedItem, FeedKind, FeedPage, PageRequest, PageRequestError, Paginated};
pub use service::{MachineFeedService, MachineFeedServiceApi};
