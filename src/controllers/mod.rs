pub mod health;
pub mod machine_feed;
