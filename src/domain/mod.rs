pub mod machine_feed;
