//! End-to-end tests against mock HTTP servers

mod crawl_tests;
mod fetch_tests;
mod image_tests;
