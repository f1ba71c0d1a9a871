//! Integration tests for Shelf-Scrape
//!
//! These tests use wiremock to stand in for the storefront and the Google
//! APIs, and drive full runs end-to-end.

mod common;
mod sink_tests;
