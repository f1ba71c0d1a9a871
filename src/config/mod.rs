//! Configuration module for Shelf-Scrape
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not an error: [`Config::default`] carries the storefront
//! defaults and every key in a file overrides one of them.
//!
//! # Example
//!
//! ```no_run
//! use shelf_scrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shelf-scrape.toml")).unwrap();
//! println!("Will fetch at most {} pages", config.scrape.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ListingSelectors, PaginationSelectors, ProductSelectors, ScrapeConfig, SelectorConfig,
    SheetConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
pub(crate) use validation::compile_selector;
