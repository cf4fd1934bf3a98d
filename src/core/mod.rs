// ListingDesk - core/mod.rs
//
// Core business logic layer.
// Dependencies: data crates only (serde, regex, csv, chrono).
// Must NOT depend on: app, platform.

pub mod analytics;
pub mod bulk;
pub mod export;
pub mod filter;
pub mod focus;
pub mod group;
pub mod import;
pub mod model;
pub mod paginate;
pub mod search;
pub mod sort;
pub mod validate;
