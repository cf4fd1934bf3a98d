// ListingDesk - app/mod.rs
//
// Application layer: the listing store and persisted view settings.
// Dependencies: core layer.
// Must NOT depend on: platform specifics.

pub mod settings;
pub mod store;
