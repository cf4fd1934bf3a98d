// ListingDesk - lib.rs
//
// Library entry point. The CLI in `main.rs` and the integration tests use
// the same public modules a host application would embed.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
