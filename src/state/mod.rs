//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageOutcome`: How processing of one queued URL ended
//! - `OriginState`: Per-origin request timing for politeness spacing

mod domain_state;
mod page_state;

// Re-export main types
pub use domain_state::OriginState;
pub use page_state::PageOutcome;
