//! The traffic-splitting decision engine.
//!
//! # Responsibilities
//! - Map a request index and a redirect ratio to a CDN-or-origin decision
//! - Rewrite video URLs onto the configured CDN host
//!
//! # Design Decisions
//! - The decision function is pure and total: no I/O, no state, no errors.
//!   All inputs are validated before they reach it
//! - Decisions are evenly interleaved across the repeating block rather than
//!   front-loaded, so short request bursts still see the configured mix

pub mod rewrite;
pub mod splitter;

pub use rewrite::rewrite_to_cdn;
pub use splitter::should_redirect_to_cdn;
