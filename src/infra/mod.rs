//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod http;
pub mod oembed;
pub mod telemetry;
pub mod tumblr;
pub mod upstream;
