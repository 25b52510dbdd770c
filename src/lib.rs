pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod logging;
pub mod pipeline;
pub mod portal;
