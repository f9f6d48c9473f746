//! Integration test suite for assetweave
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **registry**: alias resolution, defaults, unknown aliases
//! - **pipeline**: stage ordering, extension filters, stage failures
//! - **injector**: slot filling, decorators, builder preconditions
//! - **cache**: single-flight computation under concurrency
//! - **manager**: end-to-end group processing over a webapp layout
//! - **config**: layered configuration and environment overrides
//! - **cli**: the `assetweave` binary

#[path = "../common/mod.rs"]
mod common;

mod cache;
mod cli;
mod config;
mod injector;
mod manager;
mod pipeline;
mod registry;
