//! assetweave - configurable web resource pipeline
//!
//! Declaratively configured lists of named strategies (resource locators, content
//! processors, naming schemes, hashing schemes) become validated, ordered pipelines.
//! A small capability-slot injector wires them together per request, and a
//! content-addressed cache memoizes group outputs.
//!
//! # Architecture Overview
//!
//! ```text
//! EngineConfig ──> StrategyRegistry ──> LocatorChain / ProcessorPipeline
//!                                              │
//! RequestContext ──> Injector (collaborator graph, once per context)
//!                                              │
//!                   Manager::process ──> ContentCache ──> locate, pre-process,
//!                                                         merge, post-process
//! ```
//!
//! # Core Modules
//!
//! ## Strategies
//! - [`registry`] - alias → constructor providers and resolution of configuration values
//! - [`locator`] - resource locators and the first-match [`locator::LocatorChain`]
//! - [`processor`] - processing stages, the pipeline, built-in stages and the group
//!   orchestrator
//! - [`naming`] / [`hash`] - output naming and content hashing strategies
//!
//! ## Wiring
//! - [`injector`] - capability slots, the per-context collaborator graph, injecting
//!   decorators
//! - [`context`] - request-scoped context and the single-active-context guard
//! - [`manager`] - the [`manager::ManagerFactory`] and group processing entry point
//!
//! ## Data
//! - [`model`] - groups, the TOML model and request → group extraction
//! - [`cache`] - content-addressed output cache with single-flight computation
//! - [`callback`] / [`metadata`] - lifecycle observers and run metadata
//!
//! ## Supporting Modules
//! - [`config`] - layered configuration (file, environment, overrides)
//! - [`core`] - error types, user-facing error rendering, resource types
//! - [`cli`] - the `assetweave` command line
//!
//! # Configuration Keys
//!
//! | key | kind | default |
//! |---|---|---|
//! | `locator-strategies` | list | `servletContext, classpath, url` |
//! | `pre-processor-strategies` | list, `name.ext` allowed | none |
//! | `post-processor-strategies` | list, `name.ext` allowed | none |
//! | `naming-strategy` | single | `noOp` |
//! | `hash-strategy` | single | `SHA-256` |
//!
//! # Model Format
//!
//! ```toml
//! [groups.all]
//! js = ["/js/jquery.js", "classpath:js/app.js"]
//! css = ["/css/reset.css", "/css/site.css"]
//! ```

pub mod cache;
pub mod callback;
pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod core;
pub mod hash;
pub mod injector;
pub mod locator;
pub mod manager;
pub mod metadata;
pub mod model;
pub mod naming;
pub mod processor;
pub mod registry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
