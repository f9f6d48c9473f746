//! Core types shared by every assetweave component
//!
//! # Error Management
//! assetweave separates library errors from their presentation:
//! - **Strongly-typed errors** ([`AssetError`]) returned by every pipeline operation
//! - **User-friendly contexts** ([`ErrorContext`]) with suggestions, built at the CLI boundary
//!
//! # Resource Abstractions
//! - [`ResourceType`] distinguishes JavaScript from stylesheet content
//! - [`Resource`] pairs a uri with its declared type

pub mod error;
pub mod resource;

pub use error::{AssetError, ErrorContext, Result, user_friendly_error};
pub use resource::{Resource, ResourceType};
