//! Error handling for assetweave
//!
//! This module provides the error taxonomy shared by every pipeline component and the
//! user-facing rendering used by the CLI. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers (and tests) can match on the failure category
//! 2. **User-friendly messages** with actionable suggestions when errors reach the terminal
//!
//! # Error Categories
//!
//! - **Configuration**: [`AssetError::UnknownAlias`], [`AssetError::Configuration`],
//!   [`AssetError::InvalidRequest`] - raised while building pipelines, never retried
//! - **Not found**: [`AssetError::NotFound`], [`AssetError::GroupNotFound`] - no locator
//!   recognizes a uri, or the model has no such group
//! - **I/O**: [`AssetError::Io`] - a locator that claimed a uri failed to read it
//! - **Processing**: [`AssetError::Processing`] - a transform stage failed
//! - **Precondition**: [`AssetError::Precondition`] - programming misuse such as a missing
//!   manager factory or a second active request context
//!
//! `Io` and `NotFound` are deliberately distinct: a locator that recognizes a uri is
//! authoritative for it, so its read failure is never reported as "not found".
//!
//! # Examples
//!
//! ```rust,no_run
//! use assetweave::core::{AssetError, user_friendly_error};
//!
//! let error = AssetError::UnknownAlias {
//!     key: "pre-processor-strategies".to_string(),
//!     alias: "jsMinn".to_string(),
//!     invalid: vec!["jsMinn".to_string()],
//!     available: vec!["jsMin".to_string(), "cssMin".to_string()],
//! };
//! assert!(error.is_configuration());
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // suggests 'jsMin'
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Crate-wide result type for pipeline operations.
pub type Result<T, E = AssetError> = std::result::Result<T, E>;

/// The main error type for assetweave operations.
///
/// Every variant belongs to exactly one category (see the module documentation). Use the
/// `is_*` helpers when only the category matters.
#[derive(Error, Debug)]
pub enum AssetError {
    /// One or more configured aliases are not registered with any provider.
    ///
    /// The whole pipeline construction is aborted; no partially resolved pipeline is
    /// ever returned.
    #[error("Unknown alias '{alias}' in '{key}' (invalid: {})", invalid.join(", "))]
    UnknownAlias {
        /// Configuration key being resolved (e.g. `locator-strategies`)
        key: String,
        /// First offending alias
        alias: String,
        /// Every offending alias in configuration order
        invalid: Vec<String>,
        /// Aliases registered for this key, in registration order
        available: Vec<String>,
    },

    /// Malformed or missing configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },

    /// A processing request that cannot be mapped to a group.
    #[error("Invalid request '{uri}': {reason}")]
    InvalidRequest {
        /// The request uri as received
        uri: String,
        /// Why the request was rejected
        reason: String,
    },

    /// No configured locator recognizes the uri.
    #[error("No locator recognizes uri '{uri}'")]
    NotFound {
        /// The uri that nobody claimed
        uri: String,
    },

    /// The model does not define the requested group.
    #[error("Group '{name}' is not defined in the model")]
    GroupNotFound {
        /// Requested group name
        name: String,
    },

    /// A locator recognized the uri but could not produce its bytes.
    #[error("Failed to read '{uri}'")]
    Io {
        /// The uri being read
        uri: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A transform stage failed.
    #[error("Processor '{stage}' failed on '{resource}'")]
    Processing {
        /// Alias of the failing stage
        stage: String,
        /// Uri of the resource being processed
        resource: String,
        /// Original cause reported by the stage
        #[source]
        source: anyhow::Error,
    },

    /// Programming misuse; not recoverable.
    #[error("Precondition violated: {message}")]
    Precondition {
        /// Description of the violated precondition
        message: String,
    },
}

impl AssetError {
    /// Build a [`AssetError::Configuration`] from any message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Build a [`AssetError::Precondition`] from any message.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Build a [`AssetError::Io`] for `uri`.
    pub fn io(uri: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            uri: uri.into(),
            source,
        }
    }

    /// True for unknown aliases, malformed configuration and invalid requests.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownAlias { .. } | Self::Configuration { .. } | Self::InvalidRequest { .. }
        )
    }

    /// True when nothing recognized the uri or the group is missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::GroupNotFound { .. })
    }

    /// True when a recognizing locator failed to read.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// True when a transform stage failed.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self, Self::Processing { .. })
    }

    /// True for programming misuse.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}

/// Error wrapper carrying a user-facing suggestion and details.
///
/// Produced by [`user_friendly_error`] at the CLI boundary; library code returns
/// [`AssetError`] directly.
#[derive(Debug)]
pub struct ErrorContext {
    /// Headline message
    pub message: String,
    /// Optional suggestion on how to fix the problem
    pub suggestion: Option<String>,
    /// Optional longer explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with only a headline message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// [`AssetError`] values get category-specific suggestions; everything else is rendered
/// with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<AssetError>() {
        Ok(asset_error) => return create_error_context(asset_error),
        Err(other) => other,
    };

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(format!("Invalid TOML: {toml_error}"))
            .with_suggestion("Check quotes, brackets and key names in the configuration or model file");
    }

    ErrorContext::new(with_cause_chain(error.to_string(), error.chain().skip(1)))
}

fn create_error_context(error: AssetError) -> ErrorContext {
    let message = with_cause_chain(error.to_string(), error_sources(&error));

    match &error {
        AssetError::UnknownAlias {
            key,
            invalid,
            available,
            ..
        } => {
            let ctx = ErrorContext::new(message)
                .with_details(format!("Aliases registered for '{key}': {}", available.join(", ")));
            match invalid.first().and_then(|alias| closest_alias(alias, available)) {
                Some(candidate) => ctx.with_suggestion(format!("Did you mean '{candidate}'?")),
                None => ctx.with_suggestion("Run 'assetweave aliases' to list the available strategies"),
            }
        }
        AssetError::Configuration { .. } => ErrorContext::new(message)
            .with_suggestion("Check the [context] table and strategy keys in assetweave.toml"),
        AssetError::InvalidRequest { .. } => ErrorContext::new(message)
            .with_suggestion("Requests look like '<group>.js' or '<group>.css'"),
        AssetError::NotFound { .. } => ErrorContext::new(message)
            .with_suggestion("Prefix the uri with '/', 'classpath:' or a URL scheme, or enable a locator that handles it")
            .with_details("Every configured locator declined this uri"),
        AssetError::GroupNotFound { .. } => ErrorContext::new(message)
            .with_suggestion("Check the group names under [groups] in the model file"),
        AssetError::Io { .. } => ErrorContext::new(message)
            .with_suggestion("Verify the file exists below the context folder or classpath roots")
            .with_details("The locator responsible for this uri could not read it"),
        AssetError::Processing { .. } => ErrorContext::new(message)
            .with_details("The remaining stages for this resource were not run"),
        AssetError::Precondition { .. } => ErrorContext::new(message)
            .with_details("This indicates a programming error in how the engine is driven"),
    }
}

fn error_sources(error: &AssetError) -> impl Iterator<Item = &(dyn std::error::Error + 'static)> {
    std::iter::successors(std::error::Error::source(error), |e| e.source())
}

fn with_cause_chain<I, E>(mut message: String, causes: I) -> String
where
    I: Iterator<Item = E>,
    E: fmt::Display,
{
    let chain: Vec<String> = causes.map(|cause| cause.to_string()).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

/// Closest registered alias by Jaro-Winkler similarity, if any is reasonably close.
fn closest_alias<'a>(alias: &str, available: &'a [String]) -> Option<&'a str> {
    available
        .iter()
        .map(|candidate| (strsim::jaro_winkler(alias, candidate), candidate))
        .filter(|(score, _)| *score > 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.as_str())
}
