//! Request-scoped context
//!
//! A [`RequestContext`] carries everything one processing operation may consult: the
//! request (uri and query options), a response handle collecting headers and the
//! published output name, and the effective [`EngineConfig`].
//!
//! Contexts are explicit values. A [`ContextHolder`] admits one active context per
//! logical operation: the current tokio task, or the current thread outside a runtime.
//! Independent operations establish their own contexts concurrently; establishing a
//! second context inside the same operation before releasing the first is an error.
//! [`ContextHolder::establish`] returns a [`ContextScope`] guard that releases the
//! operation's slot when dropped, on success and on error alike. The collaborator graph
//! built for the context is cached on the scope and dropped with it.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use assetweave::config::EngineConfig;
//! use assetweave::context::{ContextHolder, RequestContext};
//!
//! let holder = Arc::new(ContextHolder::default());
//! let config = Arc::new(EngineConfig::default());
//!
//! let scope = holder.establish(RequestContext::new("all.js", Arc::clone(&config))).unwrap();
//! assert!(holder.establish(RequestContext::new("all.css", Arc::clone(&config))).is_err());
//!
//! drop(scope);
//! assert!(holder.establish(RequestContext::new("all.css", config)).is_ok());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::core::resource::strip_query;
use crate::core::{AssetError, Result};
use crate::injector::Injector;

/// The incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub uri: String,
    /// Query options, e.g. `minimize=false`
    pub options: BTreeMap<String, String>,
}

impl RequestInfo {
    /// Parse `uri`, collecting its query string into [`RequestInfo::options`].
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let options = uri
            .split_once('?')
            .map(|(_, query)| {
                query
                    .split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((key, value)) => (key.to_string(), value.to_string()),
                        None => (pair.to_string(), String::new()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { uri, options }
    }

    /// The uri without its query string.
    #[must_use]
    pub fn path(&self) -> &str {
        strip_query(&self.uri)
    }

    #[must_use]
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }
}

/// Collects response headers and the published output name.
#[derive(Debug, Default)]
pub struct ResponseHandle {
    headers: Mutex<BTreeMap<String, String>>,
    output_name: Mutex<Option<String>>,
}

impl ResponseHandle {
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.lock().unwrap().insert(name.into(), value.into());
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.lock().unwrap().get(name).cloned()
    }

    #[must_use]
    pub fn headers(&self) -> BTreeMap<String, String> {
        self.headers.lock().unwrap().clone()
    }

    pub fn set_output_name(&self, name: impl Into<String>) {
        *self.output_name.lock().unwrap() = Some(name.into());
    }

    #[must_use]
    pub fn output_name(&self) -> Option<String> {
        self.output_name.lock().unwrap().clone()
    }
}

/// Everything one processing operation may consult.
pub struct RequestContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    config: Arc<EngineConfig>,
    request: RequestInfo,
    response: ResponseHandle,
}

impl RequestContext {
    /// A context for `request_uri` under `config`.
    pub fn new(request_uri: impl Into<String>, config: Arc<EngineConfig>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            request: RequestInfo::new(request_uri),
            response: ResponseHandle::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The effective configuration snapshot.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    #[must_use]
    pub fn response(&self) -> &ResponseHandle {
        &self.response
    }

    /// Whether minimizers run: the configuration, unless the request says
    /// `minimize=false`.
    #[must_use]
    pub fn minimize(&self) -> bool {
        match self.request.option("minimize") {
            Some(value) => value != "false",
            None => self.config.context.minimize,
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("request", &self.request.uri)
            .finish_non_exhaustive()
    }
}

/// The logical operation a context belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Task(tokio::task::Id),
    Thread(ThreadId),
}

impl Operation {
    /// The calling tokio task, or the calling thread when not inside a task.
    #[must_use]
    pub fn current() -> Self {
        tokio::task::try_id().map_or_else(|| Self::Thread(std::thread::current().id()), Self::Task)
    }
}

/// Admits one active [`RequestContext`] per logical [`Operation`].
#[derive(Debug, Default)]
pub struct ContextHolder {
    active: DashMap<Operation, Uuid>,
}

impl ContextHolder {
    /// Make `context` the active context of the calling operation until the returned
    /// scope is dropped.
    ///
    /// # Errors
    ///
    /// [`AssetError::Precondition`] when the calling operation already has an active
    /// context.
    pub fn establish(self: &Arc<Self>, context: RequestContext) -> Result<ContextScope> {
        let operation = Operation::current();
        match self.active.entry(operation) {
            Entry::Occupied(current) => {
                return Err(AssetError::precondition(format!(
                    "request context {} is still active in this operation; release it before establishing another",
                    current.get()
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(context.id);
            }
        }
        debug!("Established request context {} for '{}'", context.id, context.request.uri);

        Ok(ContextScope {
            holder: Arc::clone(self),
            operation,
            context: Arc::new(context),
            injector: Mutex::new(None),
        })
    }

    /// Id of the calling operation's active context, if any.
    #[must_use]
    pub fn current(&self) -> Option<Uuid> {
        self.active.get(&Operation::current()).map(|id| *id)
    }

    /// Whether the calling operation has an active context.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    /// Number of operations with an active context.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// Guard for an established context; releases it on drop.
pub struct ContextScope {
    holder: Arc<ContextHolder>,
    operation: Operation,
    context: Arc<RequestContext>,
    injector: Mutex<Option<Arc<Injector>>>,
}

impl ContextScope {
    #[must_use]
    pub fn context(&self) -> &Arc<RequestContext> {
        &self.context
    }

    /// The injector for this context, built by `build` on first use.
    ///
    /// # Errors
    ///
    /// Whatever `build` returns; a failed build is not cached.
    pub fn injector_or_try_init(
        &self,
        build: impl FnOnce(&Arc<RequestContext>) -> Result<Arc<Injector>>,
    ) -> Result<Arc<Injector>> {
        let mut slot = self.injector.lock().unwrap();
        if let Some(injector) = slot.as_ref() {
            return Ok(Arc::clone(injector));
        }
        let injector = build(&self.context)?;
        *slot = Some(Arc::clone(&injector));
        Ok(injector)
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        let id = self.context.id;
        self.holder.active.remove_if(&self.operation, |_, active| *active == id);
        debug!("Released request context {}", self.context.id);
    }
}

impl fmt::Debug for ContextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextScope")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
