//! Lazy association proxies.
//!
//! An [`AssociationProxy`] stands in for an association's value. It starts
//! unresolved; [`load`](AssociationProxy::load) fetches at most once and
//! caches the result until [`reload`](AssociationProxy::reload) is called.
//! Chaining with [`where_`](AssociationProxy::where_) returns a new,
//! unresolved proxy with merged parameters.
//!
//! Resolved values are also stored on the parent resource, keyed by
//! association name and parameters. A later proxy for the same association
//! and parameters picks the value up without a request. Any mutation of the
//! parent clears its stored values.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut comments = user.association("comments")?;
//! let first = comments.load(&client).await?.clone();
//! let again = comments.load(&client).await?; // cached, no request
//!
//! let mut approved = comments.where_(params_from(&Approved { approved: true })?);
//! approved.load(&client).await?; // GET users/1/comments?approved=true
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use crate::rest::association::Association;
use crate::rest::errors::ResourceError;
use crate::rest::resource::Resource;
use crate::rest::transport::{Params, Transport};
use crate::rest::value::AttrValue;

/// A chainable, caching stand-in for an association's value.
#[derive(Debug, Clone)]
pub struct AssociationProxy<'a> {
    association: Association<'a>,
    resolved: Option<AttrValue>,
}

impl<'a> AssociationProxy<'a> {
    /// Wraps an association in an unresolved proxy.
    #[must_use]
    pub const fn new(association: Association<'a>) -> Self {
        Self {
            association,
            resolved: None,
        }
    }

    #[must_use]
    pub const fn association(&self) -> &Association<'a> {
        &self.association
    }

    #[must_use]
    pub const fn params(&self) -> &Params {
        self.association.params()
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Returns the best value available without a request.
    ///
    /// This is the cached result if resolved (here or on the parent),
    /// otherwise the parent's non-blank value, otherwise the declared
    /// default.
    #[must_use]
    pub fn current(&self) -> AttrValue {
        if let Some(value) = &self.resolved {
            return value.clone();
        }
        if let Some(value) = self.stored() {
            return value;
        }
        self.association
            .existing()
            .filter(|value| !value.is_blank())
            .cloned()
            .unwrap_or_else(|| self.association.declaration().default_value())
    }

    /// Resolves the association, fetching at most once per parent and
    /// parameter set.
    ///
    /// # Errors
    ///
    /// Returns errors from [`Association::fetch`]. A failed fetch leaves the
    /// proxy unresolved.
    pub async fn load<T: Transport>(&mut self, transport: &T) -> Result<&AttrValue, ResourceError> {
        let value = match self.resolved.take().or_else(|| self.stored()) {
            Some(value) => value,
            None => {
                let value = self.association.fetch(transport).await?;
                self.association
                    .parent()
                    .association_cache()
                    .insert(self.key(), value.clone());
                value
            }
        };
        Ok(self.resolved.insert(value))
    }

    /// Drops the cached value, here and on the parent, and fetches again.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn reload<T: Transport>(&mut self, transport: &T) -> Result<&AttrValue, ResourceError> {
        self.resolved = None;
        self.association.parent().association_cache().remove(&self.key());
        self.load(transport).await
    }

    fn key(&self) -> CacheKey {
        CacheKey::new(
            self.association.declaration().name(),
            self.association.params(),
        )
    }

    fn stored(&self) -> Option<AttrValue> {
        self.association.parent().association_cache().get(&self.key())
    }

    /// Consumes the proxy and returns the cached value, if resolved.
    #[must_use]
    pub fn into_resolved(self) -> Option<AttrValue> {
        self.resolved
    }

    /// Returns a proxy with `extra` merged into the parameters.
    ///
    /// A chain that changes nothing keeps the cached value.
    #[doc(alias = "where")]
    #[must_use]
    pub fn where_(&self, extra: Params) -> Self {
        let chained = self.association.where_(extra);
        if chained.params() == self.association.params() {
            return Self {
                association: chained,
                resolved: self.resolved.clone(),
            };
        }
        Self::new(chained)
    }

    /// Alias for [`where_`](Self::where_).
    #[must_use]
    pub fn all(&self, extra: Params) -> Self {
        self.where_(extra)
    }

    /// Fetches one member by identifier.
    ///
    /// # Errors
    ///
    /// See [`Association::find`].
    pub async fn find<T: Transport>(
        &self,
        transport: &T,
        id: impl Into<Value>,
    ) -> Result<Option<Resource>, ResourceError> {
        self.association.find(transport, id).await
    }

    /// Builds a new target resource linked to the parent.
    ///
    /// # Errors
    ///
    /// See [`Association::build`].
    pub async fn build<T: Transport>(
        &self,
        transport: &T,
        attrs: Map<String, Value>,
    ) -> Result<Resource, ResourceError> {
        self.association.build(transport, attrs).await
    }
}

/// Association name plus the parameters' canonical JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    name: String,
    params: String,
}

impl CacheKey {
    fn new(name: &str, params: &Params) -> Self {
        Self {
            name: name.to_string(),
            params: Value::Object(params.clone()).to_string(),
        }
    }
}

/// Resolved association values held by a parent resource.
///
/// Cloning copies the stored values; the copies are independent.
#[derive(Debug, Default)]
pub(crate) struct AssociationCache {
    entries: Mutex<HashMap<CacheKey, AttrValue>>,
}

impl AssociationCache {
    fn get(&self, key: &CacheKey) -> Option<AttrValue> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn insert(&self, key: CacheKey, value: AttrValue) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    fn remove(&self, key: &CacheKey) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub(crate) fn clear(&mut self) {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Clone for AssociationCache {
    fn clone(&self) -> Self {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self {
            entries: Mutex::new(entries),
        }
    }
}
