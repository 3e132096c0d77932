//! Type-safe registry of in-process clients.
//!
//! Providers register an implementation once under its interface type;
//! consumers fetch by trait object: `hub.get::<dyn matching::MatchingApi>()`.
//! Key = `type_name::<T>()` (works for `T = dyn Trait`), value = `Arc<T>`
//! boxed as `dyn Any` and downcast on read. Re-registering overwrites.

use parking_lot::RwLock;
use std::{any::Any, collections::HashMap, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ClientHubError {
    #[error("client not found: type={type_key}")]
    NotFound { type_key: &'static str },

    #[error("type mismatch in hub for type={type_key}")]
    TypeMismatch { type_key: &'static str },
}

type Boxed = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ClientHub {
    map: RwLock<HashMap<&'static str, Boxed>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under the interface type `T`.
    pub fn register<T>(&self, client: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map
            .write()
            .insert(std::any::type_name::<T>(), Box::new(client));
    }

    /// Fetch a client by interface type `T`.
    pub fn get<T>(&self) -> Result<Arc<T>, ClientHubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let type_key = std::any::type_name::<T>();
        let r = self.map.read();
        let boxed = r
            .get(type_key)
            .ok_or(ClientHubError::NotFound { type_key })?;
        boxed
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ClientHubError::TypeMismatch { type_key })
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}
