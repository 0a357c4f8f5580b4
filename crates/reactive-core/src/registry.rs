//! Class registry
//!
//! Classes can be registered once, keyed by their Rust type, and looked up
//! later by type. [`default_registry`] is a process-wide registry for code that
//! prefers a static registration call over passing classes around.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::class::Class;
use crate::error::{ReactiveError, ReactiveResult};
use crate::reactive::{Construct, ReactiveInstance, create_reactive_instance_of};

type AnyClass = Arc<dyn Any + Send + Sync>;

/// Registry of built classes keyed by type
#[derive(Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<TypeId, AnyClass>>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class` for `T`, replacing any previous registration
    pub fn register<T: 'static>(&self, class: Class<T>) -> Arc<Class<T>> {
        let class = Arc::new(class);
        let previous = self
            .classes
            .write()
            .insert(TypeId::of::<T>(), Arc::clone(&class) as AnyClass);

        if previous.is_some() {
            warn!(class = class.name(), "Class registered twice, replacing");
        } else {
            debug!(class = class.name(), "Class registered");
        }
        class
    }

    /// Get the class registered for `T`
    pub fn get<T: 'static>(&self) -> Option<Arc<Class<T>>> {
        let class = self.classes.read().get(&TypeId::of::<T>()).cloned()?;
        class.downcast::<Class<T>>().ok()
    }

    /// Whether a class is registered for `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.classes.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }

    /// Construct a reactive instance of the class registered for `T`
    pub fn create<T>(&self, args: T::Args) -> ReactiveResult<ReactiveInstance<T>>
    where
        T: Construct + Clone + Send + 'static,
    {
        let class = self
            .get::<T>()
            .ok_or_else(|| ReactiveError::unregistered_class(type_name::<T>()))?;
        create_reactive_instance_of(&class, args)
    }
}

static DEFAULT_REGISTRY: Lazy<ClassRegistry> = Lazy::new(ClassRegistry::new);

/// The process-wide registry
pub fn default_registry() -> &'static ClassRegistry {
    &DEFAULT_REGISTRY
}

/// Register `class` in the process-wide registry
pub fn register_class<T: 'static>(class: Class<T>) -> Arc<Class<T>> {
    DEFAULT_REGISTRY.register(class)
}

/// Look up a class in the process-wide registry
pub fn class_of<T: 'static>() -> Option<Arc<Class<T>>> {
    DEFAULT_REGISTRY.get::<T>()
}
