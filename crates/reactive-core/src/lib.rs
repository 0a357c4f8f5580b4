//! Reactive instances
//!
//! Wraps a plain struct in an observable container. Methods marked as
//! commands publish a snapshot of the struct to every subscriber after they
//! run; everything else about the struct is exposed as a construction-time
//! snapshot.
//!
//! ```rust
//! use reactive_core::{ClassDefinition, Construct, create_reactive_instance_of};
//! use parking_lot::Mutex;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! impl Construct for Counter {
//!     type Args = ();
//!     type Error = Infallible;
//!
//!     fn construct(_: ()) -> Result<Self, Infallible> {
//!         Ok(Counter { value: 0 })
//!     }
//! }
//!
//! let class = ClassDefinition::<Counter>::new("Counter")
//!     .command("increment", |c: &mut Counter| c.value += 1)
//!     .build();
//!
//! let counter = create_reactive_instance_of(&class, ()).unwrap();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let _unsub = counter.subscribe(move |c: &Counter| sink.lock().push(c.value));
//!
//! counter.call("increment").unwrap();
//! assert_eq!(*seen.lock(), vec![0, 1]);
//! ```

pub mod class;
pub mod config;
pub mod error;
pub mod logging;
pub mod reactive;
pub mod registry;
pub mod store;

pub use class::{
    Class, ClassDefinition, CommandSet, MethodFn, collect_command_names, command, command_fn,
    command_with,
};
pub use config::{CommandInheritance, LogFormat, LoggingConfig, ReactiveConfig};
pub use error::{ReactiveError, ReactiveResult};
pub use logging::init_logging;
pub use reactive::{Construct, ReactiveInstance, create_reactive_instance_of};
pub use registry::{ClassRegistry, class_of, default_registry, register_class};
pub use store::{Store, Subscribable, Unsubscriber};
