//! Reactive wrapper factory
//!
//! [`create_reactive_instance_of`] constructs an instance of a class and wraps
//! it in a [`ReactiveInstance`]. The reactive instance exposes:
//!
//! - the instance fields as they were at construction time ([`ReactiveInstance::fields`]),
//! - every command of the class ([`ReactiveInstance::invoke`]),
//! - the remaining methods, run against the construction-time fields
//!   ([`ReactiveInstance::query`]),
//! - a `subscribe` capability delivering a fresh snapshot after each command.
//!
//! `fields()` is a snapshot taken once and never refreshed. Only subscribers
//! see the live state.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

use crate::class::{Class, CommandSet, MethodFn};
use crate::error::{ReactiveError, ReactiveResult};
use crate::store::{Store, Subscribable, Unsubscriber};

/// Types that can be built from constructor arguments
pub trait Construct: Sized {
    /// Constructor arguments
    type Args;
    /// Constructor failure
    type Error: fmt::Display;

    fn construct(args: Self::Args) -> Result<Self, Self::Error>;
}

/// Construct an instance of `class` and make it reactive.
///
/// Fails with [`ReactiveError::Construction`] when the constructor fails and
/// with [`ReactiveError::MissingMethod`] when a command is marked on the class
/// without a method to back it.
pub fn create_reactive_instance_of<T>(
    class: &Class<T>,
    args: T::Args,
) -> ReactiveResult<ReactiveInstance<T>>
where
    T: Construct + Clone + Send + 'static,
{
    let instance = T::construct(args)
        .map_err(|e| ReactiveError::construction(class.name(), e.to_string()))?;
    ReactiveInstance::new(class, instance)
}

/// A constructed instance together with its store and wrapped commands
pub struct ReactiveInstance<T> {
    class_name: String,
    fields: T,
    instance: Mutex<T>,
    store: Store<T>,
    commands: HashMap<String, MethodFn<T>>,
    methods: HashMap<String, MethodFn<T>>,
}

impl<T> ReactiveInstance<T>
where
    T: Clone + Send + 'static,
{
    /// Wrap an already constructed instance
    pub fn new(class: &Class<T>, instance: T) -> ReactiveResult<Self> {
        let commands = class
            .command_names()
            .iter()
            .map(|name| {
                class
                    .method(name)
                    .map(|method| (name.to_string(), method.clone()))
                    .ok_or_else(|| ReactiveError::missing_method(class.name(), name))
            })
            .collect::<ReactiveResult<HashMap<_, _>>>()?;
        let methods = class
            .methods()
            .filter(|(name, _)| !commands.contains_key(*name))
            .map(|(name, method)| (name.to_string(), method.clone()))
            .collect();

        debug!(
            class = class.name(),
            commands = commands.len(),
            "Reactive instance created"
        );

        Ok(Self {
            class_name: class.name().to_string(),
            fields: instance.clone(),
            store: Store::new(instance.clone()),
            instance: Mutex::new(instance),
            commands,
            methods,
        })
    }

    /// Name of the class this instance was created from
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Fields as they were at construction time.
    ///
    /// This is not kept in sync with commands; subscribe to observe changes.
    pub fn fields(&self) -> &T {
        &self.fields
    }

    /// The most recently published snapshot
    pub fn current(&self) -> T {
        self.store.get()
    }

    /// Names of the commands exposed by this instance
    pub fn command_names(&self) -> CommandSet {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Whether `name` is a command of this instance
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Run a command, then publish a snapshot of the instance.
    ///
    /// The method's return value is discarded. A failing method publishes
    /// nothing; any mutation it made before failing stays on the instance and
    /// is visible with the next publish.
    pub fn invoke(&self, name: &str, args: Value) -> ReactiveResult<()> {
        let method = self
            .commands
            .get(name)
            .ok_or_else(|| ReactiveError::unknown_command(&self.class_name, name))?;

        // Replace under the instance lock: the store must end at the state of
        // the last command that ran, whatever the notification order.
        let publication = {
            let mut instance = self.instance.lock();
            method(&mut *instance, &args)?;
            self.store.replace(instance.clone())
        };

        trace!(class = %self.class_name, command = name, "Command executed");
        publication.notify();
        Ok(())
    }

    /// Run a non-command method on a copy of the construction-time fields.
    ///
    /// Returns the method's value. Nothing is published and neither the
    /// fields nor the live instance change.
    pub fn query(&self, name: &str, args: Value) -> ReactiveResult<Value> {
        if self.commands.contains_key(name) {
            return Err(ReactiveError::not_a_query(&self.class_name, name));
        }
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| ReactiveError::unknown_method(&self.class_name, name))?;

        let mut fields = self.fields.clone();
        method(&mut fields, &args)
    }

    /// Run a command that takes no arguments
    pub fn call(&self, name: &str) -> ReactiveResult<()> {
        self.invoke(name, Value::Null)
    }

    /// Run a command with arguments serialised to JSON
    pub fn invoke_with<A: Serialize>(&self, name: &str, args: &A) -> ReactiveResult<()> {
        let args = serde_json::to_value(args)
            .map_err(|e| ReactiveError::invalid_arguments(name, e.to_string()))?;
        self.invoke(name, args)
    }

    /// Subscribe to snapshots, starting with the current one
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }
}

impl<T> Subscribable<T> for ReactiveInstance<T>
where
    T: Clone + Send + 'static,
{
    fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        ReactiveInstance::subscribe(self, callback)
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveInstance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        commands.sort_unstable();
        f.debug_struct("ReactiveInstance")
            .field("class", &self.class_name)
            .field("fields", &self.fields)
            .field("commands", &commands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassDefinition;
    use serde_json::json;
    use std::convert::Infallible;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Account {
        owner: String,
        balance: u64,
    }

    impl Construct for Account {
        type Args = (String, u64);
        type Error = String;

        fn construct((owner, balance): Self::Args) -> Result<Self, Self::Error> {
            if owner.is_empty() {
                return Err("owner must not be empty".to_string());
            }
            Ok(Self { owner, balance })
        }
    }

    fn account_class() -> Class<Account> {
        ClassDefinition::<Account>::new("Account")
            .try_command("withdraw", |account: &mut Account, args: &Value| {
                let amount = args.as_u64().unwrap_or(0);
                account.balance = account
                    .balance
                    .checked_sub(amount)
                    .ok_or_else(|| ReactiveError::command("withdraw", "insufficient funds"))?;
                Ok(())
            })
            .command_with("deposit", |account: &mut Account, amount: u64| {
                account.balance += amount
            })
            .method("balance", |account: &mut Account, _| Ok(json!(account.balance)))
            .build()
    }

    fn record(reactive: &ReactiveInstance<Account>) -> Arc<Mutex<Vec<u64>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _unsub = reactive.subscribe(move |a: &Account| sink.lock().push(a.balance));
        seen
    }

    #[test]
    fn test_construction_failure_propagates() {
        let err = create_reactive_instance_of(&account_class(), (String::new(), 10)).unwrap_err();
        assert_eq!(
            err,
            ReactiveError::construction("Account", "owner must not be empty")
        );
    }

    #[test]
    fn test_missing_method_is_reported() {
        let class = ClassDefinition::<Account>::new("Account")
            .mark_command("close")
            .build();
        let err = create_reactive_instance_of(&class, ("ada".into(), 1)).unwrap_err();
        assert_eq!(err, ReactiveError::missing_method("Account", "close"));
    }

    #[test]
    fn test_only_commands_are_invocable() {
        let reactive = create_reactive_instance_of(&account_class(), ("ada".into(), 10)).unwrap();
        assert!(reactive.has_command("deposit"));
        assert!(!reactive.has_command("balance"));

        let err = reactive.call("balance").unwrap_err();
        assert_eq!(err.error_code(), "REACTIVE_UNKNOWN_COMMAND");
    }

    #[test]
    fn test_query_runs_on_construction_time_fields() {
        let reactive = create_reactive_instance_of(&account_class(), ("ada".into(), 10)).unwrap();
        let seen = record(&reactive);

        reactive.invoke("deposit", json!(5)).unwrap();
        let balance = reactive.query("balance", Value::Null).unwrap();

        assert_eq!(balance, json!(10));
        assert_eq!(reactive.current().balance, 15);
        assert_eq!(*seen.lock(), vec![10, 15]);
    }

    #[test]
    fn test_query_does_not_change_fields() {
        let class = ClassDefinition::<Account>::new("Account")
            .method("drain", |account: &mut Account, _| {
                account.balance = 0;
                Ok(json!(account.balance))
            })
            .build();
        let reactive = create_reactive_instance_of(&class, ("ada".into(), 3)).unwrap();
        let seen = record(&reactive);

        assert_eq!(reactive.query("drain", Value::Null).unwrap(), json!(0));
        assert_eq!(reactive.fields().balance, 3);
        assert_eq!(reactive.current().balance, 3);
        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn test_query_rejects_commands_and_unknown_names() {
        let reactive = create_reactive_instance_of(&account_class(), ("ada".into(), 1)).unwrap();

        let err = reactive.query("deposit", json!(1)).unwrap_err();
        assert_eq!(err, ReactiveError::not_a_query("Account", "deposit"));

        let err = reactive.query("close", Value::Null).unwrap_err();
        assert_eq!(err, ReactiveError::unknown_method("Account", "close"));
        assert_eq!(reactive.current().balance, 1);
    }

    #[test]
    fn test_concurrent_commands_leave_latest_snapshot() {
        let reactive = create_reactive_instance_of(&account_class(), ("ada".into(), 0)).unwrap();
        let _unsub = reactive.subscribe(|_: &Account| std::thread::yield_now());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        reactive.invoke("deposit", json!(1)).unwrap();
                    }
                });
            }
        });

        assert_eq!(reactive.current().balance, 1600);
    }

    #[test]
    fn test_failed_command_publishes_nothing() {
        let reactive = create_reactive_instance_of(&account_class(), ("ada".into(), 10)).unwrap();
        let seen = record(&reactive);

        let err = reactive.invoke("withdraw", json!(50)).unwrap_err();
        assert_eq!(err, ReactiveError::command("withdraw", "insufficient funds"));
        reactive.invoke("withdraw", json!(4)).unwrap();

        assert_eq!(*seen.lock(), vec![10, 6]);
    }

    #[test]
    fn test_invoke_with_serialises_arguments() {
        let reactive = create_reactive_instance_of(&account_class(), ("ada".into(), 1)).unwrap();
        reactive.invoke_with("deposit", &41u64).unwrap();
        assert_eq!(reactive.current().balance, 42);
        assert_eq!(reactive.fields().balance, 1);
    }

    #[test]
    fn test_invalid_arguments_publish_nothing() {
        let reactive = create_reactive_instance_of(&account_class(), ("ada".into(), 1)).unwrap();
        let seen = record(&reactive);

        let err = reactive.invoke("deposit", json!("lots")).unwrap_err();
        assert_eq!(err.error_code(), "REACTIVE_INVALID_ARGUMENTS");
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_subscriber_may_invoke_commands() {
        #[derive(Clone)]
        struct Ticker {
            ticks: u32,
        }

        impl Construct for Ticker {
            type Args = ();
            type Error = Infallible;

            fn construct(_: ()) -> Result<Self, Infallible> {
                Ok(Self { ticks: 0 })
            }
        }

        let class = ClassDefinition::<Ticker>::new("Ticker")
            .command("tick", |t: &mut Ticker| t.ticks += 1)
            .build();
        let reactive = Arc::new(create_reactive_instance_of(&class, ()).unwrap());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let weak = Arc::downgrade(&reactive);
        let _unsub = reactive.subscribe(move |t: &Ticker| {
            sink.lock().push(t.ticks);
            if t.ticks == 1 {
                if let Some(reactive) = weak.upgrade() {
                    reactive.call("tick").unwrap();
                }
            }
        });

        reactive.call("tick").unwrap();
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
    }
}
