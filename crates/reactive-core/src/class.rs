//! Class definitions and the command marker
//!
//! A [`ClassDefinition`] plays the role of a class prototype: it holds the
//! method table of a type and the set of method names marked as commands.
//! Building the definition into a [`Class`] resolves the inheritance chain
//! once and caches the effective command set.
//!
//! ```rust
//! use reactive_core::ClassDefinition;
//!
//! #[derive(Clone, Default)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! let class = ClassDefinition::<Counter>::new("Counter")
//!     .command("increment", |c: &mut Counter| c.value += 1)
//!     .build();
//!
//! assert!(class.is_command("increment"));
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::{CommandInheritance, ReactiveConfig};
use crate::error::{ReactiveError, ReactiveResult};

/// A method on a class: mutates the instance and returns an arbitrary value
pub type MethodFn<T> = Arc<dyn Fn(&mut T, &Value) -> ReactiveResult<Value> + Send + Sync>;

/// Set of method names marked as commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    names: BTreeSet<String>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Returns false if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Whether `name` is in the set
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in lexical order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Union of two sets
    pub fn union(&self, other: &CommandSet) -> CommandSet {
        CommandSet {
            names: self.names.union(&other.names).cloned().collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for CommandSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Mark `name` as a command on `target` and hand `descriptor` back untouched.
///
/// Marking the same name twice is a no-op.
pub fn command<D>(target: &mut CommandSet, name: impl Into<String>, descriptor: D) -> D {
    target.insert(name);
    descriptor
}

/// Effective command names of a class.
///
/// `own` are the marks made on the class itself, `ancestors` the own marks of
/// each ancestor, nearest first. Ancestors are ignored under
/// [`CommandInheritance::OwnOnly`].
pub fn collect_command_names(
    own: &CommandSet,
    ancestors: &[CommandSet],
    policy: CommandInheritance,
) -> CommandSet {
    match policy {
        CommandInheritance::OwnOnly => own.clone(),
        CommandInheritance::Inherited => match ancestors.split_first() {
            None => own.clone(),
            Some((parent, rest)) => own.union(&collect_command_names(parent, rest, policy)),
        },
    }
}

/// Wrap a method that takes no arguments
pub fn command_fn<T, F>(f: F) -> MethodFn<T>
where
    T: 'static,
    F: Fn(&mut T) + Send + Sync + 'static,
{
    Arc::new(move |instance: &mut T, _args: &Value| -> ReactiveResult<Value> {
        f(instance);
        Ok(Value::Null)
    })
}

/// Wrap a method whose arguments are decoded from JSON
pub fn command_with<T, A, F>(name: impl Into<String>, f: F) -> MethodFn<T>
where
    T: 'static,
    A: DeserializeOwned + 'static,
    F: Fn(&mut T, A) + Send + Sync + 'static,
{
    let name = name.into();
    Arc::new(move |instance: &mut T, args: &Value| -> ReactiveResult<Value> {
        let args: A = serde_json::from_value(args.clone())
            .map_err(|e| ReactiveError::invalid_arguments(&name, e.to_string()))?;
        f(instance, args);
        Ok(Value::Null)
    })
}

/// Lift a parent method onto a child type through an accessor
fn lift<P, T>(method: MethodFn<P>, accessor: fn(&mut T) -> &mut P) -> MethodFn<T>
where
    P: 'static,
    T: 'static,
{
    Arc::new(move |instance: &mut T, args: &Value| method(accessor(instance), args))
}

struct ParentLink<T> {
    name: String,
    methods: HashMap<String, MethodFn<T>>,
    /// Own command marks of the parent followed by those of its ancestors
    lineage: Vec<CommandSet>,
}

/// Builder for a [`Class`]
pub struct ClassDefinition<T> {
    name: String,
    methods: HashMap<String, MethodFn<T>>,
    commands: CommandSet,
    parent: Option<ParentLink<T>>,
}

impl<T: 'static> ClassDefinition<T> {
    /// Start a definition for a class called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
            commands: CommandSet::new(),
            parent: None,
        }
    }

    /// Declare `parent` as the parent class.
    ///
    /// The parent's methods are reached through `accessor` and can be
    /// overridden by methods defined on this class.
    pub fn extends<P: 'static>(
        mut self,
        parent: &Class<P>,
        accessor: fn(&mut T) -> &mut P,
    ) -> Self {
        let methods = parent
            .methods
            .iter()
            .map(|(name, method)| (name.clone(), lift(Arc::clone(method), accessor)))
            .collect();

        let mut lineage = Vec::with_capacity(parent.ancestors.len() + 1);
        lineage.push(parent.own_commands.clone());
        lineage.extend(parent.ancestors.iter().cloned());

        self.parent = Some(ParentLink {
            name: parent.name.clone(),
            methods,
            lineage,
        });
        self
    }

    /// Define a method without marking it
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T, &Value) -> ReactiveResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(f));
        self
    }

    /// Mark an existing (or inherited, or later defined) method as a command
    pub fn mark_command(mut self, name: impl Into<String>) -> Self {
        command(&mut self.commands, name, ());
        self
    }

    /// Define a no-argument method and mark it as a command
    pub fn command<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.command_method(name, command_fn(f))
    }

    /// Define a method taking decoded arguments and mark it as a command
    pub fn command_with<A, F>(self, name: impl Into<String>, f: F) -> Self
    where
        A: DeserializeOwned + 'static,
        F: Fn(&mut T, A) + Send + Sync + 'static,
    {
        let name = name.into();
        let method = command_with(name.clone(), f);
        self.command_method(name, method)
    }

    /// Define a fallible method and mark it as a command
    pub fn try_command<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T, &Value) -> ReactiveResult<()> + Send + Sync + 'static,
    {
        let method: MethodFn<T> =
            Arc::new(move |instance: &mut T, args: &Value| -> ReactiveResult<Value> {
                f(instance, args)?;
                Ok(Value::Null)
            });
        self.command_method(name, method)
    }

    fn command_method(mut self, name: impl Into<String>, method: MethodFn<T>) -> Self {
        let name = name.into();
        let method = command(&mut self.commands, name.clone(), method);
        self.methods.insert(name, method);
        self
    }

    /// Build with the default (inheritance-aware) policy
    pub fn build(self) -> Class<T> {
        self.build_with(&ReactiveConfig::default())
    }

    /// Build, applying the command inheritance policy from `config`
    pub fn build_with(self, config: &ReactiveConfig) -> Class<T> {
        let policy = config.command_inheritance;
        let (parent_name, mut methods, ancestors) = match self.parent {
            Some(link) => (Some(link.name), link.methods, link.lineage),
            None => (None, HashMap::new(), Vec::new()),
        };
        methods.extend(self.methods);

        let command_names = collect_command_names(&self.commands, &ancestors, policy);
        debug!(
            class = %self.name,
            parent = ?parent_name,
            commands = command_names.len(),
            ?policy,
            "Class built"
        );

        Class {
            name: self.name,
            parent_name,
            methods,
            own_commands: self.commands,
            ancestors,
            command_names,
        }
    }
}

/// A built class: method table plus cached effective command names
pub struct Class<T> {
    name: String,
    parent_name: Option<String>,
    methods: HashMap<String, MethodFn<T>>,
    own_commands: CommandSet,
    ancestors: Vec<CommandSet>,
    command_names: CommandSet,
}

impl<T> Class<T> {
    /// Name the class was defined with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the declared parent class, if any
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Effective command names, computed when the class was built
    pub fn command_names(&self) -> &CommandSet {
        &self.command_names
    }

    /// Commands marked on this class itself
    pub fn own_command_names(&self) -> &CommandSet {
        &self.own_commands
    }

    /// Whether `name` is an effective command of the class
    pub fn is_command(&self, name: &str) -> bool {
        self.command_names.contains(name)
    }

    /// Whether a method called `name` is defined or inherited
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Look up a method, including inherited ones
    pub fn method(&self, name: &str) -> Option<&MethodFn<T>> {
        self.methods.get(name)
    }

    /// Every method of the class, including inherited ones
    pub fn methods(&self) -> impl Iterator<Item = (&str, &MethodFn<T>)> {
        self.methods.iter().map(|(name, method)| (name.as_str(), method))
    }
}

impl<T> fmt::Debug for Class<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("parent", &self.parent_name)
            .field("methods", &methods)
            .field("commands", &self.command_names)
            .finish()
    }
}
