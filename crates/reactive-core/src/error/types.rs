//! Core error type for reactive instances

use thiserror::Error;

/// Result type alias for reactive operations
pub type ReactiveResult<T> = Result<T, ReactiveError>;

/// Main error type for class definitions, stores and reactive instances
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReactiveError {
    /// The class constructor rejected its arguments
    #[error("Construction of {class} failed: {message}")]
    Construction { class: String, message: String },

    /// A command was marked on a class that defines no such method
    #[error("Command {method} is marked on {class} but no method is defined")]
    MissingMethod { class: String, method: String },

    /// A name was invoked that is not a command of the class
    #[error("Unknown command {command} on {class}")]
    UnknownCommand { class: String, command: String },

    /// A name was queried that is not a method of the class
    #[error("Unknown method {method} on {class}")]
    UnknownMethod { class: String, method: String },

    /// A command was queried; commands only run through invoke
    #[error("Method {method} on {class} is a command and cannot be queried")]
    NotAQuery { class: String, method: String },

    /// Command arguments could not be decoded
    #[error("Invalid arguments for {command}: {message}")]
    InvalidArguments { command: String, message: String },

    /// The method behind a command reported a failure
    #[error("Command {command} failed: {message}")]
    Command { command: String, message: String },

    /// No class has been registered for the requested type
    #[error("No class registered for type {type_name}")]
    UnregisteredClass { type_name: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ReactiveError {
    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Construction { .. } => "REACTIVE_CONSTRUCTION",
            Self::MissingMethod { .. } => "REACTIVE_MISSING_METHOD",
            Self::UnknownCommand { .. } => "REACTIVE_UNKNOWN_COMMAND",
            Self::UnknownMethod { .. } => "REACTIVE_UNKNOWN_METHOD",
            Self::NotAQuery { .. } => "REACTIVE_NOT_A_QUERY",
            Self::InvalidArguments { .. } => "REACTIVE_INVALID_ARGUMENTS",
            Self::Command { .. } => "REACTIVE_COMMAND",
            Self::UnregisteredClass { .. } => "REACTIVE_UNREGISTERED_CLASS",
            Self::Config { .. } => "REACTIVE_CONFIG",
        }
    }
}
