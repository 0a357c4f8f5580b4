//! Constructor methods for ReactiveError

use super::types::ReactiveError;

impl ReactiveError {
    /// Create a construction error for the given class
    pub fn construction(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            class: class.into(),
            message: message.into(),
        }
    }

    /// Create a missing method error
    pub fn missing_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::MissingMethod {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Create an unknown command error
    pub fn unknown_command(class: impl Into<String>, command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            class: class.into(),
            command: command.into(),
        }
    }

    /// Create an unknown method error
    pub fn unknown_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Create an error for querying a command
    pub fn not_a_query(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::NotAQuery {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a command failure error
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create an unregistered class error
    pub fn unregistered_class(type_name: impl Into<String>) -> Self {
        Self::UnregisteredClass {
            type_name: type_name.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
