use std::fmt;
use thiserror::Error;

macro_rules! simple_error {
    ($name:ident) => {
        #[derive(Debug)]
        pub struct $name(pub String);

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<std::io::Error> for $name {
            fn from(value: std::io::Error) -> Self {
                Self(value.to_string())
            }
        }

        impl From<InputError> for $name {
            fn from(value: InputError) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

#[derive(Debug)]
pub enum CliError {
    /// Print message to stdout and exit with code 0 (help/version/usage).
    Exit(String),
    /// Print message to stderr and exit with code 1.
    Message(String),
}

impl From<String> for CliError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for CliError {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Message(value.to_string())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Exit(msg) | CliError::Message(msg) => write!(f, "{}", msg),
        }
    }
}

/// Problems with a single record of an input file or stream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Error opening {source_name}: {message}")]
    Open {
        source_name: String,
        message: String,
    },
    #[error("{source_name}:{line}: failed to read line: {message}")]
    Read {
        source_name: String,
        line: usize,
        message: String,
    },
    #[error("{source_name}:{line}: expected {expected}, found {found}")]
    FieldCount {
        source_name: String,
        line: usize,
        expected: &'static str,
        found: usize,
    },
    #[error("{source_name}:{line}: invalid {label} '{value}'")]
    InvalidNumber {
        source_name: String,
        line: usize,
        label: &'static str,
        value: String,
    },
    #[error("{source_name}:{line}: {message}")]
    OutOfRange {
        source_name: String,
        line: usize,
        message: String,
    },
    #[error("{source_name}:{line}: site name must not be empty")]
    EmptyName { source_name: String, line: usize },
}

simple_error!(PlannerError);
simple_error!(OutputError);
