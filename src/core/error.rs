//! Error types for compiling and running transform statements.

use thiserror::Error;

/// Errors raised while compiling statements, loading configuration or
/// moving batches in and out of the CLI
#[derive(Error, Debug)]
pub enum TransformError {
    /// Statement text is not valid syntax
    #[error("Parse error: {message}")]
    Parse {
        /// Parser diagnostic
        message: String,
    },

    /// No function with this name is registered
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Function {function} expects {expected} arguments, got {found}")]
    Arity {
        /// Function name
        function: String,
        /// Accepted argument count, e.g. `2` or `at least 1`
        expected: String,
        /// Arguments supplied
        found: usize,
    },

    /// Argument of the wrong kind
    #[error("Argument '{parameter}' of {function} must be {expected}, got {found}")]
    ArgumentKind {
        /// Function name
        function: String,
        /// Parameter keyword
        parameter: &'static str,
        /// Accepted argument kind
        expected: &'static str,
        /// Kind of the supplied argument
        found: String,
    },

    /// Path is not in the path table
    #[error("Unknown path: {0}")]
    UnknownPath(String),

    /// Editor target is a read-only path
    #[error("Path is not writable: {0}")]
    PathNotWritable(String),

    /// Pattern argument does not compile
    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        /// Offending pattern
        pattern: String,
        /// Regex diagnostic
        #[source]
        source: regex::Error,
    },

    /// Argument is well-typed but not acceptable to the function
    #[error("Invalid argument for {function}: {message}")]
    InvalidArgument {
        /// Function name
        function: String,
        /// What was wrong
        message: String,
    },

    /// Compile error located in a statement list
    #[error("Statement {index} ('{statement}'): {source}")]
    Statement {
        /// Zero-based position in the list
        index: usize,
        /// Statement text
        statement: String,
        /// Underlying compile error
        #[source]
        source: Box<TransformError>,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a file or stream failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Batch JSON could not be read or written
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    /// Creates a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new invalid argument error
    pub fn invalid_argument<F: Into<String>, S: Into<String>>(function: F, msg: S) -> Self {
        Self::InvalidArgument {
            function: function.into(),
            message: msg.into(),
        }
    }

    /// Wraps a compile error with the position and text of its statement
    pub fn in_statement(self, index: usize, statement: &str) -> Self {
        Self::Statement {
            index,
            statement: statement.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns true if this error was raised while compiling statements
    pub fn is_compile_error(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Io(_) | Self::Serialization(_))
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::UnknownFunction(_) | Self::Arity { .. } | Self::ArgumentKind { .. } => {
                "signature"
            },
            Self::UnknownPath(_) | Self::PathNotWritable(_) => "path",
            Self::InvalidRegex { .. } | Self::InvalidArgument { .. } => "validation",
            Self::Statement { source, .. } => source.category(),
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
