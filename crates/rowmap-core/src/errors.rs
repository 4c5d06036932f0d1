use thiserror::Error;

/// Result type alias using MapError
pub type Result<T> = std::result::Result<T, MapError>;

/// Boxed error coming from a driver or a conversion routine
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mapping declaration rejected while building a descriptor
    Registration,
    /// Two distinct types claim the same table name
    RegistryConflict,
    /// Hydration or lookup against a table nobody registered
    UnknownTable,
    /// Predicate contains a node the translator cannot render
    Translation,
    /// A value could not be converted to the shape a statement or property expects
    Binding,
    /// Failure reported by the statement executor, passed through untouched
    Persistence,
    Internal,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Registration => "ERR_REGISTRATION",
            ErrorKind::RegistryConflict => "ERR_REGISTRY_CONFLICT",
            ErrorKind::UnknownTable => "ERR_UNKNOWN_TABLE",
            ErrorKind::Translation => "ERR_TRANSLATION",
            ErrorKind::Binding => "ERR_BINDING",
            ErrorKind::Persistence => "ERR_PERSISTENCE",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Error taxonomy for mapping, hydration, statement generation and translation
#[derive(Error, Debug)]
pub enum MapError {
    /// The declarative mapping of a type is invalid
    #[error("Error while registering entity {entity}: {reason}")]
    Registration { entity: String, reason: String },

    /// A second, distinct type maps onto an already registered table
    #[error("Error while registering entity {incoming}: table {table} is already mapped by {existing}")]
    RegistryConflict {
        table: String,
        existing: String,
        incoming: String,
    },

    #[error("Table {table} is not registered")]
    UnknownTable { table: String },

    /// Unsupported expression node; no partial SQL accompanies this error
    #[error("Error while translating query: {message} ({operator})")]
    Translation { operator: String, message: String },

    #[error("Error while binding {target}: {message}")]
    Binding {
        target: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Driver-level failure (connectivity, constraint violation, ...)
    #[error(transparent)]
    Driver(BoxError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl MapError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::Registration { .. } => ErrorKind::Registration,
            MapError::RegistryConflict { .. } => ErrorKind::RegistryConflict,
            MapError::UnknownTable { .. } => ErrorKind::UnknownTable,
            MapError::Translation { .. } => ErrorKind::Translation,
            MapError::Binding { .. } => ErrorKind::Binding,
            MapError::Driver(_) => ErrorKind::Persistence,
            MapError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// True for every failure raised while building a descriptor, conflicts included
    pub fn is_registration(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Registration | ErrorKind::RegistryConflict
        )
    }

    /// Borrow the driver error, if this error came from the executor
    pub fn driver_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            MapError::Driver(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

// ========== End Error Facility ==========

/// Create a registration error
pub fn registration(entity: &str, reason: impl Into<String>) -> MapError {
    MapError::Registration {
        entity: entity.to_string(),
        reason: reason.into(),
    }
}

/// Create an unknown table error
pub fn unknown_table(table: &str) -> MapError {
    MapError::UnknownTable {
        table: table.to_string(),
    }
}

/// Create a translation error naming the offending node kind
pub fn translation(operator: impl Into<String>, message: impl Into<String>) -> MapError {
    MapError::Translation {
        operator: operator.into(),
        message: message.into(),
    }
}

/// Create a binding error without an underlying cause
pub fn binding(target: impl Into<String>, message: impl Into<String>) -> MapError {
    MapError::Binding {
        target: target.into(),
        message: message.into(),
        source: None,
    }
}

/// Create a binding error wrapping the underlying cause
pub fn binding_caused_by(
    target: impl Into<String>,
    message: impl Into<String>,
    cause: impl Into<BoxError>,
) -> MapError {
    MapError::Binding {
        target: target.into(),
        message: message.into(),
        source: Some(cause.into()),
    }
}

/// Wrap a driver error so it passes through the engine unchanged
pub fn driver(err: impl Into<BoxError>) -> MapError {
    MapError::Driver(err.into())
}

/// Create an internal error
pub fn internal(message: impl Into<String>) -> MapError {
    MapError::Internal {
        message: message.into(),
    }
}
