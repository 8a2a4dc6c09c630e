/// Boxed error returned by a dynamically called function
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// If attempt to borrow field was incorrect
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldAccessError {
    /// If there were an attempt to access field in unit type, primitive or container
    #[error("Attempt to access field in unit type/variant")]
    Unit,

    /// If accessing field that is not present in type
    #[error("Field not found")]
    NotFound,
}

/// Failure of type construction
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeConstructError {
    /// Attempted to construct primitive type
    #[error("Can't construct primitive type")]
    Primitive,

    /// Invalid type was passed as argument to constructor
    #[error("Invalid type at {index} was passed to runtime constructor, expected {expected}")]
    UnexpectedType {
        index: usize,
        /// Name of expected type
        expected: &'static str,
    },

    /// Related enum doesn't have requested variant
    #[error("Requested variant doesn't exist")]
    InvalidVariant,

    #[error("Called `construct_struct` on non-struct type")]
    NotStruct,

    #[error("Called `construct_enum` on non-enum type")]
    NotEnum,

    #[error("Not enough arguments were passed")]
    NotEnoughArgs,

    #[error("Too many arguments were passed")]
    TooManyArgs,
}

/// Value passed to [`crate::TypeInfoDynamic::assign`] can't become the target type
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    #[error("value is not convertible to {expected}")]
    Mismatch { expected: &'static str },

    #[error("value is out of range for {expected}")]
    OutOfRange { expected: &'static str },
}

/// Failure of a dynamic function or method call
#[derive(thiserror::Error, Debug)]
pub enum CallError {
    #[error("fn params num is {expected}, but got {got}")]
    ArgCount { expected: usize, got: usize },

    #[error("fn params num is {expected} at least, but got {got}")]
    ArgCountAtLeast { expected: usize, got: usize },

    #[error("use call_slice, fn params num should be {expected}, but got {got}")]
    SliceArgCount { expected: usize, got: usize },

    #[error("fn must be variadic")]
    NotVariadic,

    #[error("invalid argument at {index}, expected {expected}")]
    UnexpectedType { index: usize, expected: &'static str },

    /// Called function returned `Err`
    #[error(transparent)]
    Returned(BoxError),
}

/// Error of the helper functions
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("obj must not be nil")]
    NilObject,

    #[error("obj must be struct")]
    NotStruct,

    #[error("no such field: {0}")]
    NoSuchField(String),

    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("field path must not be empty")]
    EmptyPath,

    #[error("field path:{0} is invalid")]
    InvalidPath(String),

    #[error("field: {0} is nil")]
    NilField(String),

    #[error("field: {0} is not struct")]
    FieldNotStruct(String),

    #[error("field: {0} can not set")]
    Unsettable(String),

    /// Field value was requested as another type
    #[error("field: {field} has type {actual}")]
    TypeMismatch { field: String, actual: &'static str },

    #[error("method: {0} not found")]
    MethodNotFound(String),

    #[error("field: {field} can not be assigned: {source}")]
    Assign {
        field: String,
        #[source]
        source: AssignError,
    },

    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Construct(#[from] RuntimeConstructError),
}

impl Error {
    pub(crate) fn from_access(err: FieldAccessError, field: &str) -> Self {
        match err {
            FieldAccessError::Unit | FieldAccessError::NotFound => Error::NoSuchField(field.to_owned()),
        }
    }
}

impl CallError {
    /// Error the called function returned, if the call failed that way
    pub fn returned(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            CallError::Returned(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
