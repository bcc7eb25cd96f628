use aero_core_types::RequestId;

/// Result type alias using StorageError
pub type Result<T> = std::result::Result<T, StorageError>;

/// Classification of storage failures
///
/// Every repository failure is a `StorageError`; the kind tells callers
/// what went wrong without parsing messages. Each kind maps to a stable
/// code usable in tests and external responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorKind {
    /// Backing store unreachable or unusable (cannot open, I/O failure)
    Connection,
    /// Lock or busy wait exceeded the configured timeout
    Timeout,
    /// Backing-store constraint rejected the write
    ConstraintViolation,
    /// A stored value could not be decoded into the entity
    Serialization,
    /// Schema migration failed or was tampered with
    Migration,
    /// A sort was requested on a property the entity does not expose
    InvalidSort,
    /// Any other backing-store failure
    Backend,
}

impl StorageErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorKind::Connection => "ERR_CONNECTION",
            StorageErrorKind::Timeout => "ERR_TIMEOUT",
            StorageErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            StorageErrorKind::Serialization => "ERR_SERIALIZATION",
            StorageErrorKind::Migration => "ERR_MIGRATION",
            StorageErrorKind::InvalidSort => "ERR_INVALID_SORT",
            StorageErrorKind::Backend => "ERR_BACKEND",
        }
    }
}

/// Structured storage error
///
/// Built with `StorageError::new(kind)` and the `with_*` context helpers.
#[derive(Debug, Clone)]
pub struct StorageError {
    kind: StorageErrorKind,
    op: Option<String>,
    key: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            op: None,
            key: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the key of the record being touched
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Lock acquisition or busy wait ran past `timeout_ms`
    pub fn timeout(op: &str, timeout_ms: u128) -> Self {
        StorageError::new(StorageErrorKind::Timeout)
            .with_op(op)
            .with_message(format!("backing store not available within {}ms", timeout_ms))
    }

    /// Sort requested on an unknown property
    pub fn invalid_sort(op: &str, property: &str) -> Self {
        StorageError::new(StorageErrorKind::InvalidSort)
            .with_op(op)
            .with_message(format!("no sortable property named '{}'", property))
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] storage error", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {}
