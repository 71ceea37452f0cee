#[derive(Debug, thiserror::Error)]
pub enum PatientSourceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(#[from] psr_types::ConstraintError),
    #[error("patient source has not been persisted (id and created_at are unset)")]
    NotPersisted,
    #[error("patient source {0} has already been persisted")]
    AlreadyPersisted(i64),
    #[error("patient source {0} not found")]
    NotFound(i64),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read patient sources file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write patient sources file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("patient sources table schema mismatch: {0}")]
    TableSchemaMismatch(String),
    #[error("failed to lock patient sources table: {0}")]
    StoreLock(std::io::Error),
    #[error("patient sources store lock poisoned")]
    StoreLockPoisoned,
}

pub type PatientSourceResult<T> = std::result::Result<T, PatientSourceError>;
