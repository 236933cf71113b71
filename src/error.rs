use std::{error::Error, fmt};

#[derive(Debug)]
pub enum StoreError {
    Database(Box<dyn Error + Send + Sync + 'static>),
    Decode(String),
    Missing(String),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use StoreError::*;
        match self {
            Database(e) => Some(e.as_ref() as &dyn Error),
            _ => None,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use StoreError::*;
        match self {
            Database(e) => write!(f, "DatabaseError: {}", e),
            Decode(s) => write!(f, "DecodeError: {}", s),
            Missing(s) => write!(f, "Missing: {}", s),
        }
    }
}

impl From<libsql::Error> for StoreError {
    fn from(error: libsql::Error) -> Self {
        StoreError::Database(Box::new(error))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FavoriteError {
    #[error("store error: {}", crate::unpack_error(.0))]
    Store(#[from] StoreError),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("a favorite update for this poem is already in flight")]
    Busy,
    #[error("favorite status has not been established")]
    StatusUnknown,
    #[error("request cancelled before the result was applied")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_chain_is_unpacked() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = FavoriteError::from(StoreError::Database(Box::new(inner)));
        assert_eq!(
            err.to_string(),
            "store error: DatabaseError: connection refused: connection refused"
        );
    }
}
