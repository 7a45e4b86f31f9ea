use sqlx::error::{DatabaseError, ErrorKind};
use std::{borrow::Cow, error::Error as StdError, fmt};

/// Driver error carrying only a SQLSTATE, for exercising error mapping
/// without a live database.
#[derive(Debug)]
pub struct TestDbError {
    code: Option<&'static str>,
}

impl fmt::Display for TestDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "test database error")
    }
}

impl StdError for TestDbError {}

impl DatabaseError for TestDbError {
    fn message(&self) -> &str {
        "test database error"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        self.code.map(Cow::Borrowed)
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub fn db_error(code: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(TestDbError { code: Some(code) }))
}
