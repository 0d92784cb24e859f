//! Database ID type definitions.

use uuid::Uuid;

use crate::Error;

/// The ID of a [Company](crate::Company).
pub type CompanyId = Uuid;
/// The ID of a [Transaction](crate::Transaction).
pub type TransactionId = Uuid;

/// Parse an ID taken from a request path.
///
/// # Errors
/// Returns [Error::InvalidId] if `text` is not a UUID.
pub fn parse_id(text: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(text).map_err(|_| Error::InvalidId(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::{Error, database_id::parse_id};

    #[test]
    fn parses_hyphenated_uuid() {
        let id = Uuid::new_v4();

        assert_eq!(parse_id(&id.to_string()), Ok(id));
    }

    #[test]
    fn rejects_garbage() {
        for text in ["", "42", "not-a-uuid", "0e8f5b1c-1f2a-4f2b-9a0e"] {
            assert_eq!(parse_id(text), Err(Error::InvalidId(text.to_owned())));
        }
    }
}
