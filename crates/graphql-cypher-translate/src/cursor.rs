//! Connection cursors: base64 of `arrayconnection:<offset>`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::TranslationError;

const PREFIX: &str = "arrayconnection:";

pub fn encode(offset: usize) -> String {
    STANDARD.encode(format!("{PREFIX}{offset}"))
}

pub fn decode(cursor: &str) -> Result<usize, TranslationError> {
    let invalid = || TranslationError::InvalidCursor {
        cursor: cursor.to_string(),
    };

    let bytes = STANDARD.decode(cursor).map_err(|_| invalid())?;
    let text = String::from_utf8(bytes).map_err(|_| invalid())?;

    text.strip_prefix(PREFIX)
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    #[test]
    fn round_trips_offsets() {
        assert_eq!(super::encode(0), "YXJyYXljb25uZWN0aW9uOjA=");
        assert_eq!(super::decode(&super::encode(41)).unwrap(), 41);
        assert!(super::decode("YXJyYXk=").is_err());
    }
}
