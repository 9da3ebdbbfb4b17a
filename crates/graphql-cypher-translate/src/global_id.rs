//! Opaque global node ids: base64 of `<Type>:<value>`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::TranslationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalId {
    pub type_name: String,
    pub value: String,
}

impl GlobalId {
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    pub fn encode(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.type_name, self.value))
    }

    pub fn decode(id: &str) -> Result<Self, TranslationError> {
        let invalid = || TranslationError::InvalidGlobalId { id: id.to_string() };

        let bytes = STANDARD.decode(id).map_err(|_| invalid())?;
        let text = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (type_name, value) = text.split_once(':').ok_or_else(invalid)?;

        if type_name.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(type_name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::GlobalId;

    #[test]
    fn decodes_what_it_encodes() {
        let id = GlobalId::new("Movie", "The Matrix: Reloaded");
        let encoded = id.encode();

        assert_eq!(encoded, "TW92aWU6VGhlIE1hdHJpeDogUmVsb2FkZWQ=");
        assert_eq!(GlobalId::decode(&encoded).unwrap(), id);
    }

    #[test]
    fn rejects_ids_without_a_type() {
        assert!(GlobalId::decode("bm90aGluZw==").is_err());
        assert!(GlobalId::decode("not base64!").is_err());
    }
}
