use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoError {
    #[error("Mapping error on column '{column}': {source}")]
    Mapping {
        column: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Field '{field}' is not part of the baseline of {type_name}")]
    Lookup {
        type_name: &'static str,
        field: String,
    },

    #[error("Field '{field}' is not declared on {type_name}")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    #[error("Field '{field}' of {type_name} could not be converted: {source}")]
    FieldType {
        type_name: &'static str,
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode column '{column}': {source}")]
    Encode {
        column: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, VoError>;

impl VoError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns `true` for errors caused by malformed stored JSON.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping { .. })
    }

    /// Returns `true` for registry or lifecycle-ordering defects.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
