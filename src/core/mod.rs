pub mod error;
pub mod types;
pub mod value;

pub use error::{Result, VoError};
pub use types::OwnerRef;
pub use value::{FieldValue, loose_eq, truthy};
