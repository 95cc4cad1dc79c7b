pub mod field;
pub mod form_data;

pub use field::{FieldDefinition, FieldGroup, FieldType, Schema};
pub use form_data::FormData;
