//! Synthetic record generation
//!
//! Produces fake values per field type, whole records from an ordered
//! field list, and fixed-size batches of records. Pure with respect to
//! its inputs apart from consuming randomness; persistence and pacing
//! live in the run engine.

use crate::domain::{Field, FieldType};
use fake::faker::address::en::StreetName;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;
use serde_json::{json, Map, Value};

/// One generated record: field name -> synthesized value, in field
/// order (serde_json is built with `preserve_order`).
pub type Record = Map<String, Value>;

/// Stateless generator for synthetic field values, records, and batches
#[derive(Debug, Default, Clone, Copy)]
pub struct DataGenerator;

impl DataGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Produce one value in the domain of the given field type.
    ///
    /// Unrecognized types fall back to a lorem word; this method never
    /// fails. Values are independent across calls.
    pub fn generate_value(&self, field_type: FieldType) -> Value {
        let mut rng = rand::thread_rng();
        match field_type {
            FieldType::FirstName => json!(FirstName().fake::<String>()),
            FieldType::LastName => json!(LastName().fake::<String>()),
            FieldType::Email => json!(SafeEmail().fake::<String>()),
            FieldType::Phone => json!(PhoneNumber().fake::<String>()),
            FieldType::Company => json!(CompanyName().fake::<String>()),
            FieldType::Address => json!(StreetName().fake::<String>()),
            FieldType::Date => {
                // A moment up to a year in the past, ISO-8601
                let offset = chrono::Duration::seconds(rng.gen_range(1..=365 * 24 * 3600));
                json!((chrono::Utc::now() - offset).to_rfc3339())
            }
            FieldType::Number => json!(rng.gen_range(0..=1000)),
            FieldType::Boolean => json!(rng.gen_bool(0.5)),
            FieldType::Uuid => json!(uuid::Uuid::new_v4().to_string()),
            FieldType::Unknown => json!(Word().fake::<String>()),
        }
    }

    /// Produce one record from an ordered field list.
    ///
    /// Fields are visited in order; if two fields share a name the
    /// later value overwrites the earlier one. Name uniqueness is a
    /// caller concern, enforced at schema-acceptance time.
    pub fn generate_record(&self, fields: &[Field]) -> Record {
        let mut record = Map::new();
        for field in fields {
            record.insert(field.name.clone(), self.generate_value(field.field_type));
        }
        record
    }

    /// Produce exactly `batch_size` records; zero gives an empty batch.
    pub fn generate_batch(&self, fields: &[Field], batch_size: usize) -> Vec<Record> {
        (0..batch_size).map(|_| self.generate_record(fields)).collect()
    }
}
