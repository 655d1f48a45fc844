pub mod error;
pub mod field;
pub mod mapping;
pub mod report;

pub use error::{ModelError, Result};
pub use field::{RequiredField, field_names};
pub use mapping::{FieldMapping, FieldMatch, MatchKind};
pub use report::{
    ColumnCompleteness, ColumnMissing, CompletenessReport, RecordCompletenessReport,
    RowMissingBucket,
};
