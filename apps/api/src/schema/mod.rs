// Resume document model: canonical (v2) and legacy (v1) records, the polymorphic
// section items, migration between shapes, and structural validation.
// Everything here is pure and synchronous.

pub mod fields;
pub mod items;
pub mod migration;
pub mod record;
pub mod validation;

pub use items::{ItemKind, SectionItem};
pub use migration::{
    ensure_v2_format, is_v2, migrate_v1_to_v2, migrate_v2_to_v1, normalize, MigrationError,
    RawRecord,
};
pub use record::{get_sorted_sections, Basics, ResumeRecord, ResumeRecordV1, Section};
pub use validation::{validate, ValidationResult, Violation};
