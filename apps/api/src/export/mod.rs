// Document export: record → DocumentTree → .docx bytes.
// Pure and CPU-bound; async callers run it on the blocking pool.

pub mod document;
pub mod docx;

use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::projection::Template;
use crate::schema::fields::non_blank;
use crate::schema::record::ResumeRecord;

pub use document::{build_document, DocBlock, DocumentTree};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid document tree: {0}")]
    InvalidTree(String),

    #[error("XML encoding failed: {0}")]
    Xml(String),

    #[error("Archive packing failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error while packing: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub file_name: String,
}

/// `Ada_Lovelace_Resume.docx`; `Resume.docx` when the name is blank.
/// Characters outside `[A-Za-z0-9_-]` are dropped from each word.
pub fn export_file_name(name: Option<&str>) -> String {
    let stem = non_blank(name)
        .map(|name| {
            name.split_whitespace()
                .map(|word| {
                    word.chars()
                        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                        .collect::<String>()
                })
                .filter(|word| !word.is_empty())
                .collect::<Vec<_>>()
                .join("_")
        })
        .unwrap_or_default();

    if stem.is_empty() {
        "Resume.docx".to_string()
    } else {
        format!("{stem}_Resume.docx")
    }
}

/// Exports `record` with the template named `template_id`.
/// Unknown ids export with the classic template.
pub fn serialize_to_document(
    record: &ResumeRecord,
    template_id: &str,
) -> Result<ExportedDocument, ExportError> {
    let template = Template::from_id(template_id);
    let tree = build_document(record, template)?;

    let name = non_blank(record.basics.name.as_deref()).unwrap_or_default();
    let meta = docx::DocMeta {
        title: if name.is_empty() {
            "Resume".to_string()
        } else {
            format!("{name} Resume")
        },
        creator: name.to_string(),
    };
    let bytes = docx::write_docx(&tree, &meta)?;

    info!(
        template = template.id(),
        blocks = tree.blocks.len(),
        bytes = bytes.len(),
        "Exported resume document"
    );

    Ok(ExportedDocument {
        bytes: Bytes::from(bytes),
        content_type: DOCX_CONTENT_TYPE,
        file_name: export_file_name(record.basics.name.as_deref()),
    })
}
