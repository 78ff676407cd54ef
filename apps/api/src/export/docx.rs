//! WordprocessingML (.docx) packaging of a [`DocumentTree`].
//!
//! The package is built entirely in memory. Fixed parts (content types,
//! relationships, styles, numbering) are constants; `document.xml` and
//! `core.xml` are written with quick-xml so every piece of user text is escaped.
//! Archive entries carry a fixed timestamp so identical input yields identical
//! bytes.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::document::{DocBlock, DocumentTree, Run, TwoColumnTable};
use super::ExportError;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CP_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

// US letter, in twentieths of a point.
pub const PAGE_WIDTH_TWIPS: u32 = 12240;
pub const PAGE_HEIGHT_TWIPS: u32 = 15840;
pub const MARGIN_TWIPS: u32 = 1080;
pub const TEXT_WIDTH_TWIPS: u32 = PAGE_WIDTH_TWIPS - 2 * MARGIN_TWIPS;

pub const STYLE_NAME: &str = "Title";
pub const STYLE_TITLE: &str = "Subtitle";
pub const STYLE_CONTACT: &str = "Contact";
pub const STYLE_SUMMARY: &str = "Summary";
pub const STYLE_SECTION_HEADING: &str = "Heading1";
pub const STYLE_BULLET: &str = "ListBullet";

const BULLET_NUM_ID: &str = "1";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="21"/><w:szCs w:val="21"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="40" w:line="264" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="36"/><w:szCs w:val="36"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Subtitle"><w:name w:val="Subtitle"/><w:basedOn w:val="Normal"/><w:rPr><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Contact"><w:name w:val="Contact"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr><w:rPr><w:color w:val="555555"/><w:sz w:val="19"/><w:szCs w:val="19"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Summary"><w:name w:val="Summary"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="160"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:pBdr><w:bottom w:val="single" w:sz="4" w:space="1" w:color="999999"/></w:pBdr><w:spacing w:before="200" w:after="60"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:caps/><w:sz w:val="23"/><w:szCs w:val="23"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:ind w:left="360" w:hanging="180"/></w:pPr></w:style><w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style></w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="180"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

/// Document metadata written to `docProps/core.xml`.
#[derive(Debug, Clone, Default)]
pub struct DocMeta {
    pub title: String,
    pub creator: String,
}

/// Packs `tree` into .docx bytes.
pub fn write_docx(tree: &DocumentTree, meta: &DocMeta) -> Result<Vec<u8>, ExportError> {
    tree.check()?;
    let document = document_xml(tree)?;
    let core = core_xml(meta)?;

    let parts: [(&str, &[u8]); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("word/document.xml", document.as_slice()),
        ("word/styles.xml", STYLES_XML.as_bytes()),
        ("word/numbering.xml", NUMBERING_XML.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes()),
        ("docProps/core.xml", core.as_slice()),
    ];
    pack(&parts)
}

fn pack(parts: &[(&str, &[u8])]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // DateTime::default() is 1980-01-01 00:00:00, the zip epoch.
    let options = SimpleFileOptions::default()
        .last_modified_time(zip::DateTime::default())
        .compression_method(CompressionMethod::Deflated);

    for (name, body) in parts {
        zip.start_file(*name, options)?;
        zip.write_all(body)?;
    }

    Ok(zip.finish()?.into_inner())
}

// ────────────────────────────────────────────────────────────────────────────
// XML writing
// ────────────────────────────────────────────────────────────────────────────

struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> Result<Self, ExportError> {
        let mut xml = Self {
            writer: Writer::new(Vec::new()),
        };
        xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(xml)
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::Xml(e.to_string()))
    }

    fn start(name: &str, attrs: &[(&str, &str)]) -> BytesStart<'static> {
        let mut start = BytesStart::new(name.to_string());
        for attr in attrs {
            start.push_attribute(*attr);
        }
        start
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        self.event(Event::Start(Self::start(name, attrs)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        self.event(Event::Empty(Self::start(name, attrs)))
    }

    fn close(&mut self, name: &str) -> Result<(), ExportError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<(), ExportError> {
        let clean = xml_safe(text);
        self.event(Event::Text(BytesText::new(&clean)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Drops characters XML 1.0 cannot carry: control characters other than tab,
/// newline and carriage return, and the noncharacters U+FFFE and U+FFFF.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|c| match c {
            '\t' | '\n' | '\r' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => !c.is_control(),
        })
        .collect()
}

fn core_xml(meta: &DocMeta) -> Result<Vec<u8>, ExportError> {
    let mut xml = Xml::new()?;
    xml.open("cp:coreProperties", &[("xmlns:cp", CP_NS), ("xmlns:dc", DC_NS)])?;
    xml.open("dc:title", &[])?;
    xml.text(&meta.title)?;
    xml.close("dc:title")?;
    xml.open("dc:creator", &[])?;
    xml.text(&meta.creator)?;
    xml.close("dc:creator")?;
    xml.close("cp:coreProperties")?;
    Ok(xml.finish())
}

fn document_xml(tree: &DocumentTree) -> Result<Vec<u8>, ExportError> {
    let mut xml = Xml::new()?;
    xml.open("w:document", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)])?;
    xml.open("w:body", &[])?;

    for block in &tree.blocks {
        write_block(&mut xml, block, false)?;
    }
    write_section_properties(&mut xml)?;

    xml.close("w:body")?;
    xml.close("w:document")?;
    Ok(xml.finish())
}

fn write_block(xml: &mut Xml, block: &DocBlock, in_cell: bool) -> Result<(), ExportError> {
    match block {
        DocBlock::Name(text) => paragraph(xml, Some(STYLE_NAME), &[Run::plain(text.as_str())]),
        DocBlock::Title(text) => paragraph(xml, Some(STYLE_TITLE), &[Run::plain(text.as_str())]),
        DocBlock::Contact(text) => {
            paragraph(xml, Some(STYLE_CONTACT), &[Run::plain(text.as_str())])
        }
        DocBlock::Summary(lines) => summary(xml, lines),
        DocBlock::SectionHeading(text) => paragraph(
            xml,
            Some(STYLE_SECTION_HEADING),
            &[Run::plain(text.as_str())],
        ),
        DocBlock::Paragraph { runs } => paragraph(xml, None, runs),
        DocBlock::Bullet(text) => paragraph(xml, Some(STYLE_BULLET), &[Run::plain(text.as_str())]),
        DocBlock::Table(_) if in_cell => Err(ExportError::InvalidTree(
            "tables cannot be nested inside table cells".to_string(),
        )),
        DocBlock::Table(table) => write_table(xml, table),
    }
}

fn paragraph(xml: &mut Xml, style: Option<&str>, runs: &[Run]) -> Result<(), ExportError> {
    xml.open("w:p", &[])?;
    if let Some(style) = style {
        xml.open("w:pPr", &[])?;
        xml.empty("w:pStyle", &[("w:val", style)])?;
        if style == STYLE_BULLET {
            xml.open("w:numPr", &[])?;
            xml.empty("w:ilvl", &[("w:val", "0")])?;
            xml.empty("w:numId", &[("w:val", BULLET_NUM_ID)])?;
            xml.close("w:numPr")?;
        }
        xml.close("w:pPr")?;
    }
    for run in runs {
        write_run(xml, run)?;
    }
    xml.close("w:p")
}

fn summary(xml: &mut Xml, lines: &[String]) -> Result<(), ExportError> {
    xml.open("w:p", &[])?;
    xml.open("w:pPr", &[])?;
    xml.empty("w:pStyle", &[("w:val", STYLE_SUMMARY)])?;
    xml.close("w:pPr")?;
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            xml.open("w:r", &[])?;
            xml.empty("w:br", &[])?;
            xml.close("w:r")?;
        }
        write_run(xml, &Run::plain(line.as_str()))?;
    }
    xml.close("w:p")
}

fn write_run(xml: &mut Xml, run: &Run) -> Result<(), ExportError> {
    xml.open("w:r", &[])?;
    if run.bold {
        xml.open("w:rPr", &[])?;
        xml.empty("w:b", &[])?;
        xml.close("w:rPr")?;
    }
    xml.open("w:t", &[("xml:space", "preserve")])?;
    xml.text(&run.text)?;
    xml.close("w:t")?;
    xml.close("w:r")
}

/// Column width in fiftieths of a percent, the unit of `pct` table widths.
fn pct(percent: u8) -> String {
    (u32::from(percent) * 50).to_string()
}

fn grid_twips(percent: u8) -> String {
    (TEXT_WIDTH_TWIPS * u32::from(percent) / 100).to_string()
}

fn write_table(xml: &mut Xml, table: &TwoColumnTable) -> Result<(), ExportError> {
    xml.open("w:tbl", &[])?;

    xml.open("w:tblPr", &[])?;
    xml.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
    xml.open("w:tblBorders", &[])?;
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        xml.empty(
            edge,
            &[
                ("w:val", "none"),
                ("w:sz", "0"),
                ("w:space", "0"),
                ("w:color", "auto"),
            ],
        )?;
    }
    xml.close("w:tblBorders")?;
    xml.empty("w:tblLayout", &[("w:type", "fixed")])?;
    xml.close("w:tblPr")?;

    xml.open("w:tblGrid", &[])?;
    let (left, right) = (grid_twips(table.left_percent), grid_twips(table.right_percent));
    xml.empty("w:gridCol", &[("w:w", left.as_str())])?;
    xml.empty("w:gridCol", &[("w:w", right.as_str())])?;
    xml.close("w:tblGrid")?;

    xml.open("w:tr", &[])?;
    write_cell(xml, table.left_percent, &table.left)?;
    write_cell(xml, table.right_percent, &table.right)?;
    xml.close("w:tr")?;

    xml.close("w:tbl")?;
    // Word merges a table with whatever follows unless a paragraph separates them.
    paragraph(xml, None, &[])
}

fn write_cell(xml: &mut Xml, percent: u8, blocks: &[DocBlock]) -> Result<(), ExportError> {
    xml.open("w:tc", &[])?;
    xml.open("w:tcPr", &[])?;
    let width = pct(percent);
    xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "pct")])?;
    xml.close("w:tcPr")?;
    if blocks.is_empty() {
        // A cell must hold at least one paragraph.
        paragraph(xml, None, &[])?;
    }
    for block in blocks {
        write_block(xml, block, true)?;
    }
    xml.close("w:tc")
}

fn write_section_properties(xml: &mut Xml) -> Result<(), ExportError> {
    let (width, height) = (PAGE_WIDTH_TWIPS.to_string(), PAGE_HEIGHT_TWIPS.to_string());
    let margin = MARGIN_TWIPS.to_string();
    let margin = margin.as_str();
    xml.open("w:sectPr", &[])?;
    xml.empty("w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?;
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", margin),
            ("w:right", margin),
            ("w:bottom", margin),
            ("w:left", margin),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    xml.close("w:sectPr")
}
