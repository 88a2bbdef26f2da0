//! Minimal `.xlsx` reader and writer.
//!
//! A workbook is a zip package of XML parts. Writing produces one worksheet of inline-string
//! cells with a bold, frozen header row. Reading accepts shared strings, inline strings and
//! plain values, picks one worksheet and treats its first row as the header.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use thiserror::Error;
use xml_presence_core::{
    emit_document, parse, ElementNode, ParseError, PresenceState, TableRow, TableSchema,
};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIP_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const SHEET_PART: &str = "xl/worksheets/sheet1.xml";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml" />
  <Default Extension="xml" ContentType="application/xml" />
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml" />
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml" />
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml" />
</Types>
"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml" />
</Relationships>
"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml" />
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml" />
</Relationships>
"#;

/// Style 1 is the bold header font.
const STYLES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="2">
    <font><sz val="11" /><name val="Calibri" /></font>
    <font><b /><sz val="11" /><name val="Calibri" /></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none" /></fill>
    <fill><patternFill patternType="gray125" /></fill>
  </fills>
  <borders count="1">
    <border><left /><right /><top /><bottom /><diagonal /></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" />
  </cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" />
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1" />
  </cellXfs>
</styleSheet>
"#;

/// Longest worksheet name spreadsheet applications accept.
const MAX_SHEET_NAME: usize = 31;
/// Worksheet limits of the xlsx format.
const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;

/// Errors returned while reading or writing workbooks.
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("failed to access workbook {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid workbook package: {0}")]
    Zip(#[from] ZipError),
    #[error("malformed workbook part {part}: {source}")]
    Xml { part: String, source: ParseError },
    #[error("workbook is missing required part {0}")]
    MissingPart(String),
    #[error("worksheet '{requested}' not found (available: {})", available.join(", "))]
    MissingSheet {
        requested: String,
        available: Vec<String>,
    },
    #[error(
        "cell reference {reference} is outside the worksheet limits ({} columns, {} rows)",
        MAX_COLUMNS,
        MAX_ROWS
    )]
    OutOfBounds { reference: String },
}

/// One worksheet: a header row followed by data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn from_table(name: &str, table: &TableSchema, rows: &[TableRow]) -> Self {
        Self {
            name: sheet_name(name),
            header: table.columns.clone(),
            rows: rows.iter().map(|row| row.cells.clone()).collect(),
        }
    }

    pub fn to_table(&self, separator: &str) -> (TableSchema, Vec<TableRow>) {
        let table = TableSchema::new(separator, self.header.clone());
        let rows = self.rows.iter().cloned().map(TableRow::new).collect();
        (table, rows)
    }
}

/// Write a single-sheet workbook to `path`.
pub fn write_workbook(path: &Path, sheet: &Sheet) -> Result<(), WorkbookError> {
    let bytes = to_bytes(sheet)?;
    fs::write(path, bytes).map_err(|source| WorkbookError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Read one worksheet from the workbook at `path`. `None` selects the first sheet.
pub fn read_workbook(path: &Path, worksheet: Option<&str>) -> Result<Sheet, WorkbookError> {
    let bytes = fs::read(path).map_err(|source| WorkbookError::Io {
        path: path.display().to_string(),
        source,
    })?;
    from_bytes(&bytes, worksheet)
}

/// Serialize a sheet into workbook bytes.
pub fn to_bytes(sheet: &Sheet) -> Result<Vec<u8>, WorkbookError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let workbook = emit_document(&workbook_part(&sheet.name));
    let worksheet = emit_document(&worksheet_part(sheet));
    let parts: [(&str, &str); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        (WORKBOOK_PART, workbook.as_str()),
        (WORKBOOK_RELS_PART, WORKBOOK_RELS),
        ("xl/styles.xml", STYLES),
        (SHEET_PART, worksheet.as_str()),
    ];
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())
            .map_err(|source| WorkbookError::Io {
                path: name.to_string(),
                source,
            })?;
    }

    let cursor = zip.finish()?;
    tracing::debug!(
        sheet = %sheet.name,
        rows = sheet.rows.len(),
        columns = sheet.header.len(),
        "wrote workbook"
    );
    Ok(cursor.into_inner())
}

/// Read one worksheet from workbook bytes.
pub fn from_bytes(bytes: &[u8], worksheet: Option<&str>) -> Result<Sheet, WorkbookError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let workbook = read_xml(&mut archive, WORKBOOK_PART)?;
    let sheets = list_sheets(&workbook);
    let (name, relationship) = select_sheet(&sheets, worksheet)?;

    let rels = read_xml(&mut archive, WORKBOOK_RELS_PART)?;
    let target = children(&rels, "Relationship")
        .find(|rel| rel.attribute("Id").text() == Some(relationship.as_str()))
        .and_then(|rel| rel.attribute("Target").value().map(resolve_target))
        .ok_or_else(|| WorkbookError::MissingPart(format!("worksheet relationship {relationship}")))?;

    let shared = match read_xml(&mut archive, SHARED_STRINGS_PART) {
        Ok(node) => shared_strings(&node),
        Err(WorkbookError::MissingPart(_)) => Vec::new(),
        Err(err) => return Err(err),
    };

    let sheet_xml = read_xml(&mut archive, &target)?;
    let mut grid = read_grid(&sheet_xml, &shared)?;
    let header = if grid.is_empty() {
        Vec::new()
    } else {
        grid.remove(0)
    };

    tracing::debug!(sheet = %name, rows = grid.len(), columns = header.len(), "read workbook");
    Ok(Sheet {
        name,
        header,
        rows: grid,
    })
}

/// Clamp a name to what spreadsheet applications accept as a worksheet name.
pub fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

fn element(name: &str, attributes: &[(&str, &str)]) -> ElementNode {
    attributes
        .iter()
        .fold(ElementNode::new(name), |node, (key, value)| {
            node.with_attribute(*key, PresenceState::from_text(*value))
        })
}

fn workbook_part(sheet: &str) -> ElementNode {
    element("workbook", &[("xmlns", SPREADSHEET_NS), ("xmlns:r", RELATIONSHIP_NS)]).with_child(
        ElementNode::new("sheets").with_child(element(
            "sheet",
            &[("name", sheet), ("sheetId", "1"), ("r:id", "rId1")],
        )),
    )
}

fn worksheet_part(sheet: &Sheet) -> ElementNode {
    let pane = element(
        "pane",
        &[
            ("ySplit", "1"),
            ("topLeftCell", "A2"),
            ("activePane", "bottomLeft"),
            ("state", "frozen"),
        ],
    );
    let views = ElementNode::new("sheetViews")
        .with_child(element("sheetView", &[("workbookViewId", "0")]).with_child(pane));

    let mut data = ElementNode::new("sheetData");
    data.children.push(row_element(1, &sheet.header, Some("1")));
    for (index, cells) in sheet.rows.iter().enumerate() {
        data.children.push(row_element(index + 2, cells, None));
    }

    element("worksheet", &[("xmlns", SPREADSHEET_NS)])
        .with_child(views)
        .with_child(data)
}

fn row_element(number: usize, cells: &[String], style: Option<&str>) -> ElementNode {
    let number_text = number.to_string();
    let mut row = element("row", &[("r", number_text.as_str())]);
    for (index, value) in cells.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let reference = format!("{}{number}", column_letters(index));
        let mut cell = element("c", &[("r", reference.as_str()), ("t", "inlineStr")]);
        if let Some(style) = style {
            cell.set_attribute("s", PresenceState::from_text(style));
        }
        let text = element("t", &[("xml:space", "preserve")]).with_text(value.as_str());
        row.children
            .push(cell.with_child(ElementNode::new("is").with_child(text)));
    }
    row
}

/// `0 -> A`, `25 -> Z`, `26 -> AA`.
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|b| char::from(*b)).collect()
}

/// Zero-based column of a cell reference such as `AB12`, or `None` when it has no letters.
fn column_index(reference: &str) -> Result<Option<usize>, WorkbookError> {
    let out_of_bounds = || WorkbookError::OutOfBounds {
        reference: reference.to_string(),
    };
    let mut number = 0usize;
    for letter in reference.bytes().take_while(u8::is_ascii_alphabetic) {
        let digit = usize::from(letter.to_ascii_uppercase() - b'A' + 1);
        number = number
            .checked_mul(26)
            .and_then(|n| n.checked_add(digit))
            .filter(|n| *n <= MAX_COLUMNS)
            .ok_or_else(out_of_bounds)?;
    }
    Ok(number.checked_sub(1))
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn children<'a>(node: &'a ElementNode, name: &'a str) -> impl Iterator<Item = &'a ElementNode> {
    node.children
        .iter()
        .filter(move |child| local_name(&child.name) == name)
}

fn child<'a>(node: &'a ElementNode, name: &'a str) -> Option<&'a ElementNode> {
    children(node, name).next()
}

fn read_xml(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    part: &str,
) -> Result<ElementNode, WorkbookError> {
    let mut file = match archive.by_name(part) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(WorkbookError::MissingPart(part.to_string())),
        Err(err) => return Err(err.into()),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| WorkbookError::Io {
            path: part.to_string(),
            source,
        })?;
    parse(&bytes).map_err(|source| WorkbookError::Xml {
        part: part.to_string(),
        source,
    })
}

/// `(name, relationship id)` for each sheet in workbook order.
fn list_sheets(workbook: &ElementNode) -> Vec<(String, String)> {
    let Some(sheets) = child(workbook, "sheets") else {
        return Vec::new();
    };
    children(sheets, "sheet")
        .filter_map(|sheet| {
            let name = sheet.attribute("name").text()?.to_string();
            let id = sheet
                .attributes
                .iter()
                .find(|(key, _)| key.contains(':') && local_name(key) == "id")
                .and_then(|(_, state)| state.text())?
                .to_string();
            Some((name, id))
        })
        .collect()
}

fn select_sheet(
    sheets: &[(String, String)],
    requested: Option<&str>,
) -> Result<(String, String), WorkbookError> {
    let found = match requested {
        Some(requested) => sheets.iter().find(|(name, _)| name == requested),
        None => sheets.first(),
    };
    found.cloned().ok_or_else(|| match requested {
        Some(requested) => WorkbookError::MissingSheet {
            requested: requested.to_string(),
            available: sheets.iter().map(|(name, _)| name.clone()).collect(),
        },
        None => WorkbookError::MissingPart("worksheet".to_string()),
    })
}

/// Relationship targets are relative to `xl/` unless absolute within the package.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

/// Text of a string item: a plain `t` or the concatenated runs of a rich string.
fn string_item(node: &ElementNode) -> String {
    match child(node, "t") {
        Some(t) => t.text.clone().unwrap_or_default(),
        None => children(node, "r")
            .filter_map(|run| child(run, "t"))
            .filter_map(|t| t.text.as_deref())
            .collect(),
    }
}

fn shared_strings(node: &ElementNode) -> Vec<String> {
    children(node, "si").map(string_item).collect()
}

fn cell_value(cell: &ElementNode, shared: &[String]) -> String {
    let raw = child(cell, "v").and_then(|v| v.text.as_deref()).unwrap_or("");
    match cell.attribute("t").text() {
        Some("s") => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| shared.get(index))
            .cloned()
            .unwrap_or_default(),
        Some("inlineStr") => child(cell, "is").map(string_item).unwrap_or_default(),
        Some("b") => match raw {
            "1" => "true".to_string(),
            "0" => "false".to_string(),
            other => other.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// All rows of a worksheet, with gaps filled by blank rows and trailing blank cells removed.
fn read_grid(sheet: &ElementNode, shared: &[String]) -> Result<Vec<Vec<String>>, WorkbookError> {
    let Some(data) = child(sheet, "sheetData") else {
        return Ok(Vec::new());
    };

    let mut grid: Vec<Vec<String>> = Vec::new();
    for row in children(data, "row") {
        let reference = row.attribute("r");
        let number = reference
            .text()
            .and_then(|r| r.trim().parse::<usize>().ok())
            .unwrap_or(grid.len() + 1);
        if number > MAX_ROWS {
            return Err(WorkbookError::OutOfBounds {
                reference: reference.text().unwrap_or_default().to_string(),
            });
        }
        while grid.len() + 1 < number {
            grid.push(Vec::new());
        }

        let mut cells: Vec<String> = Vec::new();
        for cell in children(row, "c") {
            let column = match cell.attribute("r").text() {
                Some(reference) => column_index(reference)?,
                None => None,
            }
            .unwrap_or(cells.len());
            if column >= MAX_COLUMNS {
                return Err(WorkbookError::OutOfBounds {
                    reference: format!("column {}", column + 1),
                });
            }
            if cells.len() <= column {
                cells.resize(column + 1, String::new());
            }
            cells[column] = cell_value(cell, shared);
        }
        while cells.last().is_some_and(String::is_empty) {
            cells.pop();
        }
        grid.push(cells);
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use pretty_assertions::assert_eq;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::{
        column_index, column_letters, from_bytes, sheet_name, to_bytes, Sheet, WorkbookError,
    };

    /// A one-sheet package named `Data` whose worksheet lives at `xl/worksheets/data.xml`.
    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let fixed = [
            (
                "xl/workbook.xml",
                r#"<workbook xmlns:r="rel"><sheets><sheet name="Data" sheetId="1" r:id="rId7"/></sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships><Relationship Id="rId7" Target="/xl/worksheets/data.xml"/></Relationships>"#,
            ),
        ];
        for (name, content) in fixed.iter().chain(parts) {
            zip.start_file(*name, options).expect("start");
            zip.write_all(content.as_bytes()).expect("write");
        }
        zip.finish().expect("finish").into_inner()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn sample() -> Sheet {
        Sheet {
            name: "action_types".to_string(),
            header: strings(&["action_name", "action_type"]),
            rows: vec![
                strings(&["act_jump", ""]),
                strings(&["act <&> \"quoted\"", "x"]),
            ],
        }
    }

    #[test]
    fn column_references_round_trip() {
        for (index, letters) in [(0, "A"), (25, "Z"), (26, "AA"), (27, "AB"), (701, "ZZ"), (702, "AAA")] {
            assert_eq!(column_letters(index), letters);
            assert_eq!(column_index(&format!("{letters}7")).expect("in range"), Some(index));
        }
        assert_eq!(column_index("XFD1").expect("last column"), Some(16_383));
        assert_eq!(column_index("12").expect("no letters"), None);
    }

    #[test]
    fn oversized_references_are_rejected() {
        for reference in ["XFE1", "ZZZZZZZZZZZZZZZ1"] {
            let err = column_index(reference).expect_err("too wide");
            assert!(
                matches!(err, WorkbookError::OutOfBounds { reference: ref r } if r == reference),
                "{err}"
            );
        }

        let wide = package(&[(
            "xl/worksheets/data.xml",
            r#"<worksheet><sheetData><row r="1"><c r="ZZZZZZZZZZZZZZZ1"><v>1</v></c></row></sheetData></worksheet>"#,
        )]);
        let err = from_bytes(&wide, None).expect_err("too wide");
        assert!(matches!(err, WorkbookError::OutOfBounds { .. }), "{err}");

        let tall = package(&[(
            "xl/worksheets/data.xml",
            r#"<worksheet><sheetData><row r="4000000000"><c><v>1</v></c></row></sheetData></worksheet>"#,
        )]);
        let err = from_bytes(&tall, None).expect_err("too tall");
        assert_eq!(
            err.to_string(),
            "cell reference 4000000000 is outside the worksheet limits (16384 columns, 1048576 rows)"
        );
    }

    #[test]
    fn written_workbook_reads_back() {
        let bytes = to_bytes(&sample()).expect("write");
        let sheet = from_bytes(&bytes, None).expect("read");
        assert_eq!(
            sheet,
            Sheet {
                rows: vec![strings(&["act_jump"]), strings(&["act <&> \"quoted\"", "x"])],
                ..sample()
            }
        );
    }

    #[test]
    fn missing_worksheet_lists_available_names() {
        let bytes = to_bytes(&sample()).expect("write");
        let err = from_bytes(&bytes, Some("skills")).expect_err("missing");
        assert!(matches!(
            err,
            WorkbookError::MissingSheet { ref available, .. } if available == &strings(&["action_types"])
        ));
    }

    #[test]
    fn sheet_names_are_clamped() {
        assert_eq!(sheet_name("a/b:c"), "a_b_c");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(sheet_name(""), "Sheet1");
    }

    #[test]
    fn shared_strings_and_typed_cells_are_resolved() {
        let parts = [
            (
                "xl/sharedStrings.xml",
                r#"<sst><si><t>id</t></si><si><r><t>na</t></r><r><t>me</t></r></si><si><t>alpha</t></si></sst>"#,
            ),
            (
                "xl/worksheets/data.xml",
                r#"<worksheet><sheetData>
                    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
                    <row r="3"><c r="A3" t="s"><v>2</v></c><c r="C3" t="b"><v>1</v></c></row>
                    <row r="4"><c r="B4"><v>12.5</v></c></row>
                </sheetData></worksheet>"#,
            ),
        ];
        let bytes = package(&parts);

        let sheet = from_bytes(&bytes, Some("Data")).expect("read");
        assert_eq!(sheet.header, strings(&["id", "name"]));
        assert_eq!(
            sheet.rows,
            vec![
                Vec::new(),
                strings(&["alpha", "", "true"]),
                strings(&["", "12.5"])
            ]
        );
    }

    #[test]
    fn non_zip_input_is_rejected() {
        let err = from_bytes(b"not a workbook", None).expect_err("invalid");
        assert!(matches!(err, WorkbookError::Zip(_)));
    }
}
