use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use mcc_ingest::{
    DatasetOptions, IngestError, dataset_headers, load_dataset, load_required_fields,
};
use tempfile::TempDir;

const REFERENCE: &str = r#"{
  "Imaging": {
    "Optional Fields": {
      "BodyPart": { "aliases": ["body_part"] }
    },
    "Core Fields": {
      "PatientID": { "aliases": ["patient_id", "pid"] },
      "Modality": { "aliases": ["modality"] },
      "Sex": { "aliases": [] }
    }
  }
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_core_fields_level() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "reference.json", REFERENCE);

    let fields = load_required_fields(&path, Some("Core Fields")).unwrap();

    let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["PatientID", "Modality", "Sex"]);
    assert_eq!(fields[0].aliases(), ["patient_id", "pid"]);
}

#[test]
fn unknown_level_uses_whole_document() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "reference.json", REFERENCE);

    let fields = load_required_fields(&path, Some("Nope")).unwrap();

    let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["Imaging"]);
    assert!(fields[0].aliases().is_empty());
}

#[test]
fn invalid_json_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "reference.json", "{ not json");
    let result = load_required_fields(&path, None);
    assert!(matches!(result, Err(IngestError::Json { .. })));
}

#[test]
fn missing_reference_is_reported() {
    let result = load_required_fields(Path::new("/nonexistent/reference.json"), None);
    assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
}

#[test]
fn dataset_headers_are_verbatim() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "Metadata.CSV",
        "Patient_ID,modality,Study Date (UTC)\nP1,CT,2024-01-01\nP2,MR,\n",
    );

    let df = load_dataset(&path, DatasetOptions::default()).unwrap();

    assert_eq!(
        dataset_headers(&df),
        vec!["Patient_ID", "modality", "Study Date (UTC)"]
    );
    assert_eq!(df.height(), 2);
}

#[test]
fn broken_workbook_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "metadata.xlsx", "this is not a zip archive");
    let result = load_dataset(&path, DatasetOptions::default());
    assert!(matches!(result, Err(IngestError::Workbook { .. })));
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Metadata" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1">
<c r="A1" t="inlineStr"><is><t>Patient_ID</t></is></c>
<c r="B1" t="inlineStr"><is><t>Age</t></is></c>
<c r="C1" t="inlineStr"><is><t>Age</t></is></c>
</row>
<row r="2">
<c r="A2" t="inlineStr"><is><t>P1</t></is></c>
<c r="B2"><v>34</v></c>
<c r="C2" t="inlineStr"><is><t>NA</t></is></c>
</row>
<row r="3">
<c r="A3" t="inlineStr"><is><t>P2</t></is></c>
<c r="C3"><v>7</v></c>
</row>
</sheetData>
</worksheet>"#;

fn write_workbook(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for (part, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", SHEET),
    ] {
        zip.start_file(part, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

#[test]
fn workbook_first_sheet_is_loaded_as_text() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, "metadata.xlsx");

    let df = load_dataset(&path, DatasetOptions::default()).unwrap();

    assert_eq!(dataset_headers(&df), vec!["Patient_ID", "Age", "Age.1"]);
    assert_eq!(df.height(), 2);
    let ages = df.column("Age").unwrap().str().unwrap();
    assert_eq!(ages.get(0), Some("34"));
    assert_eq!(ages.get(1), None);
    // NA reads as missing, like in CSV files
    assert_eq!(df.column("Age.1").unwrap().null_count(), 1);
}

#[test]
fn csv_and_workbook_agree_on_missing_values() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "metadata.csv", "Patient_ID,Age,Age\nP1,34,NA\nP2,,7\n");
    let xlsx = write_workbook(&dir, "metadata.xlsx");

    let from_csv = load_dataset(&csv, DatasetOptions::default()).unwrap();
    let from_xlsx = load_dataset(&xlsx, DatasetOptions::default()).unwrap();

    assert_eq!(dataset_headers(&from_csv), dataset_headers(&from_xlsx));
    for name in ["Patient_ID", "Age", "Age.1"] {
        assert_eq!(
            from_csv.column(name).unwrap().null_count(),
            from_xlsx.column(name).unwrap().null_count(),
            "{name}"
        );
    }
}
