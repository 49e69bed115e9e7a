// Column-width recovery from raw XLSX XML
//
// calamine exposes cell values but not `<cols>` layout metadata, so the
// widths of an uploaded workbook are read straight out of the ZIP: resolve
// the first worksheet's path via workbook.xml + its rels, then scan its
// `<col>` elements. Everything here is best effort — any failure yields an
// empty map and the writer falls back to category defaults.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

/// Widest `<col min max>` span we honor; wider spans are sheet-default
/// noise, not user layout.
const MAX_COL_SPAN: usize = 64;

/// Read custom column widths (zero-based column index → Excel character
/// units) from the first worksheet of an xlsx byte buffer.
pub fn read_col_widths(bytes: &[u8]) -> HashMap<usize, f64> {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(a) => a,
        Err(_) => return HashMap::new(),
    };

    let workbook_xml = match read_zip_file(&mut archive, "xl/workbook.xml") {
        Some(s) => s,
        None => return HashMap::new(),
    };
    let rels_xml = match read_zip_file(&mut archive, "xl/_rels/workbook.xml.rels") {
        Some(s) => s,
        None => return HashMap::new(),
    };

    let ws_path = match first_worksheet_path(&workbook_xml, &rels_xml) {
        Some(p) => p,
        None => return HashMap::new(),
    };
    let ws_xml = match read_zip_file(&mut archive, &ws_path) {
        Some(s) => s,
        None => return HashMap::new(),
    };

    parse_col_widths(&ws_xml)
}

/// Read a file from a ZIP archive, returning None on error.
fn read_zip_file<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Option<String> {
    let mut file = archive.by_name(path).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Resolve the first worksheet's XML path from workbook.xml + its rels.
fn first_worksheet_path(workbook_xml: &str, rels_xml: &str) -> Option<String> {
    // Step 1: rId of the first <sheet> in workbook order
    let mut first_rid = None;
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"sheet" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r:id" {
                        first_rid = Some(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
                if first_rid.is_some() {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    let first_rid = first_rid?;

    // Step 2: rId → target path
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => target = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    if id == first_rid && target.contains("worksheet") {
                        return Some(format!("xl/{}", target));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    None
}

/// Scan `<col min=".." max=".." width=".."/>` elements of a worksheet.
/// min/max are 1-based inclusive; output indices are zero-based.
fn parse_col_widths(ws_xml: &str) -> HashMap<usize, f64> {
    let mut widths = HashMap::new();
    let mut reader = Reader::from_str(ws_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"col" => {
                let mut min = None;
                let mut max = None;
                let mut width = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"min" => min = value.parse::<usize>().ok(),
                        b"max" => max = value.parse::<usize>().ok(),
                        b"width" => width = value.parse::<f64>().ok(),
                        _ => {}
                    }
                }
                if let (Some(min), Some(max), Some(width)) = (min, max, width) {
                    if min >= 1 && max >= min && max - min < MAX_COL_SPAN {
                        for col in min..=max {
                            widths.insert(col - 1, width);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    widths
}
