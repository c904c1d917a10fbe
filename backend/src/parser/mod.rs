//! Delimited text loader with encoding and delimiter auto-detection.
//!
//! Produces header + string rows. No population-specific logic here;
//! [`crate::models::WideTable::from_parsed`] interprets the cells.

use serde_json::{json, Map, Value};
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Column headers
    pub headers: Vec<String>,
    /// Data rows, one string per cell
    pub rows: Vec<Vec<String>>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl ParseResult {
    /// Position of a header, exact match.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Rows as JSON objects keyed by header. Unnamed columns are left out.
    pub fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (i, header) in self.headers.iter().enumerate() {
                    if header.is_empty() {
                        continue;
                    }
                    let raw_value = row.get(i).map(String::as_str).unwrap_or("");
                    obj.insert(header.clone(), json!(raw_value));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding. A leading BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        // WHATWG maps the latin-1 labels to windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()
        }
        other => {
            let Some(enc) = encoding_rs::Encoding::for_label(other.as_bytes()) else {
                // Fallback: UTF-8 with lossy conversion
                return Ok(strip_bom(&String::from_utf8_lossy(bytes)).to_string());
            };
            let (text, _, had_errors) = enc.decode(bytes);
            if had_errors {
                return Err(CsvError::EncodingError(other.to_string()));
            }
            text.to_string()
        }
    };
    Ok(strip_bom(&decoded).to_string())
}

fn strip_bom(content: &str) -> &str {
    content.trim_start_matches('\u{feff}')
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Drop the first `count` physical lines (report preamble before the header).
pub fn skip_lines(content: &str, count: usize) -> &str {
    let mut rest = content;
    for _ in 0..count {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return "",
        }
    }
    rest
}

/// Parse CSV text into rows with explicit delimiter.
///
/// # Example
/// ```ignore
/// use popstat::parser::parse_str;
///
/// let result = parse_str("name;age\nAlice;30", ';', 0).unwrap();
/// assert_eq!(result.headers, vec!["name", "age"]);
/// assert_eq!(result.rows[0], vec!["Alice", "30"]);
/// ```
pub fn parse_str(content: &str, delimiter: char, skip_rows: usize) -> CsvResult<ParseResult> {
    parse_string_with_metadata(content, delimiter, skip_rows, "utf-8".to_string())
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("API_SP.POP.TOTL.csv", 4)?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Rows: {}", result.rows.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P, skip_rows: usize) -> CsvResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CsvError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => CsvError::IoError(e),
    })?;

    parse_bytes_auto(&bytes, skip_rows)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8], skip_rows: usize) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(skip_lines(&content, skip_rows));

    parse_string_with_metadata(&content, delimiter, skip_rows, encoding)
}

/// Parse CSV string with explicit delimiter and return metadata.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    skip_rows: usize,
    encoding: String,
) -> CsvResult<ParseResult> {
    let body = skip_lines(content, skip_rows);
    if body.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(ParseResult {
        headers,
        rows,
        encoding,
        delimiter,
    })
}
