use serde::Deserialize;

/// Options for reading and writing CSV datasets.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CsvOptions {
    pub delimiter: char,
    pub has_header: bool,
    /// When false every column is read as UTF-8 text, so pass-through columns
    /// are written back exactly as read.
    pub infer_types: bool,
    /// Rows sampled for schema inference (None = whole file).
    pub infer_max_records: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: ',',
            has_header: true,
            infer_types: false,
            infer_max_records: Some(1000),
        }
    }
}

impl CsvOptions {
    pub fn delimiter_byte(&self) -> Option<u8> {
        if self.delimiter.is_ascii() {
            Some(self.delimiter as u8)
        } else {
            None
        }
    }
}

/// Reader/writer settings common to every tabular format.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TabularOptions {
    pub csv: CsvOptions,
    /// Arrow batch size used while reading
    pub batch_size: usize,
}

impl Default for TabularOptions {
    fn default() -> Self {
        TabularOptions {
            csv: CsvOptions::default(),
            batch_size: 1024,
        }
    }
}
