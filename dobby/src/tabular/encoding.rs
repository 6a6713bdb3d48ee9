//! Text encodings for input and output files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TableError, TableResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Supported text encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    /// UTF-8 without byte-order mark. A BOM on input is still tolerated.
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// UTF-8 with byte-order mark (the spreadsheet-friendly default).
    #[default]
    #[serde(rename = "utf-8-sig", alias = "utf8-sig")]
    Utf8Sig,
    /// Decoded and encoded as windows-1252. Bytes 0x80-0x9F become
    /// characters such as `€` rather than C1 control codes.
    #[serde(rename = "latin-1", alias = "iso-8859-1", alias = "latin1")]
    Latin1,
    #[serde(rename = "windows-1252", alias = "cp1252")]
    Windows1252,
    /// Detect from the input bytes. Not valid for output.
    #[serde(rename = "auto")]
    Auto,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "windows-1252",
            TextEncoding::Auto => "auto",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-8-sig" | "utf8-sig" => Ok(TextEncoding::Utf8Sig),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "windows-1252" | "cp1252" => Ok(TextEncoding::Windows1252),
            "auto" => Ok(TextEncoding::Auto),
            other => Err(format!("unsupported encoding '{}'", other)),
        }
    }
}

/// Guess the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(UTF8_BOM) {
        return TextEncoding::Utf8Sig;
    }
    let (charset, _confidence, _language) = chardet::detect(bytes);
    match charset.to_lowercase().as_str() {
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => TextEncoding::Latin1,
        "windows-1252" | "cp1252" => TextEncoding::Windows1252,
        _ => TextEncoding::Utf8,
    }
}

/// Decode file bytes into text.
///
/// A leading UTF-8 BOM is dropped for both UTF-8 variants. [`TextEncoding::Auto`]
/// must be resolved with [`detect_encoding`] first; it decodes as UTF-8 here.
pub fn decode_content(bytes: &[u8], encoding: TextEncoding) -> TableResult<String> {
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Sig | TextEncoding::Auto => {
            let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            std::str::from_utf8(body)
                .map(str::to_string)
                .map_err(|_| TableError::Decode {
                    encoding: encoding.label().to_string(),
                })
        }
        // WHATWG maps the latin-1 labels onto windows-1252, a superset.
        TextEncoding::Latin1 | TextEncoding::Windows1252 => {
            let (text, _had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            Ok(text.into_owned())
        }
    }
}

/// Encode text for writing, adding a BOM for [`TextEncoding::Utf8Sig`].
pub fn encode_content(text: &str, encoding: TextEncoding) -> TableResult<Vec<u8>> {
    match encoding {
        TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
        TextEncoding::Utf8Sig | TextEncoding::Auto => {
            let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
            bytes.extend_from_slice(UTF8_BOM);
            bytes.extend_from_slice(text.as_bytes());
            Ok(bytes)
        }
        TextEncoding::Latin1 | TextEncoding::Windows1252 => {
            let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(text);
            if had_errors {
                return Err(TableError::Encode {
                    encoding: encoding.label().to_string(),
                });
            }
            Ok(bytes.into_owned())
        }
    }
}
