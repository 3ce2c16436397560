/// Byte-level layout of language files: text encoding, BOM and line endings.
///
/// Files are edited by hand on every platform, so a load/save cycle keeps the
/// layout it found unless the caller asks otherwise.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    /// Fallback for legacy single-byte files that are not valid UTF-8.
    Latin1,
}

impl TextEncoding {
    /// `false` when encoding `text` would lose characters.
    pub fn can_encode(self, text: &str) -> bool {
        match self {
            Self::Latin1 => text.chars().all(|c| u32::from(c) <= 0xFF),
            _ => true,
        }
    }

    fn bom_len(self) -> usize {
        match self {
            Self::Utf8Bom => 3,
            Self::Utf16Le | Self::Utf16Be => 2,
            Self::Utf8 | Self::Latin1 => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLayout {
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
}

impl FileLayout {
    pub fn sniff(bytes: &[u8]) -> Self {
        Self {
            encoding: sniff_encoding(bytes),
            line_ending: sniff_line_ending(bytes),
        }
    }
}

fn sniff_encoding(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        TextEncoding::Utf8Bom
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        TextEncoding::Utf16Le
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        TextEncoding::Utf16Be
    } else if std::str::from_utf8(bytes).is_ok() {
        TextEncoding::Utf8
    } else {
        TextEncoding::Latin1
    }
}

// UTF-16 CRLF is `\r\0\n\0` (or `\0\r\0\n`), which still contains `\r` directly
// followed by a `\n` byte once the zero bytes are ignored.
fn sniff_line_ending(bytes: &[u8]) -> LineEnding {
    let mut previous_cr = false;
    for &byte in bytes {
        match byte {
            b'\r' => previous_cr = true,
            b'\n' => {
                return if previous_cr {
                    LineEnding::Crlf
                } else {
                    LineEnding::Lf
                }
            }
            0 => {}
            _ => previous_cr = false,
        }
    }
    LineEnding::Lf
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> io::Result<String> {
    let invalid = |err: String| io::Error::new(io::ErrorKind::InvalidData, err);
    let body = bytes
        .get(encoding.bom_len()..)
        .ok_or_else(|| invalid(format!("{encoding:?} input is shorter than its byte order mark")))?;
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => {
            String::from_utf8(body.to_vec()).map_err(|e| invalid(e.to_string()))
        }
        TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
            if body.len() % 2 != 0 {
                return Err(invalid(format!("{encoding:?} input has an odd byte count")));
            }
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| match encoding {
                    TextEncoding::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                    _ => u16::from_be_bytes([pair[0], pair[1]]),
                })
                .collect();
            String::from_utf16(&units).map_err(|e| invalid(e.to_string()))
        }
        TextEncoding::Latin1 => Ok(body.iter().map(|&b| char::from(b)).collect()),
    }
}

pub fn encode(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
        TextEncoding::Utf8Bom => {
            let mut bytes = vec![0xEF, 0xBB, 0xBF];
            bytes.extend_from_slice(text.as_bytes());
            bytes
        }
        TextEncoding::Utf16Le => {
            let mut bytes = vec![0xFF, 0xFE];
            bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
            bytes
        }
        TextEncoding::Utf16Be => {
            let mut bytes = vec![0xFE, 0xFF];
            bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
            bytes
        }
        // Characters outside Latin-1 become `?`; check `can_encode` first.
        TextEncoding::Latin1 => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
    }
}

/// Read a language file, returning its text and the layout it was stored in.
pub fn read_text(path: &Path) -> io::Result<(String, FileLayout)> {
    let bytes = fs::read(path)?;
    let layout = FileLayout::sniff(&bytes);
    let text = decode(&bytes, layout.encoding)?;
    Ok((text, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn sniffs_plain_utf8_lf() {
        let layout = FileLayout::sniff("Linguagem - [English]\nEnglish\n".as_bytes());
        assert_eq!(layout.encoding, TextEncoding::Utf8);
        assert_eq!(layout.line_ending, LineEnding::Lf);
    }

    #[test]
    fn sniffs_bom_and_crlf() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"a\r\nb\r\n");
        let layout = FileLayout::sniff(&bytes);
        assert_eq!(layout.encoding, TextEncoding::Utf8Bom);
        assert_eq!(layout.line_ending, LineEnding::Crlf);
        assert_eq!(decode(&bytes, layout.encoding).unwrap(), "a\r\nb\r\n");
    }

    #[test]
    fn utf16_crlf_is_detected() {
        let bytes = encode("x\r\ny", TextEncoding::Utf16Le);
        let layout = FileLayout::sniff(&bytes);
        assert_eq!(layout.encoding, TextEncoding::Utf16Le);
        assert_eq!(layout.line_ending, LineEnding::Crlf);
        assert_eq!(decode(&bytes, layout.encoding).unwrap(), "x\r\ny");
    }

    #[test]
    fn latin1_fallback() {
        let bytes = b"Portugu\xeas";
        let layout = FileLayout::sniff(bytes);
        assert_eq!(layout.encoding, TextEncoding::Latin1);
        assert_eq!(decode(bytes, layout.encoding).unwrap(), "Português");
        assert_eq!(encode("Português ✓", TextEncoding::Latin1), b"Portugu\xeas ?");
    }

    #[test]
    fn read_text_reports_layout() {
        let temp = NamedTempFile::new().unwrap();
        fs::write(temp.path(), encode("Olá\r\n", TextEncoding::Utf8Bom)).unwrap();
        let (text, layout) = read_text(temp.path()).unwrap();
        assert_eq!(text, "Olá\r\n");
        assert_eq!(layout.encoding, TextEncoding::Utf8Bom);
        assert_eq!(layout.line_ending, LineEnding::Crlf);
    }

    #[test]
    fn short_or_odd_input_is_invalid_data() {
        for (bytes, encoding) in [
            (&[0u8; 0][..], TextEncoding::Utf8Bom),
            (&[0xEF, 0xBB][..], TextEncoding::Utf8Bom),
            (&[0xFF][..], TextEncoding::Utf16Le),
            (&[0xFF, 0xFE, 0x41, 0x00, 0x42][..], TextEncoding::Utf16Le),
            (&[0xFE, 0xFF, 0x00][..], TextEncoding::Utf16Be),
        ] {
            let err = decode(bytes, encoding).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData, "{encoding:?} {bytes:?}");
        }
        assert_eq!(decode(&[0xFF, 0xFE], TextEncoding::Utf16Le).unwrap(), "");
    }

    #[test]
    fn latin1_reports_what_it_cannot_hold() {
        assert!(TextEncoding::Latin1.can_encode("Olá você ÿ"));
        assert!(!TextEncoding::Latin1.can_encode("日本語"));
        assert!(!TextEncoding::Latin1.can_encode("€"));
        assert!(TextEncoding::Utf16Be.can_encode("日本語"));
    }
}
