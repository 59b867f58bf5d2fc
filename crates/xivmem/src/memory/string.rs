//! Encodings for null-terminated strings in target memory.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{Error, Result};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StringEncoding {
    Ascii,
    #[default]
    Utf8,
    /// Little-endian UTF-16, two bytes per code unit
    Utf16,
}

impl StringEncoding {
    /// Size of one code unit in bytes; also the size of the terminator
    pub fn unit_size(&self) -> usize {
        match self {
            Self::Ascii | Self::Utf8 => 1,
            Self::Utf16 => 2,
        }
    }

    /// Decode bytes read from memory, terminator excluded
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Ascii => {
                if !bytes.is_ascii() {
                    return Err(Error::Encoding(
                        "Non-ASCII byte in ASCII string".to_string(),
                    ));
                }
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
            Self::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned())
                .ok_or_else(|| Error::Encoding("Malformed UTF-8 string".to_string())),
            Self::Utf16 => {
                if bytes.len() % 2 != 0 {
                    return Err(Error::Encoding(
                        "UTF-16 string has odd byte length".to_string(),
                    ));
                }
                encoding_rs::UTF_16LE
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|s| s.into_owned())
                    .ok_or_else(|| Error::Encoding("Malformed UTF-16 string".to_string()))
            }
        }
    }

    /// Encode text for writing, optionally appending a terminator
    pub fn encode(&self, text: &str, zero_terminate: bool) -> Result<Vec<u8>> {
        let mut bytes = match self {
            Self::Ascii => {
                if !text.is_ascii() {
                    return Err(Error::Encoding(format!(
                        "Text is not representable as ASCII: {:?}",
                        text
                    )));
                }
                text.as_bytes().to_vec()
            }
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16 => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        };

        if zero_terminate {
            bytes.extend(std::iter::repeat_n(0u8, self.unit_size()));
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_encoding_names() {
        assert_eq!(StringEncoding::from_str("utf16").unwrap(), StringEncoding::Utf16);
        assert_eq!(StringEncoding::from_str("ASCII").unwrap(), StringEncoding::Ascii);
        assert_eq!(StringEncoding::Utf8.to_string(), "utf8");
        assert!(StringEncoding::from_str("latin1").is_err());
    }

    #[test]
    fn test_utf16_encode_decode() {
        let encoded = StringEncoding::Utf16.encode("ヒカセン", true).unwrap();
        assert_eq!(encoded.len(), 4 * 2 + 2);
        assert_eq!(&encoded[encoded.len() - 2..], &[0, 0]);

        let decoded = StringEncoding::Utf16
            .decode(&encoded[..encoded.len() - 2])
            .unwrap();
        assert_eq!(decoded, "ヒカセン");
    }

    #[test]
    fn test_ascii_rejects_non_ascii() {
        assert!(StringEncoding::Ascii.encode("café", false).is_err());
        assert!(StringEncoding::Ascii.decode(&[0x63, 0xE9]).is_err());
        assert_eq!(StringEncoding::Ascii.decode(b"Limsa").unwrap(), "Limsa");
    }

    #[test]
    fn test_utf8_malformed() {
        let result = StringEncoding::Utf8.decode(&[0xC3, 0x28]);
        assert!(matches!(result, Err(Error::Encoding(_))));
    }

    #[test]
    fn test_no_terminator_when_disabled() {
        let encoded = StringEncoding::Utf8.encode("Hi", false).unwrap();
        assert_eq!(encoded, b"Hi");
    }
}
