//! Hexdump formatting for raw reads.
//!
//! ```text
//! 0x1400: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
//! ```

use std::fmt::Write;

/// Format `bytes` as 16-byte rows labelled with their absolute address
pub fn format(address: u64, bytes: &[u8]) -> String {
    let mut out = String::new();

    for (i, chunk) in bytes.chunks(16).enumerate() {
        let row = address.wrapping_add(i as u64 * 16);
        let _ = write!(out, "0x{:X}: ", row);

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                out.push(' ');
            }
            let _ = write!(out, "{:02X} ", byte);
        }

        // Padding for incomplete lines
        for j in chunk.len()..16 {
            if j == 8 {
                out.push(' ');
            }
            out.push_str("   ");
        }

        out.push_str(" |");
        for byte in chunk {
            if (0x20..0x7F).contains(byte) {
                out.push(*byte as char);
            } else {
                out.push('.');
            }
        }
        for _ in chunk.len()..16 {
            out.push(' ');
        }
        out.push_str("|\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_row() {
        let text = format(0x1400, b"Hello World\0\0\0\0\0");
        assert_eq!(
            text,
            "0x1400: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|\n"
        );
    }

    #[test]
    fn test_partial_row_is_padded() {
        let text = format(0x2000, &[0x41; 18]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("0x2010: 41 41 "));
        assert!(lines[1].ends_with("|AA              |"));
        assert_eq!(lines[0].len(), lines[1].len());
    }

    #[test]
    fn test_empty() {
        assert_eq!(format(0, &[]), "");
    }
}
