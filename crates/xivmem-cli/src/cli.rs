//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use xivmem::StringEncoding;

#[derive(Parser)]
#[command(name = "xivmem")]
#[command(about = "Resolve and inspect FFXIV memory through portable pointer definitions")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to <config dir>/xivmem/config.toml)
    #[arg(short, long, global = true, env = "XIVMEM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Attach to this process ID instead of searching by name
    #[arg(short, long, global = true)]
    pub pid: Option<u32>,

    /// Executable name to search for
    #[arg(long, global = true)]
    pub process: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List modules loaded in the target
    Modules,

    /// Resolve a pointer and print every step of the chain
    Resolve {
        /// Descriptor, e.g. ffxiv_dx11.exe+19D55E8,4C
        descriptor: String,
    },

    /// Read a value at a pointer
    Read {
        descriptor: String,

        /// Scalar type to read
        #[arg(long = "as", value_enum, conflicts_with_all = ["bytes", "string"])]
        kind: Option<ValueKind>,

        /// Dump this many raw bytes
        #[arg(long, conflicts_with = "string")]
        bytes: Option<usize>,

        /// Read a zero-terminated string
        #[arg(long, value_parser = parse_encoding)]
        string: Option<StringEncoding>,

        /// Hex offset added to the resolved address
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,
    },

    /// Write a value at a pointer
    Write {
        descriptor: String,

        /// Scalar type to write
        #[arg(long = "as", value_enum, required_unless_present = "string", conflicts_with = "string")]
        kind: Option<ValueKind>,

        /// Write a string in this encoding
        #[arg(long, value_parser = parse_encoding)]
        string: Option<StringEncoding>,

        /// Do not append a zero terminator to strings
        #[arg(long, requires = "string")]
        no_terminator: bool,

        /// Hex offset added to the resolved address
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,

        /// Value to write (decimal, or hex with 0x prefix)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Fetch the definition catalog for the running game and resolve it
    Catalog {
        /// Game version (detected from ffxivgame.ver if omitted)
        #[arg(long)]
        version: Option<String>,

        /// Directory or http(s) URL holding <version>.json documents
        #[arg(long)]
        store: Option<String>,

        /// Bypass the local cache
        #[arg(long)]
        refresh: bool,
    },

    /// Build a catalog document from textual descriptors
    Export {
        #[arg(long)]
        version: String,

        /// Struct field offset, NAME=HEX
        #[arg(long = "field", value_name = "NAME=HEX")]
        fields: Vec<String>,

        /// NAME=DESCRIPTOR pairs
        #[arg(required = true, value_name = "NAME=DESCRIPTOR")]
        pointers: Vec<String>,
    },
}

/// Scalar types accepted by `read --as` and `write --as`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    /// Target-width pointer
    Ptr,
}

fn parse_encoding(s: &str) -> Result<StringEncoding, String> {
    s.parse()
        .map_err(|_| format!("unknown encoding '{}' (expected ascii, utf8 or utf16)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_read_string() {
        let cli = Cli::parse_from([
            "xivmem", "--pid", "1234", "read", "ffxiv_dx11.exe+1000,30", "--string", "UTF16",
        ]);
        assert_eq!(cli.pid, Some(1234));
        match cli.command {
            Command::Read { descriptor, string, kind, .. } => {
                assert_eq!(descriptor, "ffxiv_dx11.exe+1000,30");
                assert_eq!(string, Some(StringEncoding::Utf16));
                assert_eq!(kind, None);
            }
            _ => panic!("expected read"),
        }
    }

    #[test]
    fn test_parse_write_negative_value() {
        let cli = Cli::parse_from(["xivmem", "write", "1000", "--as", "i32", "-5"]);
        match cli.command {
            Command::Write { kind, value, .. } => {
                assert_eq!(kind, Some(ValueKind::I32));
                assert_eq!(value, "-5");
            }
            _ => panic!("expected write"),
        }
    }

    #[test]
    fn test_write_requires_kind_or_string() {
        assert!(Cli::try_parse_from(["xivmem", "write", "1000", "5"]).is_err());
    }
}
