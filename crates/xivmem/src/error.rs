use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Target pointer width ({target_width} bytes) exceeds host pointer width ({host_width} bytes)"
    )]
    IncompatibleBitness {
        target_width: usize,
        host_width: usize,
    },

    #[error("Access denied at address {address:#x} ({len} bytes): {message}")]
    AccessDenied {
        address: u64,
        len: usize,
        message: String,
    },

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Pointer chain broke at step {step} (address {address:#x}): {source}")]
    UnresolvableChain {
        step: usize,
        address: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("No string terminator within {max_len} bytes of {address:#x}")]
    UnterminatedString { address: u64, max_len: usize },

    #[error("Value {value:#x} does not fit in a {width}-byte pointer")]
    PointerOverflow { value: u64, width: usize },

    #[error("Cannot allocate a {len}-byte read buffer: {message}")]
    BufferAllocation { len: usize, message: String },

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Pointer has not been resolved")]
    Unresolved,

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors that usually mean the game has not finished loading a
    /// subsystem yet. Retrying resolution later may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ModuleNotFound(_) | Error::UnresolvableChain { .. }
        )
    }

    /// Errors that no amount of retrying will fix for this accessor.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::IncompatibleBitness { .. })
    }

    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err2 = Error::Io(other_io_err);
        assert!(!err2.is_not_found());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::ModuleNotFound("ffxiv_dx11.exe".to_string()).is_recoverable());

        let chain = Error::UnresolvableChain {
            step: 1,
            address: 0x10,
            source: Box::new(Error::AccessDenied {
                address: 0x10,
                len: 8,
                message: "unmapped".to_string(),
            }),
        };
        assert!(chain.is_recoverable());
        assert!(!chain.is_fatal());

        let bitness = Error::IncompatibleBitness {
            target_width: 8,
            host_width: 4,
        };
        assert!(bitness.is_fatal());
        assert!(!bitness.is_recoverable());
    }

    #[test]
    fn test_chain_error_message_includes_step() {
        let err = Error::UnresolvableChain {
            step: 2,
            address: 0x1F00,
            source: Box::new(Error::AccessDenied {
                address: 0x1F00,
                len: 8,
                message: "page not committed".to_string(),
            }),
        };
        let message = err.to_string();
        assert!(message.contains("step 2"));
        assert!(message.contains("0x1f00"));
    }
}
