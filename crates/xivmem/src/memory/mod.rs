mod accessor;
mod handle;
mod process;
mod scalar;
mod string;

// In-memory target process for tests; other crates enable it with the `mock` feature
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use accessor::MemoryAccessor;
pub use handle::ProcessHandle;
pub use process::TargetProcess;
pub use scalar::Scalar;
pub use string::StringEncoding;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockProcess, MockProcessBuilder};
