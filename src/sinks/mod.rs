//! Sink implementations

pub mod memory;
pub mod null;

#[cfg(feature = "console")]
pub mod console;

#[cfg(feature = "file")]
pub mod file;

#[cfg(feature = "file")]
pub mod json;

pub use memory::MemorySink;
pub use null::NullSink;

#[cfg(feature = "console")]
pub use console::ConsoleSink;

#[cfg(feature = "file")]
pub use file::FileSink;

#[cfg(feature = "file")]
pub use json::JsonSink;

pub use crate::core::Sink;
#[cfg(feature = "async-sinks")]
pub use crate::core::AsyncSink;

