pub mod json;
pub mod memory;

#[cfg(feature = "webservice")]
pub mod sheets_api;

pub use json::JsonFileBackend;
pub use memory::MemoryBackend;

#[cfg(feature = "webservice")]
pub use sheets_api::{AccessToken, SheetsApiBackend};
