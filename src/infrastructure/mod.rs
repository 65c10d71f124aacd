pub mod entities;
pub mod http;
pub mod ndjson;
pub mod ollama;
pub mod traits;
