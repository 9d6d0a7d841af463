pub mod encoding;
pub mod telemetry;

pub use encoding::TextEncoding;
pub use telemetry::*;
