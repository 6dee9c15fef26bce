//! Concrete transports behind the `link` traits.

pub mod nl2;
pub mod ws;

pub use nl2::{Nl2Client, Nl2Connector};
pub use ws::WsCommandSink;
