//! Remote parameter panel for arbor - line-delimited JSON over TCP
//!
//! Start the debug server in your app:
//! ```ignore
//! let handler = Arc::new(Mutex::new(MyHandler::new()));
//! let _server = DebugServer::start(handler, arbor_debug::DEFAULT_PORT);
//! ```
//!
//! Then from a shell:
//! ```text
//! $ echo '{"cmd":"SetTreeParams","params":{"branch_count":3}}' | nc 127.0.0.1 9743
//! ```

pub mod protocol;
pub mod server;

pub use protocol::*;
pub use server::{DebugError, DebugHandler, DebugServer};

/// Default debug server port
pub const DEFAULT_PORT: u16 = 9743;
