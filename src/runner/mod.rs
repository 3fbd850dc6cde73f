//! Sessions, evaluation and the native function bridge.

pub mod api;
pub mod config;
pub mod ds;
pub mod eval;
pub mod plugin;
pub mod session;

pub use api::Engines;
pub use config::EngineConfig;
pub use ds::error::{JErrorType, JsError};
pub use ds::scope::BlockId;
pub use session::{EngineId, Js};
