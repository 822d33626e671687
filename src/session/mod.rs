//! Session management module
//!
//! Provides the client-side workspace session:
//! - `SessionStore` - Ordered open projects plus the active one
//! - `WorkspaceManager` - Open/close/switch lifecycle against the remote service
//! - `ReloadFanout` - Notifies dependent views when the active project changes

mod manager;
mod reload;
mod store;
mod types;

pub use manager::*;
pub use reload::*;
pub use store::*;
pub use types::*;
