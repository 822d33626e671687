//! Remote folder browsing for the open-project flow
//!
//! - `FolderBrowser` - Idle/Browsing/Selected navigation cursor
//! - `breadcrumbs` - Platform-independent path splitting

mod breadcrumb;
mod cursor;

pub use breadcrumb::*;
pub use cursor::*;
