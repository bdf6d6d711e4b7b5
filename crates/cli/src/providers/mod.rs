//! Providers shipped with the host.

mod shortcuts;
mod strings;

pub use shortcuts::Shortcuts;
pub use strings::Strings;
