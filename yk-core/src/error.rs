//! Re-export of the shared error type

pub use yk_error::{Result, YukonError};
