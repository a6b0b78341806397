#![doc = include_str!("../README.md")]

pub mod data;
pub mod details;
pub mod error;
pub mod judge;
pub mod report;
pub mod run;
pub mod util;

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::util;
    pub use byte_unit::Byte;
    pub use log::{debug, error, info, trace, warn};
    pub use serde::Deserialize;
    pub use std::path::{Path, PathBuf};
    pub use std::time::Duration;
}
