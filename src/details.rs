//! The details document: the final structured verdict, written once
//! per run as a single JSON object.

use crate::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub name: String,
    pub score: f64,
    pub score_scale: f64,
    pub status: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub score: f64,
    pub score_scale: f64,
    pub status: String,
    pub tests: Vec<Test>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionDetails {
    pub version: i32,
    pub jobs: Vec<Job>,
    pub summary: String,
}

/// Protocol version tag for [SolutionDetails::version].
pub const DETAILS_VERSION: i32 = 1;

/// Serialize the document and write it in one shot.
pub async fn write_details<P: AsRef<Path>>(path: P, details: &SolutionDetails) -> Result<()> {
    debug!("writing details to {}", path.as_ref().display());
    let body = serde_json::to_vec(details).map_err(Error::JSONError)?;
    async_std::fs::write(path.as_ref(), body)
        .await
        .map_err(Error::IOError)
}
