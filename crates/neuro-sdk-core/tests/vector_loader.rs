//! JSON test vector loader shared by the envelope tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TestVector {
    pub description: String,
    pub frame: FrameData,
    #[serde(default)]
    pub expect: Option<serde_json::Value>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub code: String,
    /// `envelope` or `action`: which decode step must fail.
    pub stage: String,
}

#[derive(Debug, Deserialize)]
pub struct FrameData {
    pub encoding: String,
    pub data: serde_json::Value,
}

impl FrameData {
    /// The text frame exactly as the peer would send it.
    pub fn decode(&self) -> String {
        match self.encoding.as_str() {
            "json" => self.data.to_string(),
            "text" => self.data.as_str().expect("text vector must be a string").to_owned(),
            other => panic!("unsupported encoding: {other}"),
        }
    }
}
