//! Export format recognition and migration
//!
//! Every document that enters the system is first classified into a
//! [`FormatTag`] by [`detect`], then upgraded to the canonical version 4
//! [`Document`](crate::model::Document) by a [`Migrator`].

mod detect;
mod foreign;
mod migrate;

pub use detect::detect;
pub use foreign::{convert_foreign, is_foreign};
pub use migrate::Migrator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shapes an incoming document can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    /// A ChatGPT data export
    Foreign,
    /// A bare array of conversations
    V1,
    /// `{history, folders}` with untyped folders
    V2,
    /// `{version: 3, history, folders}`
    V3,
    /// The current canonical document
    V4,
    /// None of the above
    Unrecognized,
}

impl FormatTag {
    pub fn is_recognized(self) -> bool {
        self != FormatTag::Unrecognized
    }

    /// True for shapes that predate the current document version
    pub fn is_legacy(self) -> bool {
        matches!(self, FormatTag::V1 | FormatTag::V2 | FormatTag::V3)
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTag::Foreign => write!(f, "foreign"),
            FormatTag::V1 => write!(f, "v1"),
            FormatTag::V2 => write!(f, "v2"),
            FormatTag::V3 => write!(f, "v3"),
            FormatTag::V4 => write!(f, "v4"),
            FormatTag::Unrecognized => write!(f, "unrecognized"),
        }
    }
}
