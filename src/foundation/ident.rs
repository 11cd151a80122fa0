//! Composite key grammar shared by both documents.
//!
//! Raw form: `"[index.]base[-qualifier]*"`. The canonical name joins `base` and every
//! qualifier with `_` and appends `_<index>` when an index is present, so
//! `"2.title-sub"` becomes `"title_sub_2"`. The index is appended as written: `"02.box"` and
//! `"2.box"` are different names.

use crate::foundation::error::{StagehandError, StagehandResult};

/// A parsed composite key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    /// `base[-qualifier]*` with every `-` replaced by `_`.
    pub base: String,
    /// Optional numeric discriminator written before the dot.
    pub index: Option<i64>,
    /// The discriminator's text exactly as written.
    pub index_text: Option<String>,
}

impl Identifier {
    /// Parse a raw composite key.
    pub fn parse(key: &str) -> StagehandResult<Self> {
        let parts: Vec<&str> = key.split('.').collect();
        let (index, rest) = match parts.as_slice() {
            [rest] => (None, *rest),
            [text, rest] => {
                let index = text.trim().parse::<i64>().map_err(|e| {
                    StagehandError::load_with(format!("invalid index format in `{key}`"), e)
                })?;
                (Some((index, *text)), *rest)
            }
            _ => {
                return Err(StagehandError::load(format!(
                    "invalid dot usage in `{key}`: `.` may only mark an index"
                )));
            }
        };

        Ok(Self {
            base: rest.replace('-', "_"),
            index: index.map(|(n, _)| n),
            index_text: index.map(|(_, text)| text.to_owned()),
        })
    }

    /// Canonical registry name.
    pub fn canonical(&self) -> String {
        match &self.index_text {
            Some(index) => format!("{}_{index}", self.base),
            None => self.base.clone(),
        }
    }
}

/// Normalize a raw composite key into its canonical name.
pub fn normalize(key: &str) -> StagehandResult<String> {
    Ok(Identifier::parse(key)?.canonical())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/ident.rs"]
mod tests;
