//! JSON configuration: frame-label renames
//!
//! The config maps each replacement label to the original label (or to an
//! array of originals). Lookups go the other way, so the table is inverted
//! into old → new form at load time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConvertError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    rename_labels: Option<BTreeMap<String, OneOrMany>>,
}

/// Old-label → new-label substitution table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelRenames {
    map: BTreeMap<String, String>,
}

impl LabelRenames {
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let json = std::fs::read(path).map_err(|_| ConvertError::ConfigOpen)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &[u8]) -> Result<Self, ConvertError> {
        let config: ConfigFile =
            serde_json::from_slice(json).map_err(|_| ConvertError::ConfigParse)?;

        let mut map = BTreeMap::new();
        if let Some(renames) = config.rename_labels {
            for (new_label, old) in renames {
                match old {
                    OneOrMany::One(old_label) => {
                        map.insert(old_label, new_label);
                    }
                    OneOrMany::Many(old_labels) => {
                        for old_label in old_labels {
                            map.insert(old_label, new_label.clone());
                        }
                    }
                }
            }
        }
        Ok(Self { map })
    }

    pub fn get(&self, old_label: &str) -> Option<&str> {
        self.map.get(old_label).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_rename() {
        let renames =
            LabelRenames::from_json(br#"{"rename_labels": {"loop_start": "lbl1"}}"#).unwrap();
        assert_eq!(renames.get("lbl1"), Some("loop_start"));
        assert_eq!(renames.get("loop_start"), None);
    }

    #[test]
    fn test_many_to_one_rename() {
        let renames =
            LabelRenames::from_json(br#"{"rename_labels": {"idle": ["stand", "wait"]}}"#).unwrap();
        assert_eq!(renames.get("stand"), Some("idle"));
        assert_eq!(renames.get("wait"), Some("idle"));
    }

    #[test]
    fn test_missing_key_is_empty() {
        let renames = LabelRenames::from_json(b"{}").unwrap();
        assert_eq!(renames.get("anything"), None);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert_eq!(
            LabelRenames::from_json(b"not json"),
            Err(ConvertError::ConfigParse)
        );
        assert_eq!(
            LabelRenames::from_json(b"[]"),
            Err(ConvertError::ConfigParse)
        );
        assert_eq!(
            LabelRenames::from_json(br#"{"rename_labels": "nope"}"#),
            Err(ConvertError::ConfigParse)
        );
        assert_eq!(
            LabelRenames::from_json(br#"{"rename_labels": {"a": 5}}"#),
            Err(ConvertError::ConfigParse)
        );
        assert_eq!(
            LabelRenames::from_json(br#"{"rename_labels": {"a": ["x", 5]}}"#),
            Err(ConvertError::ConfigParse)
        );
    }
}
