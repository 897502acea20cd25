//! Reader for sectioned `key = value` config files such as `resources.cfg`.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! # comment
//! @ also a comment
//! [Section]
//! FileSystem=media/models
//! Zip: media/packs/skybox.zip
//! ```
//!
//! Keys and values are split at the first of tab, `:` or `=`. Entries that
//! appear before any section header belong to the unnamed section `""`.
//! Every header opens a new run, so a repeated header does not pull its
//! entries ahead of the sections in between. Runs and entries keep file order.

use std::path::{Path, PathBuf};

use thiserror::Error;

const SEPARATORS: &[char] = &['\t', ':', '='];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// A single `key = value` pair inside a section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// One run of entries under a header, up to the next header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub settings: Vec<Setting>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    sections: Vec<Section>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = ConfigFile::default();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| ConfigError::Malformed {
                    line: line_no,
                    reason: format!("section header `{line}` is missing `]`"),
                })?;
                config.sections.push(Section {
                    name: name.trim().to_string(),
                    settings: Vec::new(),
                });
                continue;
            }

            let Some(split) = line.find(SEPARATORS) else {
                return Err(ConfigError::Malformed {
                    line: line_no,
                    reason: format!("`{line}` has no `=`, `:` or tab separator"),
                });
            };
            let key = line[..split].trim();
            if key.is_empty() {
                return Err(ConfigError::Malformed {
                    line: line_no,
                    reason: "empty key".to_string(),
                });
            }
            let value = line[split..].trim_start_matches(SEPARATORS).trim();

            config.current_section().settings.push(Setting {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        Ok(config)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// All runs opened under `name`, in file order.
    pub fn sections_named<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a Section> + use<'a, 'b> {
        self.sections.iter().filter(move |s| s.name == name)
    }

    /// First value stored under `key` in any run of `section`.
    pub fn setting(&self, section: &str, key: &str) -> Option<&str> {
        self.sections_named(section)
            .flat_map(|s| s.settings.iter())
            .find(|s| s.key == key)
            .map(|s| s.value.as_str())
    }

    /// Total number of entries across all sections.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.settings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Entries before any header open the unnamed run.
    fn current_section(&mut self) -> &mut Section {
        if self.sections.is_empty() {
            self.sections.push(Section {
                name: String::new(),
                settings: Vec::new(),
            });
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }
}
