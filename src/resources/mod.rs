//! Resource locations: where the engine looks for meshes, materials and textures.
//!
//! Locations are read from a `resources.cfg`-style file (see [`config`]) where
//! each section names a resource group and each entry maps an archive type to
//! an archive path:
//!
//! ```text
//! [General]
//! FileSystem=media/models
//! Zip=media/packs/skybox.zip
//! ```
//!
//! [`load_resource_config`] turns such a file into an ordered list of
//! [`ResourceLocation`]s and [`setup_resources`] hands them to a
//! [`ResourceGroupManager`].

use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod config;
pub mod group;
pub mod mesh;

pub use config::{ConfigError, ConfigFile};
pub use group::{ArchiveType, Origin, ResourceGroups, ResourceHandle, ResourceIndex};

/// Group used when a location is registered without a section name.
pub const DEFAULT_GROUP: &str = "General";

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("entry `{archive_type}` in section [{group}] has an empty archive path")]
    EmptyArchivePath { archive_type: String, group: String },

    #[error("archive {path:?} ({archive_type}) does not exist")]
    MissingArchive { path: PathBuf, archive_type: String },

    #[error("unsupported archive type `{archive_type}` for {path:?}")]
    UnsupportedArchive { path: PathBuf, archive_type: String },

    #[error("cannot open zip archive {path:?}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("resource `{0}` was not found in any resource group")]
    NotFound(String),

    #[error("cannot read resource `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse mesh `{name}`: {source}")]
    Obj {
        name: String,
        #[source]
        source: tobj::LoadError,
    },
}

/// A named search path: `archive_path` of kind `archive_type` inside `group`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLocation {
    pub archive_path: String,
    pub archive_type: String,
    pub group: String,
}

impl ResourceLocation {
    pub fn new(
        archive_path: impl Into<String>,
        archive_type: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            archive_path: archive_path.into(),
            archive_type: archive_type.into(),
            group: group.into(),
        }
    }
}

/// Registration seam of the engine's resource manager.
pub trait ResourceGroupManager {
    fn add_resource_location(
        &mut self,
        archive_path: &str,
        archive_type: &str,
        group: &str,
    ) -> Result<(), ResourceError>;
}

/// Reads `path` and returns one location per entry, in file order.
pub fn load_resource_config(path: impl AsRef<Path>) -> Result<Vec<ResourceLocation>, ResourceError> {
    let config = ConfigFile::load(path)?;
    locations_from_config(&config)
}

pub fn locations_from_config(config: &ConfigFile) -> Result<Vec<ResourceLocation>, ResourceError> {
    let mut locations = Vec::with_capacity(config.len());
    for section in config.sections() {
        for setting in &section.settings {
            if setting.value.is_empty() {
                return Err(ResourceError::EmptyArchivePath {
                    archive_type: setting.key.clone(),
                    group: section.name.clone(),
                });
            }
            locations.push(ResourceLocation::new(
                setting.value.as_str(),
                setting.key.as_str(),
                section.name.as_str(),
            ));
        }
    }
    Ok(locations)
}

/// Registers every location with `manager`, preserving order.
pub fn setup_resources(
    manager: &mut dyn ResourceGroupManager,
    locations: &[ResourceLocation],
) -> Result<(), ResourceError> {
    for location in locations {
        log::debug!(
            "adding resource location {} ({}) to group [{}]",
            location.archive_path,
            location.archive_type,
            location.group
        );
        manager.add_resource_location(
            &location.archive_path,
            &location.archive_type,
            &location.group,
        )?;
    }
    log::info!("registered {} resource locations", locations.len());
    Ok(())
}
