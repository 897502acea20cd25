use std::{
    ffi::OsStr,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::resources::{DEFAULT_GROUP, ResourceError, ResourceGroupManager, ResourceLocation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveType {
    FileSystem,
    Zip,
}

impl FromStr for ArchiveType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FileSystem" => Ok(Self::FileSystem),
            "Zip" => Ok(Self::Zip),
            _ => Err(()),
        }
    }
}

#[derive(Debug)]
struct Group {
    name: String,
    locations: Vec<ResourceLocation>,
}

/// Resource manager that keeps locations per group in registration order.
///
/// Locations are only recorded by [`ResourceGroupManager::add_resource_location`];
/// archives are opened and checked by [`ResourceGroups::initialise_all`].
#[derive(Debug, Default)]
pub struct ResourceGroups {
    groups: Vec<Group>,
}

impl ResourceGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn locations(&self, group: &str) -> &[ResourceLocation] {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .map(|g| g.locations.as_slice())
            .unwrap_or(&[])
    }

    /// Opens every registered archive and builds the lookup index.
    pub fn initialise_all(&self) -> Result<ResourceIndex, ResourceError> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let archives = group
                .locations
                .iter()
                .map(Archive::open)
                .collect::<Result<Vec<_>, _>>()?;
            log::debug!("resource group [{}]: {} archives", group.name, archives.len());
            groups.push((group.name.clone(), archives));
        }
        Ok(ResourceIndex { groups })
    }
}

impl ResourceGroupManager for ResourceGroups {
    fn add_resource_location(
        &mut self,
        archive_path: &str,
        archive_type: &str,
        group: &str,
    ) -> Result<(), ResourceError> {
        let group = if group.is_empty() { DEFAULT_GROUP } else { group };
        let location = ResourceLocation::new(archive_path, archive_type, group);
        match self.groups.iter_mut().find(|g| g.name == group) {
            Some(existing) => existing.locations.push(location),
            None => self.groups.push(Group {
                name: group.to_string(),
                locations: vec![location],
            }),
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
enum Archive {
    FileSystem(PathBuf),
    Zip { path: PathBuf, entries: Vec<String> },
}

impl Archive {
    fn open(location: &ResourceLocation) -> Result<Self, ResourceError> {
        let path = PathBuf::from(&location.archive_path);
        match location.archive_type.parse::<ArchiveType>() {
            Ok(ArchiveType::FileSystem) => {
                if !path.is_dir() {
                    return Err(ResourceError::MissingArchive {
                        path,
                        archive_type: location.archive_type.clone(),
                    });
                }
                Ok(Self::FileSystem(path))
            }
            Ok(ArchiveType::Zip) => {
                let file = File::open(&path).map_err(|_| ResourceError::MissingArchive {
                    path: path.clone(),
                    archive_type: location.archive_type.clone(),
                })?;
                let archive = zip::ZipArchive::new(file).map_err(|source| ResourceError::Zip {
                    path: path.clone(),
                    source,
                })?;
                let entries = archive.file_names().map(str::to_string).collect();
                Ok(Self::Zip { path, entries })
            }
            Err(()) => Err(ResourceError::UnsupportedArchive {
                path,
                archive_type: location.archive_type.clone(),
            }),
        }
    }

    fn find(&self, name: &str) -> Option<Origin> {
        match self {
            Self::FileSystem(dir) => {
                let candidate = dir.join(name);
                candidate.is_file().then_some(Origin::File(candidate))
            }
            Self::Zip { path, entries } => entries
                .iter()
                .find(|entry| {
                    entry.as_str() == name
                        || Path::new(entry).file_name() == Some(OsStr::new(name))
                })
                .map(|entry| Origin::Zip {
                    archive: path.clone(),
                    entry: entry.clone(),
                }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    File(PathBuf),
    Zip { archive: PathBuf, entry: String },
}

/// A resource found by [`ResourceIndex::locate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    pub name: String,
    pub group: String,
    pub origin: Origin,
}

impl ResourceHandle {
    pub fn read(&self) -> Result<Vec<u8>, ResourceError> {
        let io_err = |source| ResourceError::Io {
            name: self.name.clone(),
            source,
        };
        match &self.origin {
            Origin::File(path) => std::fs::read(path).map_err(io_err),
            Origin::Zip { archive, entry } => {
                let file = File::open(archive).map_err(io_err)?;
                let zip_err = |source| ResourceError::Zip {
                    path: archive.clone(),
                    source,
                };
                let mut zip = zip::ZipArchive::new(file).map_err(zip_err)?;
                let mut zipped = zip.by_name(entry).map_err(zip_err)?;
                let mut bytes = Vec::new();
                zipped.read_to_end(&mut bytes).map_err(io_err)?;
                Ok(bytes)
            }
        }
    }

    /// Extension of the resource name, lower-cased.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

/// Immutable lookup table produced once all resource groups are initialised.
#[derive(Clone, Debug, Default)]
pub struct ResourceIndex {
    groups: Vec<(String, Vec<Archive>)>,
}

impl ResourceIndex {
    /// Searches groups and their archives in registration order.
    pub fn locate(&self, name: &str) -> Option<ResourceHandle> {
        self.groups.iter().find_map(|(group, archives)| {
            archives.iter().find_map(|archive| {
                archive.find(name).map(|origin| ResourceHandle {
                    name: name.to_string(),
                    group: group.clone(),
                    origin,
                })
            })
        })
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        self.locate(name)
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))?
            .read()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
