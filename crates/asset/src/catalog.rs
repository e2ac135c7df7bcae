//! Assembles identities into per-kind, per-directory groups with array detection.
//!
//! Every path is resolved on its own; a path that fails identity resolution is
//! recorded in [`AssetCatalog::rejected`] and never affects the others.

use corelib::{IdentityError, OrderingError};

use crate::alias::{AliasGroup, group_by};
use crate::identity::{AssetIdentity, AssetKind, normalize_separators};
use crate::ordering::{array_key, sort_by_magnitude};

/// File whose directory is the project root.
pub const BUILD_MANIFEST: &str = "build.txt";

/// How an array's members ended up ordered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayOrdering {
    /// Ascending by digit magnitude, ties in input order.
    Numeric,
    /// A magnitude overflowed; members are in input order.
    InputOrder(OrderingError),
}

/// One accessor-worthy asset inside a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetEntry {
    Single(AssetIdentity),
    Array {
        /// Base name with digits removed.
        name: String,
        members: Vec<AssetIdentity>,
        ordering: ArrayOrdering,
    },
}

impl AssetEntry {
    pub fn name(&self) -> &str {
        match self {
            AssetEntry::Single(identity) => identity.base_name(),
            AssetEntry::Array { name, .. } => name,
        }
    }

    pub fn members(&self) -> &[AssetIdentity] {
        match self {
            AssetEntry::Single(identity) => std::slice::from_ref(identity),
            AssetEntry::Array { members, .. } => members,
        }
    }
}

/// Entries sharing one logical directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryGroup {
    pub directory: String,
    pub entries: Vec<AssetEntry>,
}

/// A path that could not be turned into an identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedAsset {
    pub path: String,
    pub error: IdentityError,
}

#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    kinds: Vec<(AssetKind, Vec<DirectoryGroup>)>,
    rejected: Vec<RejectedAsset>,
}

impl AssetCatalog {
    /// Resolve, classify and group `paths` under `root`.
    pub fn build<I, P>(root: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut rejected = Vec::new();
        let mut identities = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match AssetIdentity::new(path, root) {
                Ok(identity) => match identity.kind() {
                    Some(kind) => identities.push((kind, identity)),
                    None => log::debug!("Skipping unclassified file {path}"),
                },
                Err(error) => {
                    log::debug!("Rejected {path}: {error}");
                    rejected.push(RejectedAsset {
                        path: path.to_string(),
                        error,
                    });
                }
            }
        }

        let mut kinds = Vec::new();
        for kind in AssetKind::ALL {
            let of_kind = identities
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, identity)| identity.clone());
            let directories = group_by(of_kind, |id| id.logical_directory().to_string())
                .into_iter()
                .map(directory_group)
                .collect::<Vec<_>>();
            if !directories.is_empty() {
                kinds.push((kind, directories));
            }
        }

        Self { kinds, rejected }
    }

    /// Directory groups for `kind`, in first-seen directory order.
    pub fn groups(&self, kind: AssetKind) -> &[DirectoryGroup] {
        self.kinds
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, groups)| groups.as_slice())
            .unwrap_or(&[])
    }

    pub fn kinds(&self) -> impl Iterator<Item = AssetKind> + '_ {
        self.kinds.iter().map(|(kind, _)| *kind)
    }

    pub fn rejected(&self) -> &[RejectedAsset] {
        &self.rejected
    }

    /// All accepted identities of `kind`, in catalog order.
    pub fn identities(&self, kind: AssetKind) -> impl Iterator<Item = &AssetIdentity> + '_ {
        self.groups(kind)
            .iter()
            .flat_map(|group| group.entries.iter())
            .flat_map(AssetEntry::members)
    }
}

fn directory_group(group: AliasGroup<String, AssetIdentity>) -> DirectoryGroup {
    let entries = group_by(group.members, |id| array_key(id.base_name()))
        .into_iter()
        .map(entry_for)
        .collect();
    DirectoryGroup {
        directory: group.key,
        entries,
    }
}

fn entry_for(group: AliasGroup<String, AssetIdentity>) -> AssetEntry {
    let AliasGroup { key, members } = group;
    let mut members = match <[AssetIdentity; 1]>::try_from(members) {
        Ok([identity]) => return AssetEntry::Single(identity),
        Err(members) => members,
    };

    let ordering = match sort_by_magnitude(&mut members, AssetIdentity::base_name) {
        Ok(()) => ArrayOrdering::Numeric,
        Err(error) => {
            log::warn!("Array '{key}' keeps input order: {error}");
            ArrayOrdering::InputOrder(error)
        }
    };
    AssetEntry::Array {
        name: key,
        members,
        ordering,
    }
}

/// Directory of the first build manifest among `paths`, `/`-separated.
pub fn project_root_from_manifest<I, P>(paths: I) -> Option<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    paths.into_iter().find_map(|path| {
        let path = normalize_separators(path.as_ref());
        let (directory, file_name) = path.rsplit_once('/')?;
        (file_name == BUILD_MANIFEST).then(|| directory.to_string())
    })
}
