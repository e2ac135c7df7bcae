//! Logical identity of an asset file relative to a project root.
//!
//! Identities are pure functions of `(raw_path, root_path)`. All derived paths
//! use `/` separators regardless of the host platform.

use corelib::IdentityError;

/// Leading folder that is dropped from logical directories.
const ASSETS_DIR: &str = "Assets";

/// Asset families recognized by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Texture,
    Model,
    Effect,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Texture, AssetKind::Model, AssetKind::Effect];

    /// Extensions (lowercase, no dot) handled by this kind.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            AssetKind::Texture => &["png"],
            AssetKind::Model => &["obj"],
            AssetKind::Effect => &["fxc", "xnb"],
        }
    }

    /// Case-insensitive lookup; accepts an optional leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL.into_iter().find(|kind| {
            kind.extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }
}

/// Normalized descriptor of one asset file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetIdentity {
    raw_path: String,
    root_path: String,
    logical_directory: String,
    reference_path: String,
    base_name: String,
    extension: String,
}

impl AssetIdentity {
    /// Resolve the identity of `raw_path` inside the project rooted at `root_path`.
    pub fn new(
        raw_path: impl AsRef<str>,
        root_path: impl AsRef<str>,
    ) -> Result<Self, IdentityError> {
        let raw = normalize_separators(raw_path.as_ref());
        let root_path = normalize_separators(root_path.as_ref());
        let root = root_path.trim_end_matches('/');

        let Some(relative) = raw
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty() && !rest.ends_with('/'))
        else {
            return Err(IdentityError::PathOutsideRoot {
                path: raw,
                root: root_path,
            });
        };

        let (directory, file_name) = match relative.rfind('/') {
            Some(i) => (&relative[..i], &relative[i + 1..]),
            None => ("", relative),
        };
        let logical_directory = strip_assets_dir(directory).to_string();

        let (base_name, extension) = split_extension(file_name);

        // Reference paths start at the root folder's own name. A filesystem
        // root has no name, so they start below it.
        let from_parent = match root.rfind('/') {
            Some(i) => &raw[i + 1..],
            None => raw.trim_start_matches('/'),
        };
        let folder = &from_parent[..from_parent.len() - file_name.len()];
        let reference_path = format!("{folder}{base_name}");

        Ok(Self {
            logical_directory,
            reference_path,
            base_name: base_name.to_string(),
            extension: extension.to_ascii_lowercase(),
            root_path: root.to_string(),
            raw_path: raw,
        })
    }

    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Folder path below the root, without a leading `Assets` component.
    pub fn logical_directory(&self) -> &str {
        &self.logical_directory
    }

    /// Runtime lookup key, e.g. `MyMod/Assets/Textures/Leaf`.
    pub fn reference_path(&self) -> &str {
        &self.reference_path
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Lowercase extension without the dot; empty if the file has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_at_root(&self) -> bool {
        self.logical_directory.is_empty()
    }

    pub fn kind(&self) -> Option<AssetKind> {
        AssetKind::from_extension(&self.extension)
    }
}

pub(crate) fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

fn strip_assets_dir(directory: &str) -> &str {
    if directory == ASSETS_DIR {
        return "";
    }
    directory
        .strip_prefix(ASSETS_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(directory)
}

/// Split `name.ext` at the last dot. A leading dot does not start an extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(i) if i > 0 => (&file_name[..i], &file_name[i + 1..]),
        _ => (file_name, ""),
    }
}
