//! Asset identity, grouping and parsers (models, textures).
//!
//! Identities and catalogs turn raw file paths into stable keys; the OBJ
//! parser turns model text into a shared vertex buffer with named segments.

pub mod alias;
pub mod catalog;
pub mod identity;
pub mod mesh;
pub mod obj;
pub mod ordering;
pub mod texture;

pub use alias::{AliasGroup, group_by};
pub use catalog::{ArrayOrdering, AssetCatalog, AssetEntry, DirectoryGroup, RejectedAsset};
pub use identity::{AssetIdentity, AssetKind};
pub use mesh::{MeshSegment, MeshVertex, ParsedModel};

pub use corelib::{GeometryError, IdentityError, OrderingError};
