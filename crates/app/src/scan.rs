//! Project scanning: discover files, build the catalog, parse models.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use asset::catalog::{BUILD_MANIFEST, project_root_from_manifest};
use asset::obj::load_obj_from_path;
use asset::texture::TextureData;
use asset::{ArrayOrdering, AssetCatalog, AssetEntry, AssetKind, MeshSegment};
use walkdir::WalkDir;

/// All files below `path`, `/`-separated, in a stable order.
pub fn discover(path: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.path().to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(files)
}

/// Explicit root, else the folder holding the build manifest, else the scanned path.
pub fn resolve_root(explicit: Option<&Path>, scanned: &Path, files: &[String]) -> String {
    if let Some(root) = explicit {
        return root.to_string_lossy().replace('\\', "/");
    }
    match project_root_from_manifest(files) {
        Some(root) => root,
        None => {
            log::warn!(
                "No {BUILD_MANIFEST} found; using {} as project root",
                scanned.display()
            );
            scanned.to_string_lossy().replace('\\', "/")
        }
    }
}

#[derive(Debug)]
pub struct ModelReport {
    pub reference_path: String,
    pub outcome: Result<ModelStats, String>,
}

#[derive(Debug)]
pub struct ModelStats {
    pub vertices: usize,
    pub segments: Vec<MeshSegment>,
    pub has_non_triangular_faces: bool,
}

#[derive(Debug)]
pub struct TextureReport {
    pub reference_path: String,
    pub outcome: Result<(u32, u32), String>,
}

#[derive(Debug)]
pub struct ScanReport {
    pub root: String,
    pub catalog: AssetCatalog,
    pub models: Vec<ModelReport>,
    pub textures: Vec<TextureReport>,
}

impl ScanReport {
    /// Assets that failed identity resolution, parsing or decoding.
    pub fn failures(&self) -> usize {
        self.catalog.rejected().len()
            + self.models.iter().filter(|m| m.outcome.is_err()).count()
            + self.textures.iter().filter(|t| t.outcome.is_err()).count()
    }
}

/// Build the catalog for `files` and process each asset independently.
pub fn scan(root: &str, files: &[String], probe_textures: bool) -> ScanReport {
    let catalog = AssetCatalog::build(root, files);
    for rejected in catalog.rejected() {
        log::error!("{}", rejected.error);
    }

    let models = catalog
        .identities(AssetKind::Model)
        .map(|identity| {
            let path = identity.raw_path();
            let outcome = load_obj_from_path(path)
                .with_context(|| format!("Failed to parse model {path}"))
                .map(|model| {
                    if model.has_non_triangular_faces() {
                        log::warn!("{path}: non triangular faces were skipped");
                    }
                    let (vertices, segments, has_non_triangular_faces) = model.into_parts();
                    ModelStats {
                        vertices: vertices.len(),
                        segments,
                        has_non_triangular_faces,
                    }
                })
                .map_err(|err| {
                    log::error!("{err:#}");
                    format!("{err:#}")
                });
            ModelReport {
                reference_path: identity.reference_path().to_string(),
                outcome,
            }
        })
        .collect();

    let textures = if probe_textures {
        catalog
            .identities(AssetKind::Texture)
            .map(|identity| {
                let outcome = TextureData::load_png(identity.raw_path())
                    .and_then(|tex| {
                        anyhow::ensure!(
                            tex.is_valid(),
                            "Texture {} has no usable pixels ({}x{})",
                            identity.raw_path(),
                            tex.width,
                            tex.height
                        );
                        Ok((tex.width, tex.height))
                    })
                    .map_err(|err| {
                        log::error!("{err:#}");
                        format!("{err:#}")
                    });
                TextureReport {
                    reference_path: identity.reference_path().to_string(),
                    outcome,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    ScanReport {
        root: root.to_string(),
        catalog,
        models,
        textures,
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root: {}", self.root)?;

        for kind in self.catalog.kinds() {
            for group in self.catalog.groups(kind) {
                let directory = if group.directory.is_empty() {
                    "<root>"
                } else {
                    group.directory.as_str()
                };
                writeln!(f, "[{kind:?}] {directory}")?;
                for entry in &group.entries {
                    write_entry(f, entry)?;
                }
            }
        }

        for model in &self.models {
            match &model.outcome {
                Ok(stats) => {
                    write!(
                        f,
                        "model {}: {} vertices",
                        model.reference_path, stats.vertices
                    )?;
                    if stats.has_non_triangular_faces {
                        write!(f, " (non triangular faces skipped)")?;
                    }
                    writeln!(f)?;
                    for segment in &stats.segments {
                        writeln!(
                            f,
                            "  {} {}..{}",
                            segment.name, segment.start_index, segment.end_index
                        )?;
                    }
                }
                Err(err) => writeln!(f, "model {}: FAILED {err}", model.reference_path)?,
            }
        }

        for texture in &self.textures {
            match &texture.outcome {
                Ok((w, h)) => writeln!(f, "texture {}: {w}x{h}", texture.reference_path)?,
                Err(err) => writeln!(f, "texture {}: FAILED {err}", texture.reference_path)?,
            }
        }

        for rejected in self.catalog.rejected() {
            writeln!(f, "rejected {}", rejected.path)?;
        }
        Ok(())
    }
}

fn write_entry(f: &mut fmt::Formatter<'_>, entry: &AssetEntry) -> fmt::Result {
    match entry {
        AssetEntry::Single(identity) => {
            writeln!(f, "  {} = {}", entry.name(), identity.reference_path())
        }
        AssetEntry::Array {
            name,
            members,
            ordering,
        } => {
            let order = match ordering {
                ArrayOrdering::Numeric => "numeric",
                ArrayOrdering::InputOrder(_) => "input order",
            };
            writeln!(f, "  {name}[{}] ({order})", members.len())?;
            for member in members {
                writeln!(f, "    {}", member.reference_path())?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TRIANGLE: &str = "\
o Tri
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("MyMod");
        let write = |rel: &str, contents: &[u8]| {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        };
        write("build.txt", b"displayName = My Mod\n");
        write("Assets/Textures/Leaf10.png", b"");
        write("Assets/Textures/Leaf2.png", b"");
        write("Assets/Textures/Leaf1.png", b"");
        write("Assets/Models/Tri.obj", TRIANGLE.as_bytes());
        write("Assets/Models/Broken.obj", b"o Broken\nv 0 0 0\nf 1/1/1 1/1/1 2/1/1\n");
        write("Source/Readme.md", b"# notes");
        dir
    }

    #[test]
    fn root_comes_from_manifest() {
        let dir = project();
        let files = discover(dir.path()).unwrap();
        let root = resolve_root(None, dir.path(), &files);
        assert!(root.ends_with("/MyMod"), "{root}");

        let explicit = resolve_root(Some(Path::new(r"C:\Mods\X")), dir.path(), &files);
        assert_eq!(explicit, "C:/Mods/X");
    }

    #[test]
    fn scan_isolates_broken_models() {
        let dir = project();
        let files = discover(dir.path()).unwrap();
        let root = resolve_root(None, dir.path(), &files);
        let report = scan(&root, &files, false);

        assert_eq!(report.models.len(), 2);
        let broken = report
            .models
            .iter()
            .find(|m| m.reference_path == "MyMod/Assets/Models/Broken")
            .unwrap();
        assert!(broken.outcome.is_err());

        let tri = report
            .models
            .iter()
            .find(|m| m.reference_path == "MyMod/Assets/Models/Tri")
            .unwrap();
        let stats = tri.outcome.as_ref().unwrap();
        assert_eq!(stats.vertices, 3);
        assert_eq!(stats.segments, [MeshSegment::new("Tri", 0, 3)]);
        assert_eq!(report.failures(), 1);

        let text = report.to_string();
        assert!(text.contains("Leaf[3] (numeric)"), "{text}");
        let leaf1 = text.find("MyMod/Assets/Textures/Leaf1\n").unwrap();
        let leaf2 = text.find("MyMod/Assets/Textures/Leaf2\n").unwrap();
        let leaf10 = text.find("MyMod/Assets/Textures/Leaf10\n").unwrap();
        assert!(leaf1 < leaf2 && leaf2 < leaf10, "{text}");
        assert!(text.contains("  Tri 0..3"), "{text}");
    }

    #[test]
    fn texture_probing_reports_per_file() {
        let dir = project();
        let files = discover(dir.path()).unwrap();
        let root = resolve_root(None, dir.path(), &files);
        let report = scan(&root, &files, true);

        // The fixture textures are empty files, so each one fails on its own.
        assert_eq!(report.textures.len(), 3);
        assert!(report.textures.iter().all(|t| t.outcome.is_err()));
        assert_eq!(report.failures(), 4);
    }

    #[test]
    fn decoded_textures_report_dimensions() {
        let dir = project();
        let leaf = dir.path().join("MyMod/Assets/Textures/Leaf1.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 128, 0, 255]))
            .save_with_format(&leaf, image::ImageFormat::Png)
            .expect("write png");

        let files = discover(dir.path()).unwrap();
        let root = resolve_root(None, dir.path(), &files);
        let report = scan(&root, &files, true);

        let leaf = report
            .textures
            .iter()
            .find(|t| t.reference_path == "MyMod/Assets/Textures/Leaf1")
            .unwrap();
        assert_eq!(leaf.outcome.as_ref().ok(), Some(&(3, 2)));
        assert_eq!(report.failures(), 3);
        assert!(report.to_string().contains("texture MyMod/Assets/Textures/Leaf1: 3x2"));
    }
}
