//! OBJ subset parser producing one packed vertex buffer with named segments.
//!
//! Recognized directives: `o`, `v`, `vt`, `vn` and triangular `f` with
//! `position/texcoord/normal` references. Everything else is skipped.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use corelib::{GeometryError, GeometryResult};

use crate::mesh::{MeshSegment, MeshVertex, ParsedModel};

/// Minimum vertices for a segment or a whole model.
const MIN_VERTICES: usize = 3;

/// Load an OBJ model from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> GeometryResult<ParsedModel> {
    let file = File::open(path)?;
    parse_obj(BufReader::new(file))
}

/// Load an OBJ model from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> GeometryResult<ParsedModel> {
    parse_obj(reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> GeometryResult<ParsedModel> {
    parse_obj(io::Cursor::new(contents))
}

/// Single forward pass over `reader`. On error nothing is returned but the error.
pub fn parse_obj<R: BufRead>(reader: R) -> GeometryResult<ParsedModel> {
    let mut state = ParseState::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        // Editors on Windows often prefix the file with a UTF-8 byte order mark.
        let text = match index {
            0 => line.strip_prefix('\u{feff}').unwrap_or(&line),
            _ => &line,
        };
        state.line(text, index + 1)?;
    }

    state.finish()
}

#[derive(Default)]
struct ParseState {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,

    vertices: Vec<MeshVertex>,
    segments: Vec<MeshSegment>,

    segment_name: String,
    segment_start: usize,

    has_non_triangular_faces: bool,
}

impl ParseState {
    fn line(&mut self, line: &str, line_no: usize) -> GeometryResult<()> {
        let mut parts = line.split_whitespace();
        let Some(tag) = parts.next() else {
            return Ok(());
        };

        match tag {
            "o" => {
                if let Some(name) = parts.next() {
                    self.close_segment();
                    self.segment_name = name.to_string();
                    self.segment_start = self.vertices.len();
                }
            }
            "v" => {
                if let Some(position) = parse_components(parts, line_no)? {
                    self.positions.push(position);
                }
            }
            "vt" => {
                if let Some(uv) = parse_components(parts, line_no)? {
                    self.texcoords.push(uv);
                }
            }
            "vn" => {
                if let Some(normal) = parse_components(parts, line_no)? {
                    self.normals.push(normal);
                }
            }
            "f" => {
                let corners: Vec<&str> = parts.collect();
                if corners.len() != 3 {
                    log::debug!(
                        "Skipping face with {} corners on line {line_no}",
                        corners.len()
                    );
                    self.has_non_triangular_faces = true;
                    return Ok(());
                }
                for corner in corners {
                    let vertex = self.resolve_corner(corner, line_no)?;
                    self.vertices.push(vertex);
                }
            }
            _ => {
                // Ignore other directives (g/s/usemtl/mtllib/comments/etc.)
            }
        }

        Ok(())
    }

    /// Record the open segment if it is named and holds at least one triangle.
    fn close_segment(&mut self) {
        let end = self.vertices.len();
        if self.segment_name.is_empty() || end - self.segment_start < MIN_VERTICES {
            return;
        }
        let name = std::mem::take(&mut self.segment_name);
        self.segments
            .push(MeshSegment::new(name, self.segment_start, end));
        self.segment_start = end;
    }

    fn resolve_corner(&self, corner: &str, line_no: usize) -> GeometryResult<MeshVertex> {
        let malformed = |reason: String| GeometryError::MalformedFace {
            line: line_no,
            reference: corner.to_string(),
            reason,
        };

        let fields: Vec<&str> = corner.split('/').collect();
        let [pos, tex, norm] = fields.as_slice() else {
            return Err(malformed(
                "expected position/texcoord/normal indices".to_string(),
            ));
        };

        let pi = resolve_index(pos, self.positions.len(), "position").map_err(&malformed)?;
        let ti = resolve_index(tex, self.texcoords.len(), "texture coordinate")
            .map_err(&malformed)?;
        let ni = resolve_index(norm, self.normals.len(), "normal").map_err(&malformed)?;

        let position = self.positions[pi];
        let [u, v] = self.texcoords[ti];
        let normal = self.normals[ni];

        // OBJ puts the texture origin bottom-left; the buffer expects top-left.
        Ok(MeshVertex::new(position, [u, 1.0 - v], normal))
    }

    fn finish(mut self) -> GeometryResult<ParsedModel> {
        self.close_segment();

        if self.vertices.len() < MIN_VERTICES {
            return Err(GeometryError::InsufficientGeometry {
                vertices: self.vertices.len(),
            });
        }
        if self.segments.is_empty() {
            return Err(GeometryError::EmptyModel);
        }
        if self.has_non_triangular_faces {
            log::debug!("Model contained non triangular faces; they were skipped");
        }

        Ok(ParsedModel::new(
            self.vertices,
            self.segments,
            self.has_non_triangular_faces,
        ))
    }
}

/// Parse the first `N` components. Returns `None` when fewer than `N` are present.
fn parse_components<'a, const N: usize>(
    parts: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> GeometryResult<Option<[f32; N]>> {
    let tokens: Vec<&str> = parts.take(N).collect();
    if tokens.len() < N {
        return Ok(None);
    }

    let mut out = [0.0f32; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token.parse().map_err(|_| GeometryError::InvalidNumber {
            line: line_no,
            token: token.to_string(),
        })?;
    }
    Ok(Some(out))
}

/// Resolve a 1-based (or negative, end-relative) OBJ index into `0..len`.
fn resolve_index(token: &str, len: usize, what: &str) -> Result<usize, String> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| format!("invalid {what} index '{token}'"))?;
    if raw == 0 {
        return Err(format!("{what} indices are 1-based; found 0"));
    }

    let idx = if raw > 0 {
        usize::try_from(raw - 1).ok()
    } else {
        usize::try_from(raw.unsigned_abs())
            .ok()
            .and_then(|back| len.checked_sub(back))
    };

    match idx {
        Some(idx) if idx < len => Ok(idx),
        _ => Err(format!(
            "{what} index {raw} out of bounds ({len} defined so far)"
        )),
    }
}
