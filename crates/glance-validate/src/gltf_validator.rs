//! Built-in glTF 2.0 validator
//!
//! Parsing and schema checks come from the `gltf` crate. On top of that the
//! validator loads buffers and images through the resource loader and checks
//! buffer view and accessor layout, unit-length vectors, animation input
//! ordering and unused meshes. Accessors with a broken layout are reported
//! and never handed to the `gltf` readers.

use crate::validator::Validator;
use base64::Engine;
use glance_asset::ResourceLoader;
use glance_core::{Issues, Message, RawReport, ReportInfo, Resource, Result, Severity};
use gltf::accessor::{DataType, Dimensions};
use gltf::buffer::View;
use gltf::json::validation::Error as SchemaError;
use gltf::mesh::Mode;
use gltf::{Document, Semantic};
use std::collections::HashSet;

/// Allowed deviation from 1.0 for normal and tangent lengths
pub const UNIT_LENGTH_TOLERANCE: f32 = 0.0005;

const VALIDATOR_VERSION: &str = concat!("glance ", env!("CARGO_PKG_VERSION"));

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Validator built on the `gltf` crate
#[derive(Debug, Clone)]
pub struct GltfValidator {
    tolerance: f32,
}

impl Default for GltfValidator {
    fn default() -> Self {
        Self {
            tolerance: UNIT_LENGTH_TOLERANCE,
        }
    }
}

impl GltfValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Validator for GltfValidator {
    async fn validate_bytes<L: ResourceLoader>(&self, bytes: &[u8], loader: &L) -> Result<RawReport> {
        let mime_type = if bytes.starts_with(b"glTF") {
            "model/gltf-binary"
        } else {
            "model/gltf+json"
        };
        let mut report = RawReport {
            mime_type: Some(mime_type.to_string()),
            validator_version: Some(VALIDATOR_VERSION.to_string()),
            ..Default::default()
        };

        let gltf = match gltf::Gltf::from_slice(bytes) {
            Ok(gltf) => gltf,
            Err(gltf::Error::Validation(errors)) => {
                log::debug!("Schema validation reported {} error(s)", errors.len());
                let messages = errors
                    .iter()
                    .map(|(path, error)| schema_message(path.as_str(), error))
                    .collect();
                report.issues = Issues::from_messages(messages);
                return Ok(report);
            }
            Err(e) => {
                log::debug!("Failed to parse glTF: {}", e);
                report.issues = Issues::from_messages(vec![Message::new(
                    "INVALID_GLTF",
                    "",
                    Severity::Error,
                    e.to_string(),
                )]);
                return Ok(report);
            }
        };

        let gltf::Gltf { document, blob } = gltf;
        let mut messages = Vec::new();
        let mut resources = Vec::new();

        let buffers = load_buffers(&document, blob, loader, &mut messages, &mut resources).await?;
        check_images(&document, &buffers, loader, &mut messages, &mut resources).await?;
        check_layout(&document, &mut messages);
        check_unit_vectors(&document, &buffers, self.tolerance, &mut messages);
        check_animation_inputs(&document, &buffers, &mut messages);
        check_unused_meshes(&document, &mut messages);

        report.info = collect_info(&document, resources);
        report.issues = Issues::from_messages(messages);
        Ok(report)
    }
}

fn schema_message(path: &str, error: &SchemaError) -> Message {
    #[allow(unreachable_patterns)]
    let code = match error {
        SchemaError::IndexOutOfBounds => "UNRESOLVED_REFERENCE",
        SchemaError::Invalid => "INVALID_VALUE",
        SchemaError::Missing => "UNDEFINED_PROPERTY",
        SchemaError::Unsupported => "UNSUPPORTED_EXTENSION",
        _ => "INVALID_VALUE",
    };
    Message::new(code, json_pointer(path), Severity::Error, format!("{}: {}", error, path))
}

/// Convert a `gltf` path such as `meshes[0].attributes["NORMAL"]` to a JSON pointer
fn json_pointer(path: &str) -> String {
    let mut pointer = String::new();
    for segment in path.split(['.', '[']) {
        let segment = segment.trim_end_matches(']').trim_matches('"');
        if segment.is_empty() {
            continue;
        }
        pointer.push('/');
        pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
    pointer
}

/// Decode a base64 `data:` URI; `None` when it is not base64 or malformed
fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let (header, data) = uri.strip_prefix("data:")?.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    base64::engine::general_purpose::STANDARD.decode(data).ok()
}

fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PNG_MAGIC) {
        Some("image/png")
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some("image/jpeg")
    } else {
        None
    }
}

/// Load every buffer; entries are `None` when their data is unusable
async fn load_buffers<L: ResourceLoader>(
    document: &Document,
    mut blob: Option<Vec<u8>>,
    loader: &L,
    messages: &mut Vec<Message>,
    resources: &mut Vec<Resource>,
) -> Result<Vec<Option<Vec<u8>>>> {
    let mut buffers = Vec::new();

    for buffer in document.buffers() {
        let pointer = format!("/buffers/{}", buffer.index());
        let declared = buffer.length();

        let (data, storage, uri) = match buffer.source() {
            gltf::buffer::Source::Bin => {
                if blob.is_none() {
                    messages.push(Message::new(
                        "BUFFER_MISSING_GLB_DATA",
                        &pointer,
                        Severity::Error,
                        "Buffer refers to an unresolved GLB binary chunk.",
                    ));
                }
                (blob.take(), "glb", None)
            }
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                let data = decode_data_uri(uri);
                if data.is_none() {
                    messages.push(Message::new(
                        "INVALID_URI",
                        &pointer,
                        Severity::Error,
                        "Buffer data URI could not be decoded.",
                    ));
                }
                (data, "data-uri", None)
            }
            gltf::buffer::Source::Uri(uri) => {
                log::debug!("Loading buffer {} from '{}'", buffer.index(), uri);
                let data = loader.load(uri).await?;
                (Some(data), "external", Some(uri.to_string()))
            }
        };

        let data = match data {
            Some(data) if data.len() < declared => {
                messages.push(Message::new(
                    "BUFFER_EXTERNAL_BYTELENGTH_MISMATCH",
                    &pointer,
                    Severity::Error,
                    format!(
                        "Actual data length {} is less than the declared buffer byteLength {}.",
                        data.len(),
                        declared
                    ),
                ));
                None
            }
            other => other,
        };

        resources.push(Resource {
            pointer,
            storage: storage.to_string(),
            mime_type: Some("application/gltf-buffer".to_string()),
            uri,
            byte_length: Some(declared as u64),
        });
        buffers.push(data);
    }

    Ok(buffers)
}

async fn check_images<L: ResourceLoader>(
    document: &Document,
    buffers: &[Option<Vec<u8>>],
    loader: &L,
    messages: &mut Vec<Message>,
    resources: &mut Vec<Resource>,
) -> Result<()> {
    for image in document.images() {
        let pointer = format!("/images/{}", image.index());

        let (data, storage, uri, declared_mime) = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let data = buffers
                    .get(view.buffer().index())
                    .and_then(|b| b.as_deref())
                    .zip(view_end(&view))
                    .and_then(|(b, end)| b.get(view.offset()..end))
                    .map(|b| b.to_vec());
                (data, "buffer-view", None, Some(mime_type))
            }
            gltf::image::Source::Uri { uri, mime_type } if uri.starts_with("data:") => {
                (decode_data_uri(uri), "data-uri", None, mime_type)
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                log::debug!("Loading image {} from '{}'", image.index(), uri);
                let data = loader.load(uri).await?;
                (Some(data), "external", Some(uri.to_string()), mime_type)
            }
        };

        let detected = data.as_deref().and_then(detect_image_mime);
        if data.is_some() && detected.is_none() {
            messages.push(Message::new(
                "IMAGE_UNRECOGNIZED_FORMAT",
                &pointer,
                Severity::Warning,
                "Image format not recognized.",
            ));
        }

        resources.push(Resource {
            pointer,
            storage: storage.to_string(),
            mime_type: detected.or(declared_mime).map(str::to_string),
            uri,
            byte_length: data.as_ref().map(|d| d.len() as u64),
        });
    }

    Ok(())
}

fn view_end(view: &View) -> Option<usize> {
    view.offset().checked_add(view.length())
}

fn view_fits(view: &View) -> bool {
    view_end(view).is_some_and(|end| end <= view.buffer().length())
}

/// Report buffer views that overrun their buffer and accessors that overrun their views
fn check_layout(document: &Document, messages: &mut Vec<Message>) {
    for view in document.views() {
        if !view_fits(&view) {
            messages.push(Message::new(
                "BUFFER_VIEW_TOO_LONG",
                format!("/bufferViews/{}", view.index()),
                Severity::Error,
                format!(
                    "BufferView does not fit buffer ({}) byteLength ({}).",
                    view.buffer().index(),
                    view.buffer().length()
                ),
            ));
        }
    }

    messages.extend(document.accessors().filter_map(|accessor| accessor_issue(&accessor)));
}

/// First layout problem of an accessor, including its sparse storage
fn accessor_issue(accessor: &gltf::Accessor) -> Option<Message> {
    let pointer = format!("/accessors/{}", accessor.index());
    let size = accessor.size();

    if accessor.count() == 0 {
        return Some(Message::new(
            "VALUE_NOT_IN_RANGE",
            format!("{}/count", pointer),
            Severity::Error,
            "Value 0 is out of range.",
        ));
    }

    if let Some(view) = accessor.view() {
        if let Some(message) = span_issue(&view, accessor.offset(), accessor.count(), size, &pointer) {
            return Some(message);
        }
    }

    let sparse = accessor.sparse()?;
    let sparse_pointer = format!("{}/sparse", pointer);
    if sparse.count() == 0 {
        return Some(Message::new(
            "VALUE_NOT_IN_RANGE",
            format!("{}/count", sparse_pointer),
            Severity::Error,
            "Value 0 is out of range.",
        ));
    }

    let indices = sparse.indices();
    let values = sparse.values();
    span_issue(
        &indices.view(),
        indices.offset(),
        sparse.count(),
        indices.index_type().size(),
        &format!("{}/indices", sparse_pointer),
    )
    .or_else(|| {
        span_issue(
            &values.view(),
            values.offset(),
            sparse.count(),
            size,
            &format!("{}/values", sparse_pointer),
        )
    })
}

/// Check `count` elements of `size` bytes starting at `offset` inside `view`; `count` is non-zero
fn span_issue(view: &View, offset: usize, count: usize, size: usize, pointer: &str) -> Option<Message> {
    let stride = view.stride().unwrap_or(size);
    if stride < size {
        return Some(Message::new(
            "ACCESSOR_SMALL_BYTESTRIDE",
            pointer,
            Severity::Error,
            format!(
                "Referenced bufferView's byteStride value {} is less than accessor element's length {}.",
                stride, size
            ),
        ));
    }

    let end = stride
        .checked_mul(count - 1)
        .and_then(|n| n.checked_add(offset))
        .and_then(|n| n.checked_add(size));
    match end {
        Some(end) if end <= view.length() => None,
        _ => Some(Message::new(
            "ACCESSOR_TOO_LONG",
            pointer,
            Severity::Error,
            format!(
                "Accessor (offset: {}, count: {}) does not fit referenced bufferView [{}] length {}.",
                offset,
                count,
                view.index(),
                view.length()
            ),
        )),
    }
}

/// Whether the `gltf` readers can iterate `accessor` safely
fn is_readable(accessor: &gltf::Accessor) -> bool {
    let mut views: Vec<View> = accessor.view().into_iter().collect();
    if let Some(sparse) = accessor.sparse() {
        views.push(sparse.indices().view());
        views.push(sparse.values().view());
    }
    accessor_issue(accessor).is_none() && views.iter().all(view_fits)
}

fn is_float(accessor: &gltf::Accessor, dimensions: Dimensions) -> bool {
    accessor.data_type() == DataType::F32 && accessor.dimensions() == dimensions
}

fn check_unit_vectors(
    document: &Document,
    buffers: &[Option<Vec<u8>>],
    tolerance: f32,
    messages: &mut Vec<Message>,
) {
    let mut checked = HashSet::new();

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).and_then(|b| b.as_deref()));

            if let Some(accessor) = primitive.get(&Semantic::Normals) {
                if is_float(&accessor, Dimensions::Vec3)
                    && is_readable(&accessor)
                    && checked.insert(accessor.index())
                {
                    if let Some(normals) = reader.read_normals() {
                        let lengths = normals.map(|[x, y, z]| (x * x + y * y + z * z).sqrt());
                        push_non_unit(accessor.index(), lengths, tolerance, messages);
                    }
                }
            }

            if let Some(accessor) = primitive.get(&Semantic::Tangents) {
                if is_float(&accessor, Dimensions::Vec4)
                    && is_readable(&accessor)
                    && checked.insert(accessor.index())
                {
                    if let Some(tangents) = reader.read_tangents() {
                        let lengths = tangents.map(|[x, y, z, _]| (x * x + y * y + z * z).sqrt());
                        push_non_unit(accessor.index(), lengths, tolerance, messages);
                    }
                }
            }
        }
    }
}

fn push_non_unit(
    index: usize,
    lengths: impl Iterator<Item = f32>,
    tolerance: f32,
    messages: &mut Vec<Message>,
) {
    for (element, length) in lengths.enumerate() {
        if (length - 1.0).abs() > tolerance {
            messages.push(Message::new(
                "ACCESSOR_NON_UNIT",
                format!("/accessors/{}", index),
                Severity::Error,
                format!(
                    "Accessor element at index {} is not of unit length: {}.",
                    element, length
                ),
            ));
        }
    }
}

fn check_animation_inputs(document: &Document, buffers: &[Option<Vec<u8>>], messages: &mut Vec<Message>) {
    let mut checked = HashSet::new();

    for animation in document.animations() {
        for channel in animation.channels() {
            let input = channel.sampler().input();
            if !is_float(&input, Dimensions::Scalar)
                || !is_readable(&input)
                || !checked.insert(input.index())
            {
                continue;
            }

            let reader = channel.reader(|buffer| buffers.get(buffer.index()).and_then(|b| b.as_deref()));
            let Some(inputs) = reader.read_inputs() else {
                continue;
            };

            let mut previous: Option<f32> = None;
            for (element, value) in inputs.enumerate() {
                if let Some(prev) = previous {
                    if value <= prev {
                        messages.push(Message::new(
                            "ACCESSOR_ANIMATION_INPUT_NON_INCREASING",
                            format!("/accessors/{}", input.index()),
                            Severity::Error,
                            format!(
                                "Animation input accessor element at index {} is less than or equal to previous: {} <= {}.",
                                element, value, prev
                            ),
                        ));
                    }
                }
                previous = Some(value);
            }
        }
    }
}

fn check_unused_meshes(document: &Document, messages: &mut Vec<Message>) {
    let used: HashSet<usize> = document
        .nodes()
        .filter_map(|node| node.mesh().map(|mesh| mesh.index()))
        .collect();

    for mesh in document.meshes() {
        if !used.contains(&mesh.index()) {
            messages.push(Message::new(
                "UNUSED_OBJECT",
                format!("/meshes/{}", mesh.index()),
                Severity::Hint,
                "This object may be unused.",
            ));
        }
    }
}

fn collect_info(document: &Document, resources: Vec<Resource>) -> ReportInfo {
    let root = document.as_json();

    let mut draw_calls = 0u64;
    let mut vertices = 0u64;
    let mut triangles = 0u64;
    for node in document.nodes() {
        let Some(mesh) = node.mesh() else { continue };
        for primitive in mesh.primitives() {
            draw_calls += 1;
            let vertex_count = primitive
                .get(&Semantic::Positions)
                .map(|a| a.count() as u64)
                .unwrap_or(0);
            let element_count = primitive
                .indices()
                .map(|a| a.count() as u64)
                .unwrap_or(vertex_count);
            vertices += vertex_count;
            triangles += match primitive.mode() {
                Mode::Triangles => element_count / 3,
                Mode::TriangleStrip | Mode::TriangleFan => element_count.saturating_sub(2),
                _ => 0,
            };
        }
    }

    let has_morph_targets = document
        .meshes()
        .flat_map(|mesh| mesh.primitives())
        .any(|primitive| primitive.morph_targets().next().is_some());

    ReportInfo {
        version: Some(root.asset.version.clone()),
        generator: root.asset.generator.clone(),
        resources,
        animation_count: Some(document.animations().count() as u64),
        material_count: Some(document.materials().count() as u64),
        has_morph_targets: Some(has_morph_targets),
        has_skins: Some(document.skins().count() > 0),
        has_textures: Some(document.textures().count() > 0),
        has_default_scene: Some(document.default_scene().is_some()),
        draw_call_count: Some(draw_calls),
        total_vertex_count: Some(vertices),
        total_triangle_count: Some(triangles),
    }
}
