//! Accessor resolution: typed, non-owning views into the binary payload.
//!
//! An accessor names a buffer view, an element count and an element type.
//! Resolving it yields an [`AccessorView`] borrowing the payload bytes; nothing
//! is copied until an element is read. An absent accessor resolves to an
//! empty view so callers can substitute defaults.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use bytemuck::Pod;

use super::document::{DocAccessor, Document};
use super::error::GltfError;

/// Component type codes used by accessors.
pub mod component {
    pub const BYTE: u32 = 5120;
    pub const UNSIGNED_BYTE: u32 = 5121;
    pub const SHORT: u32 = 5122;
    pub const UNSIGNED_SHORT: u32 = 5123;
    pub const UNSIGNED_INT: u32 = 5125;
    pub const FLOAT: u32 = 5126;
}

/// Size in bytes of one component.
fn component_size(component_type: u32) -> Option<usize> {
    match component_type {
        component::BYTE | component::UNSIGNED_BYTE => Some(1),
        component::SHORT | component::UNSIGNED_SHORT => Some(2),
        component::UNSIGNED_INT | component::FLOAT => Some(4),
        _ => None,
    }
}

/// Number of components for an accessor type string.
fn component_count(ty: &str) -> Option<usize> {
    match ty {
        "SCALAR" => Some(1),
        "VEC2" => Some(2),
        "VEC3" => Some(3),
        "VEC4" => Some(4),
        "MAT2" => Some(4),
        "MAT3" => Some(9),
        "MAT4" => Some(16),
        _ => None,
    }
}

fn element_size(accessor: &DocAccessor) -> Result<usize, GltfError> {
    let size = component_size(accessor.component_type).ok_or_else(|| {
        GltfError::format(format!(
            "unknown accessor component type {}",
            accessor.component_type
        ))
    })?;
    let count = component_count(&accessor.ty)
        .ok_or_else(|| GltfError::format(format!("unknown accessor type {:?}", accessor.ty)))?;
    Ok(size * count)
}

fn view_end(view_index: usize, offset: usize, length: usize) -> Result<usize, GltfError> {
    offset.checked_add(length).ok_or_else(|| {
        GltfError::format(format!("buffer view {view_index}: byte range overflows"))
    })
}

/// A typed, strided, non-owning view over accessor data.
///
/// Element reads are unaligned, so the view works regardless of how the
/// payload happens to be aligned in memory.
#[derive(Debug, Clone, Copy)]
pub struct AccessorView<'a, T> {
    bytes: &'a [u8],
    count: usize,
    stride: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> AccessorView<'a, T> {
    /// A view with no elements, standing for an absent attribute.
    pub fn empty() -> Self {
        Self {
            bytes: &[],
            count: 0,
            stride: std::mem::size_of::<T>(),
            _marker: PhantomData,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the view has no elements (attribute absent or zero count).
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Distance in bytes between consecutive elements.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Read element `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.count {
            return None;
        }
        let start = index * self.stride;
        let end = start + std::mem::size_of::<T>();
        Some(bytemuck::pod_read_unaligned(&self.bytes[start..end]))
    }

    /// Read element `index`, or `default` when the view is too short.
    pub fn get_or(&self, index: usize, default: T) -> T {
        self.get(index).unwrap_or(default)
    }

    /// Iterate over all elements.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.count).filter_map(move |i| self.get(i))
    }
}

/// Resolves accessor indices against a document and its binary payload.
#[derive(Debug, Clone, Copy)]
pub struct AccessorResolver<'a> {
    doc: &'a Document,
    binary: &'a [u8],
}

impl<'a> AccessorResolver<'a> {
    pub fn new(doc: &'a Document, binary: &'a [u8]) -> Self {
        Self { doc, binary }
    }

    fn accessor(&self, index: usize) -> Result<&'a DocAccessor, GltfError> {
        self.doc.accessors.get(index).ok_or_else(|| {
            GltfError::format(format!(
                "accessor index {index} out of range ({} accessors)",
                self.doc.accessors.len()
            ))
        })
    }

    /// Component type of an accessor.
    pub fn component_type(&self, index: usize) -> Result<u32, GltfError> {
        Ok(self.accessor(index)?.component_type)
    }

    /// Resolve an optional accessor into a typed view.
    ///
    /// `None` yields an empty view. Requesting a `T` wider than the declared
    /// element is a format error, as is a window that falls outside the
    /// buffer view or the binary payload.
    pub fn view<T: Pod>(&self, index: Option<usize>) -> Result<AccessorView<'a, T>, GltfError> {
        let Some(index) = index else {
            return Ok(AccessorView::empty());
        };
        let accessor = self.accessor(index)?;
        let elem = element_size(accessor)?;
        let wanted = std::mem::size_of::<T>();
        if wanted > elem {
            return Err(GltfError::format(format!(
                "accessor {index}: requested {wanted}-byte elements but the accessor declares {elem}"
            )));
        }

        let Some(view_index) = accessor.buffer_view else {
            log::warn!("Accessor {index} has no buffer view, treating as absent");
            return Ok(AccessorView::empty());
        };
        if accessor.count == 0 {
            return Ok(AccessorView::empty());
        }

        let view = self.doc.buffer_views.get(view_index).ok_or_else(|| {
            GltfError::format(format!(
                "accessor {index}: buffer view {view_index} out of range"
            ))
        })?;
        let stride = view.byte_stride.unwrap_or(elem);
        if stride < elem {
            return Err(GltfError::format(format!(
                "accessor {index}: stride {stride} is smaller than element size {elem}"
            )));
        }

        let overflow = || GltfError::format(format!("accessor {index}: byte range overflows"));
        let span = (accessor.count - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(wanted))
            .ok_or_else(overflow)?;
        let accessor_end = accessor.byte_offset.checked_add(span).ok_or_else(overflow)?;
        if accessor_end > view.byte_length {
            return Err(GltfError::format(format!(
                "accessor {index}: {span} bytes at offset {} exceed buffer view {view_index} ({} bytes)",
                accessor.byte_offset, view.byte_length
            )));
        }
        let view_end = view_end(view_index, view.byte_offset, view.byte_length)?;
        if view_end > self.binary.len() {
            return Err(GltfError::format(format!(
                "buffer view {view_index} ends at {view_end}, past the {}-byte payload",
                self.binary.len()
            )));
        }

        // Both additions are bounded by view_end, which did not overflow.
        let start = view.byte_offset + accessor.byte_offset;
        Ok(AccessorView {
            bytes: &self.binary[start..start + span],
            count: accessor.count,
            stride,
            _marker: PhantomData,
        })
    }

    /// Resolve a named attribute of a primitive; absent names give an empty view.
    pub fn attribute<T: Pod>(
        &self,
        attributes: &BTreeMap<String, usize>,
        name: &str,
    ) -> Result<AccessorView<'a, T>, GltfError> {
        self.view(attributes.get(name).copied())
    }

    /// Raw bytes of a buffer view (used for embedded images).
    pub fn buffer_view_bytes(&self, view_index: usize) -> Result<&'a [u8], GltfError> {
        let view = self.doc.buffer_views.get(view_index).ok_or_else(|| {
            GltfError::format(format!("buffer view {view_index} out of range"))
        })?;
        let end = view_end(view_index, view.byte_offset, view.byte_length)?;
        self.binary
            .get(view.byte_offset..end)
            .ok_or_else(|| {
                GltfError::format(format!(
                    "buffer view {view_index} exceeds the {}-byte payload",
                    self.binary.len()
                ))
            })
    }

    /// Read an index accessor, widening any unsigned component type to `u32`.
    pub fn indices(&self, index: Option<usize>) -> Result<Option<Vec<u32>>, GltfError> {
        let Some(i) = index else {
            return Ok(None);
        };
        let out = match self.component_type(i)? {
            component::UNSIGNED_BYTE => self.view::<u8>(index)?.iter().map(u32::from).collect(),
            component::UNSIGNED_SHORT => self.view::<u16>(index)?.iter().map(u32::from).collect(),
            component::UNSIGNED_INT => self.view::<u32>(index)?.iter().collect(),
            other => {
                return Err(GltfError::format(format!(
                    "accessor {i}: component type {other} is not valid for indices"
                )))
            }
        };
        Ok(Some(out))
    }

    /// Read a `JOINTS_n` attribute, widening to `[u32; 4]`.
    pub fn joints(
        &self,
        attributes: &BTreeMap<String, usize>,
        name: &str,
    ) -> Result<Vec<[u32; 4]>, GltfError> {
        let Some(&i) = attributes.get(name) else {
            return Ok(Vec::new());
        };
        let widen = |j: [u16; 4]| j.map(u32::from);
        Ok(match self.component_type(i)? {
            component::UNSIGNED_BYTE => self
                .view::<[u8; 4]>(Some(i))?
                .iter()
                .map(|j| j.map(u32::from))
                .collect(),
            component::UNSIGNED_SHORT => self.view::<[u16; 4]>(Some(i))?.iter().map(widen).collect(),
            component::UNSIGNED_INT => self.view::<[u32; 4]>(Some(i))?.iter().collect(),
            other => {
                return Err(GltfError::format(format!(
                    "accessor {i}: component type {other} is not valid for joints"
                )))
            }
        })
    }

    /// Read a `WEIGHTS_n` attribute as floats, denormalizing integer storage.
    pub fn weights(
        &self,
        attributes: &BTreeMap<String, usize>,
        name: &str,
    ) -> Result<Vec<[f32; 4]>, GltfError> {
        let Some(&i) = attributes.get(name) else {
            return Ok(Vec::new());
        };
        Ok(match self.component_type(i)? {
            component::FLOAT => self.view::<[f32; 4]>(Some(i))?.iter().collect(),
            component::UNSIGNED_BYTE => self
                .view::<[u8; 4]>(Some(i))?
                .iter()
                .map(|w| w.map(|c| f32::from(c) / 255.0))
                .collect(),
            component::UNSIGNED_SHORT => self
                .view::<[u16; 4]>(Some(i))?
                .iter()
                .map(|w| w.map(|c| f32::from(c) / 65535.0))
                .collect(),
            other => {
                return Err(GltfError::format(format!(
                    "accessor {i}: component type {other} is not valid for weights"
                )))
            }
        })
    }
}
