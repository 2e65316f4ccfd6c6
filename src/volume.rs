use crate::anisotropy::generalized_anisotropy;
use crate::enums::AxisKind;
use crate::enums::SpaceFrame;
use crate::error::NormalizeError;
use crate::error::Result;
use crate::key_value::KeyValueStore;
use crate::sample::Sample;

use ndarray::Array3;
use ndarray::Array4;
use ndarray::ArrayD;
use ndarray::ArrayView1;
use ndarray::Axis;
use ndarray::IxDyn;
use ndarray::ShapeBuilder;
use ndarray::Zip;

pub const IDENTITY_FRAME: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Per-axis metadata; the axis size lives in the array shape
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisInfo {
    pub kind: AxisKind,
    pub space_direction: Option<[f64; 3]>,
}

impl AxisInfo {
    pub fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            space_direction: None,
        }
    }

    /// Spatial axis stepping by `direction` in world coordinates
    pub fn space(direction: [f64; 3]) -> Self {
        Self {
            kind: AxisKind::Space,
            space_direction: Some(direction),
        }
    }

    pub fn list() -> Self {
        Self::new(AxisKind::List)
    }
}

/// Diffusion-weighted volume as delivered by the acquisition
///
/// Axis `n` of the metadata describes axis `n` of `data`. Exactly one axis
/// is expected to index the gradient acquisitions, the others are spatial.
#[derive(Debug, Clone)]
pub struct RawVolume<T> {
    pub data: ArrayD<T>,
    pub axes: Vec<AxisInfo>,
    pub space: SpaceFrame,
    pub space_origin: [f64; 3],
    pub measurement_frame: [[f64; 3]; 3],
    pub key_values: KeyValueStore,
    pub content: Option<String>,
}

impl<T: Sample> RawVolume<T> {
    pub fn new(data: ArrayD<T>, axes: Vec<AxisInfo>) -> Self {
        Self {
            data,
            axes,
            space: SpaceFrame::default(),
            space_origin: [0.0; 3],
            measurement_frame: IDENTITY_FRAME,
            key_values: KeyValueStore::new(),
            content: None,
        }
    }

    /// Build a volume from a native-endian sample buffer in which axis 0
    /// varies fastest
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::TypeConversion`] when the buffer length is not
    /// a whole number of samples and [`NormalizeError::Shape`] when the sample
    /// count does not match `shape`.
    pub fn from_raw_bytes(bytes: &[u8], shape: &[usize], axes: Vec<AxisInfo>) -> Result<Self> {
        let width = std::mem::size_of::<T>();
        if bytes.len() % width != 0 {
            return Err(NormalizeError::TypeConversion {
                index: bytes.len() / width,
                reason: format!(
                    "buffer of {} bytes is not a multiple of the {width}-byte sample size",
                    bytes.len()
                ),
            });
        }

        let samples: Vec<T> = bytes
            .chunks_exact(width)
            .map(bytemuck::pod_read_unaligned::<T>)
            .collect();
        let data = ArrayD::from_shape_vec(IxDyn(shape).f(), samples)?;

        Ok(Self::new(data, axes))
    }

    pub fn with_space(mut self, space: SpaceFrame) -> Self {
        self.space = space;
        self
    }

    pub fn with_space_origin(mut self, origin: [f64; 3]) -> Self {
        self.space_origin = origin;
        self
    }

    pub fn with_measurement_frame(mut self, frame: [[f64; 3]; 3]) -> Self {
        self.measurement_frame = frame;
        self
    }

    pub fn with_key_values(mut self, key_values: KeyValueStore) -> Self {
        self.key_values = key_values;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Get the dimensions of the volume
    pub fn dim(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn axis_size(&self, axis: usize) -> Option<usize> {
        self.data.shape().get(axis).copied()
    }
}

/// Baseline-normalized diffusion signal
///
/// Axis 0 indexes the retained non-zero gradients in their original order,
/// axes 1 to 3 are the anatomical axes. Axis 0 varies fastest in memory.
#[derive(Debug, Clone)]
pub struct NormalizedVolume {
    pub data: Array4<f32>,
    pub axes: [AxisInfo; 4],
    pub space: SpaceFrame,
    pub space_origin: [f64; 3],
    pub measurement_frame: [[f64; 3]; 3],
    pub key_values: KeyValueStore,
    pub content: Option<String>,
}

impl NormalizedVolume {
    /// Get the dimensions of the volume (gradients, axis 1, axis 2, axis 3)
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        self.data.dim()
    }

    pub fn gradient_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Normalized signal of every retained gradient at one voxel
    pub fn signal_at(&self, i: usize, j: usize, k: usize) -> Option<ArrayView1<'_, f32>> {
        let (_, size1, size2, size3) = self.dim();
        if i >= size1 || j >= size2 || k >= size3 {
            return None;
        }
        Some(self.data.slice(ndarray::s![.., i, j, k]))
    }

    /// Native-endian samples with axis 0 varying fastest
    pub fn to_raw_bytes(&self) -> Vec<u8> {
        let samples: Vec<f32> = self.data.t().iter().copied().collect();
        bytemuck::cast_slice(&samples).to_vec()
    }

    /// Generalized anisotropy of the normalized signal at every voxel
    pub fn generalized_anisotropy_map(&self) -> Array3<f32> {
        Zip::from(self.data.lanes(Axis(0))).map_collect(generalized_anisotropy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn space_axes() -> Vec<AxisInfo> {
        vec![
            AxisInfo::list(),
            AxisInfo::space([1.0, 0.0, 0.0]),
            AxisInfo::space([0.0, 1.0, 0.0]),
            AxisInfo::space([0.0, 0.0, 1.0]),
        ]
    }

    #[test]
    fn raw_bytes_are_axis_zero_fastest() {
        let samples: [u16; 6] = [1, 2, 3, 4, 5, 6];
        let bytes: &[u8] = bytemuck::cast_slice(&samples);

        let volume = RawVolume::<u16>::from_raw_bytes(bytes, &[2, 3, 1, 1], space_axes()).unwrap();

        assert_eq!(volume.dim(), &[2, 3, 1, 1]);
        assert_eq!(volume.data[[0, 0, 0, 0]], 1);
        assert_eq!(volume.data[[1, 0, 0, 0]], 2);
        assert_eq!(volume.data[[0, 1, 0, 0]], 3);
        assert_eq!(volume.data[[1, 2, 0, 0]], 6);
    }

    #[test]
    fn raw_bytes_accept_unaligned_half_floats() {
        let samples = [f16::from_f32(1.5), f16::from_f32(-2.0)];
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(bytemuck::cast_slice(&samples));

        let volume =
            RawVolume::<f16>::from_raw_bytes(&bytes[1..], &[2, 1, 1, 1], space_axes()).unwrap();
        assert_eq!(volume.data[[1, 0, 0, 0]].to_f32(), -2.0);
    }

    #[test]
    fn raw_bytes_reject_partial_samples() {
        let result = RawVolume::<u16>::from_raw_bytes(&[0, 1, 2], &[1, 1, 1, 1], space_axes());
        assert!(matches!(result, Err(NormalizeError::TypeConversion { .. })));
    }

    #[test]
    fn raw_bytes_reject_wrong_shape() {
        let result = RawVolume::<u8>::from_raw_bytes(&[0, 1, 2], &[2, 2, 1, 1], space_axes());
        assert!(matches!(result, Err(NormalizeError::Shape(_))));
    }

    #[test]
    fn normalized_bytes_follow_memory_convention() {
        let data = Array4::from_shape_fn((2, 2, 1, 1), |(h, i, _, _)| (h + 10 * i) as f32);
        let volume = NormalizedVolume {
            data,
            axes: [AxisInfo::list(); 4],
            space: SpaceFrame::RightAnteriorSuperior,
            space_origin: [0.0; 3],
            measurement_frame: IDENTITY_FRAME,
            key_values: KeyValueStore::new(),
            content: None,
        };

        let bytes = volume.to_raw_bytes();
        let samples: Vec<f32> = bytes
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect();
        assert_eq!(samples, vec![0.0, 1.0, 10.0, 11.0]);
        assert_eq!(volume.signal_at(1, 0, 0).unwrap().to_vec(), vec![10.0, 11.0]);
        assert!(volume.signal_at(2, 0, 0).is_none());
    }
}
