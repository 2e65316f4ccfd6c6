use crate::axis::AxisLocator;
use crate::axis::DATA_DIMENSION;
use crate::axis::Permutation;
use crate::axis::Permuter;
use crate::config::NormalizerConfig;
use crate::error::NormalizeError;
use crate::error::Result;
use crate::frame::FrameCanonicalizer;
use crate::gradient::GradientClassifier;
use crate::gradient::GradientTable;
use crate::key_value::KeyValueStore;
use crate::sample::Sample;
use crate::timing::PipelineTimings;
use crate::timing::Timer;
use crate::volume::AxisInfo;
use crate::volume::NormalizedVolume;
use crate::volume::RawVolume;

use ndarray::Array3;
use ndarray::Array4;
use ndarray::ArrayD;
use ndarray::ArrayView3;
use ndarray::ArrayView4;
use ndarray::Axis;
use ndarray::Ix4;
use ndarray::ShapeBuilder;
use ndarray::Zip;
use tracing::info;
use tracing::instrument;
use tracing::warn;

/// Divides the diffusion-weighted acquisitions of a volume by its mean
/// baseline image
///
/// A single call runs validation, gradient classification, axis permutation,
/// baseline averaging, signal division, metadata renumbering and frame
/// canonicalization, failing fast without partial output.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
    classifier: GradientClassifier,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        let classifier = GradientClassifier::new(config.gradient_key_prefix.clone());
        Self { config, classifier }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn normalize<T: Sample>(&self, raw: &RawVolume<T>) -> Result<NormalizedVolume> {
        self.normalize_with_timings(raw).map(|(volume, _)| volume)
    }

    #[instrument(skip_all, fields(shape = ?raw.dim(), space = %raw.space))]
    pub fn normalize_with_timings<T: Sample>(
        &self,
        raw: &RawVolume<T>,
    ) -> Result<(NormalizedVolume, PipelineTimings)> {
        let mut timings = PipelineTimings::new();

        let timer = Timer::start("validate");
        Self::validate(raw)?;
        timings.record(timer);

        let timer = Timer::start("convert");
        let converted = Self::convert(&raw.data)?.into_dimensionality::<Ix4>()?;
        timings.record(timer);

        let timer = Timer::start("classify_gradients");
        let table = self.classifier.classify(&raw.key_values)?;
        info!("Number of non-zero gradients: {}", table.num_non_zero());
        info!("Number of zero gradients: {}", table.num_zero());
        timings.record(timer);

        let timer = Timer::start("locate_gradient_axis");
        let gradient_axis = AxisLocator::locate(&raw.axes)?;
        table.check_axis_size(converted.len_of(Axis(gradient_axis)))?;
        timings.record(timer);

        let timer = Timer::start("permute");
        let permutation = Permutation::gradient_first(gradient_axis)
            .ok_or(NormalizeError::MissingGradientAxis)?;
        info!("Permuting the axis order to: {:?}", permutation.order());
        let source = Permuter::permute(converted.view(), permutation);
        drop(converted);
        let raw_axes: [AxisInfo; DATA_DIMENSION] = std::array::from_fn(|i| raw.axes[i]);
        let axes = permutation.apply(&raw_axes);
        timings.record(timer);

        let timer = Timer::start("average_baseline");
        let flags = table.non_zero_flags();
        let baseline = Self::average_baseline(source.view(), &flags);
        timings.record(timer);

        let timer = Timer::start("normalize_signal");
        let data = self.normalize_signal(source.view(), baseline.view(), &table.source_indices());
        drop(source);
        timings.record(timer);

        let timer = Timer::start("rebuild_metadata");
        let key_values = self.rebuild_metadata(&raw.key_values, &table)?;
        timings.record(timer);

        let mut normalized = NormalizedVolume {
            data,
            axes,
            space: raw.space,
            space_origin: raw.space_origin,
            measurement_frame: raw.measurement_frame,
            key_values,
            content: if self.config.clear_content {
                None
            } else {
                raw.content.clone()
            },
        };

        if self.config.canonicalize_frame {
            let timer = Timer::start("canonicalize_frame");
            FrameCanonicalizer::to_ras(&mut normalized)?;
            timings.record(timer);
        }

        info!("Data normalization finished: {:?}", normalized.dim());
        timings.log_summary();
        Ok((normalized, timings))
    }

    /// Structural checks that need no data access
    pub fn validate<T>(raw: &RawVolume<T>) -> Result<()> {
        if raw.data.ndim() != DATA_DIMENSION {
            return Err(NormalizeError::Dimension {
                found: raw.data.ndim(),
            });
        }
        if raw.axes.len() != DATA_DIMENSION {
            return Err(NormalizeError::Dimension {
                found: raw.axes.len(),
            });
        }
        if !raw.space.is_supported() {
            return Err(NormalizeError::CoordinateFrame { frame: raw.space });
        }
        Ok(())
    }

    /// Convert every sample to `f32`, keeping the shape
    pub fn convert<T: Sample>(data: &ArrayD<T>) -> Result<ArrayD<f32>> {
        let samples = data
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                value.to_f32().ok_or_else(|| NormalizeError::TypeConversion {
                    index,
                    reason: "value is outside the f32 range".to_string(),
                })
            })
            .collect::<Result<Vec<f32>>>()?;

        Ok(ArrayD::from_shape_vec(data.raw_dim(), samples)?)
    }

    /// Mean of the zero-gradient slots at every voxel
    ///
    /// `source` has the gradient axis first and `non_zero` flags each of its
    /// slots. The result is indexed by the three anatomical axes.
    pub(crate) fn average_baseline(
        source: ArrayView4<'_, f32>,
        non_zero: &[bool],
    ) -> Array3<f32> {
        let num_zero = non_zero.iter().filter(|&&flag| !flag).count() as f32;

        Zip::from(source.lanes(Axis(0))).map_collect(|lane| {
            let sum: f32 = lane
                .iter()
                .zip(non_zero)
                .filter(|&(_, &flag)| !flag)
                .map(|(&value, _)| value)
                .sum();
            sum / num_zero
        })
    }

    /// Divide each retained gradient slot by the baseline
    ///
    /// Output slot `h` reads source slot `source_indices[h]`. Voxels with a
    /// zero baseline get the configured sentinel in every slot.
    pub(crate) fn normalize_signal(
        &self,
        source: ArrayView4<'_, f32>,
        baseline: ArrayView3<'_, f32>,
        source_indices: &[usize],
    ) -> Array4<f32> {
        let (_, size1, size2, size3) = source.dim();
        info!(
            "Resizing the data to: {} {} {} {}",
            source_indices.len(),
            size1,
            size2,
            size3
        );

        let zero_voxels = baseline.iter().filter(|&&b| b == 0.0).count();
        if zero_voxels > 0 {
            warn!(
                "{} voxels have a zero baseline, writing {:e}",
                zero_voxels, self.config.zero_baseline_value
            );
        }

        let sentinel = self.config.zero_baseline_value;
        let mut output = Array4::<f32>::zeros((source_indices.len(), size1, size2, size3).f());
        Zip::from(output.lanes_mut(Axis(0)))
            .and(source.lanes(Axis(0)))
            .and(baseline)
            .for_each(|mut out, signal, &b| {
                for (slot, &src) in out.iter_mut().zip(source_indices) {
                    *slot = if b != 0.0 { signal[src] / b } else { sentinel };
                }
            });
        output
    }

    /// Copy the key/value pairs, keeping only the non-zero gradients and
    /// renumbering them from `<prefix>_0000`
    ///
    /// # Errors
    ///
    /// Propagates [`NormalizeError::MetadataWrite`] from the output store.
    pub fn rebuild_metadata(
        &self,
        source: &KeyValueStore,
        table: &GradientTable,
    ) -> Result<KeyValueStore> {
        let flags = table.non_zero_flags();
        let mut output = KeyValueStore::new();
        let mut total = 0usize;
        let mut emitted = 0usize;

        for (key, value) in source.iter() {
            if !self.classifier.is_gradient_key(key) {
                output.insert(key, value)?;
                continue;
            }

            if flags.get(total).copied().unwrap_or(false) {
                let renamed = format!("{}_{:04}", self.classifier.prefix(), emitted);
                output.insert(renamed, value)?;
                emitted += 1;
            }
            total += 1;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AxisKind;
    use crate::enums::SpaceFrame;
    use ndarray::Array;
    use ndarray::IxDyn;

    fn gradient_store(directions: &[&str]) -> KeyValueStore {
        let mut store = KeyValueStore::new();
        store.insert("modality", "DWMRI").unwrap();
        for (index, direction) in directions.iter().enumerate() {
            store
                .insert(format!("DWMRI_gradient_{index:04}"), *direction)
                .unwrap();
        }
        store
    }

    fn toy_volume(intensities: &[f32]) -> RawVolume<f32> {
        let data = Array::from_shape_vec(IxDyn(&[intensities.len(), 1, 1, 1]), intensities.to_vec())
            .unwrap();
        let axes = vec![
            AxisInfo::list(),
            AxisInfo::space([1.0, 0.0, 0.0]),
            AxisInfo::space([0.0, 1.0, 0.0]),
            AxisInfo::space([0.0, 0.0, 1.0]),
        ];
        RawVolume::new(data, axes).with_key_values(gradient_store(&["0 0 0", "0 0 0", "1 0 0"]))
    }

    #[test]
    fn divides_by_mean_baseline() {
        let normalized = Normalizer::default()
            .normalize(&toy_volume(&[10.0, 30.0, 5.0]))
            .unwrap();

        assert_eq!(normalized.dim(), (1, 1, 1, 1));
        assert_eq!(normalized.data[[0, 0, 0, 0]], 0.25);
        assert_eq!(normalized.key_values.get("DWMRI_gradient_0000"), Some("1 0 0"));
    }

    #[test]
    fn zero_baseline_writes_sentinel() {
        let normalized = Normalizer::default()
            .normalize(&toy_volume(&[0.0, 0.0, 5.0]))
            .unwrap();
        assert_eq!(normalized.data[[0, 0, 0, 0]], 1e-10);
    }

    #[test]
    fn configured_sentinel() {
        let normalizer = Normalizer::new(NormalizerConfig::builder().zero_baseline_value(0.5).build());
        let normalized = normalizer.normalize(&toy_volume(&[0.0, 0.0, 0.0])).unwrap();
        assert_eq!(normalized.data[[0, 0, 0, 0]], 0.5);
    }

    #[test]
    fn rejects_wrong_dimension() {
        let data = ArrayD::<f32>::zeros(IxDyn(&[3, 1, 1]));
        let raw = RawVolume::new(data, vec![AxisInfo::list(); 3]);
        assert!(matches!(
            Normalizer::default().normalize(&raw),
            Err(NormalizeError::Dimension { found: 3 })
        ));

        let mut raw = toy_volume(&[1.0, 1.0, 1.0]);
        raw.axes.pop();
        assert!(matches!(
            Normalizer::validate(&raw),
            Err(NormalizeError::Dimension { found: 3 })
        ));
    }

    #[test]
    fn rejects_unsupported_frame() {
        let raw = toy_volume(&[1.0, 1.0, 1.0]).with_space(SpaceFrame::ScannerXyz);
        assert!(matches!(
            Normalizer::default().normalize(&raw),
            Err(NormalizeError::CoordinateFrame { .. })
        ));
    }

    #[test]
    fn rejects_unconvertible_samples() {
        let data = Array::from_shape_vec(IxDyn(&[3, 1, 1, 1]), vec![1.0f64, 1e300, 2.0]).unwrap();
        let raw = RawVolume::new(data, toy_volume(&[0.0; 3]).axes)
            .with_key_values(gradient_store(&["0 0 0", "0 0 0", "1 0 0"]));
        assert!(matches!(
            Normalizer::default().normalize(&raw),
            Err(NormalizeError::TypeConversion { index: 1, .. })
        ));
    }

    #[test]
    fn gradient_count_must_match_axis() {
        let raw = toy_volume(&[1.0, 2.0, 3.0])
            .with_key_values(gradient_store(&["0 0 0", "1 0 0"]));
        assert!(matches!(
            Normalizer::default().normalize(&raw),
            Err(NormalizeError::GradientCountMismatch { gradients: 2, axis_size: 3 })
        ));
    }

    #[test]
    fn baseline_is_plain_mean() {
        let source = Array4::from_shape_vec((3, 2, 1, 1), vec![2.0, 4.0, 8.0, 1.0, 3.0, 5.0])
            .unwrap();
        // slot 1 is diffusion weighted
        let baseline = Normalizer::average_baseline(source.view(), &[false, true, false]);
        assert_eq!(baseline.dim(), (2, 1, 1));
        assert_eq!(baseline[[0, 0, 0]], (2.0 + 3.0) / 2.0);
        assert_eq!(baseline[[1, 0, 0]], (4.0 + 5.0) / 2.0);
    }

    #[test]
    fn rebuild_keeps_order_and_renumbers() {
        let mut source = KeyValueStore::new();
        source.insert("modality", "DWMRI").unwrap();
        source.insert("DWMRI_gradient_0000", "0 0 0").unwrap();
        source.insert("DWMRI_gradient_0001", "1 0 0").unwrap();
        source.insert("DWMRI_b-value", "1000").unwrap();
        source.insert("DWMRI_gradient_0002", "0 0 0").unwrap();
        source.insert("DWMRI_gradient_0003", "0 1 0").unwrap();
        source.insert("DWMRI_gradient", "kept verbatim").unwrap();

        let normalizer = Normalizer::default();
        let table = GradientClassifier::default().classify(&source).unwrap();
        let rebuilt = normalizer.rebuild_metadata(&source, &table).unwrap();

        let pairs: Vec<_> = rebuilt.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("modality", "DWMRI"),
                ("DWMRI_gradient_0000", "1 0 0"),
                ("DWMRI_b-value", "1000"),
                ("DWMRI_gradient_0001", "0 1 0"),
                ("DWMRI_gradient", "kept verbatim"),
            ]
        );
    }

    #[test]
    fn rebuild_propagates_write_failure() {
        let source: KeyValueStore = [
            ("bad:=key", "x"),
            ("DWMRI_gradient_0000", "0 0 0"),
            ("DWMRI_gradient_0001", "1 0 0"),
        ]
        .into_iter()
        .collect();

        let table = GradientClassifier::default().classify(&source).unwrap();
        let result = Normalizer::default().rebuild_metadata(&source, &table);
        assert!(matches!(
            result,
            Err(NormalizeError::MetadataWrite { key, .. }) if key == "bad:=key"
        ));
    }

    #[test]
    fn content_is_cleared_by_default() {
        let raw = toy_volume(&[10.0, 30.0, 5.0]).with_content("raw dwi");
        assert_eq!(Normalizer::default().normalize(&raw).unwrap().content, None);

        let keep = Normalizer::new(NormalizerConfig::builder().clear_content(false).build());
        assert_eq!(keep.normalize(&raw).unwrap().content.as_deref(), Some("raw dwi"));
    }

    #[test]
    fn gradient_axis_keeps_its_kind() {
        let mut raw = toy_volume(&[10.0, 30.0, 5.0]);
        raw.axes[0] = AxisInfo::new(AxisKind::Vector);
        let normalized = Normalizer::default().normalize(&raw).unwrap();
        assert_eq!(normalized.axes[0].kind, AxisKind::Vector);
    }

    #[test]
    fn timings_cover_every_step() {
        let (_, timings) = Normalizer::default()
            .normalize_with_timings(&toy_volume(&[10.0, 30.0, 5.0]))
            .unwrap();
        for step in [
            "validate",
            "convert",
            "classify_gradients",
            "locate_gradient_axis",
            "permute",
            "average_baseline",
            "normalize_signal",
            "rebuild_metadata",
            "canonicalize_frame",
        ] {
            assert!(timings.get_step(step).is_some(), "missing step {step}");
        }
    }
}
