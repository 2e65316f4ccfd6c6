//! # DWI-normalize library
//!
//! This crate normalizes diffusion-weighted MRI volumes against their
//! baseline acquisitions.

//!
//! A raw DWI volume is a 4-D array with three anatomical axes and one
//! gradient axis. Its key/value metadata lists one `DWMRI_gradient_NNNN`
//! direction per slot of the gradient axis; zero-norm directions mark the
//! baseline (b=0) acquisitions. Normalization:
//!  - moves the gradient axis to the front
//!  - averages the baseline acquisitions into a baseline image
//!  - divides every diffusion-weighted acquisition by that image
//!  - drops the baselines and renumbers the remaining gradients
//!  - rewrites the spatial metadata in a RAS frame
//!
//!  Voxels with a zero baseline receive a small positive sentinel instead of
//!  a quotient so a later logarithm stays finite. Every failure is reported as
//!  a [`NormalizeError`] and no partial output is produced.
//!
//! # Examples
//!
//! ## Normalizing a single-voxel volume
//!
//! Two baselines of 10 and 30 average to 20, the weighted reading of 5 becomes
//! 0.25.
//!
//! ```
//! # use dwi_normalize::AxisInfo;
//! # use dwi_normalize::KeyValueStore;
//! # use dwi_normalize::Normalizer;
//! # use dwi_normalize::RawVolume;
//! # use dwi_normalize::SpaceFrame;
//! # use ndarray::ArrayD;
//! # use ndarray::IxDyn;
//! let data = ArrayD::from_shape_vec(IxDyn(&[3, 1, 1, 1]), vec![10u16, 30, 5])
//!     .expect("shape should match sample count");
//! let axes = vec![
//!     AxisInfo::list(),
//!     AxisInfo::space([-2.0, 0.0, 0.0]),
//!     AxisInfo::space([0.0, -2.0, 0.0]),
//!     AxisInfo::space([0.0, 0.0, 2.0]),
//! ];
//! let key_values: KeyValueStore = [
//!     ("DWMRI_b-value", "1000"),
//!     ("DWMRI_gradient_0000", "0 0 0"),
//!     ("DWMRI_gradient_0001", "0 0 0"),
//!     ("DWMRI_gradient_0002", "1 0 0"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let raw = RawVolume::new(data, axes)
//!     .with_space(SpaceFrame::LeftPosteriorSuperior)
//!     .with_key_values(key_values);
//! let normalized = Normalizer::default()
//!     .normalize(&raw)
//!     .expect("volume should normalize");
//!
//! assert_eq!(normalized.data[[0, 0, 0, 0]], 0.25);
//! assert_eq!(normalized.key_values.get("DWMRI_gradient_0000"), Some("1 0 0"));
//! assert_eq!(normalized.space, SpaceFrame::RightAnteriorSuperior);
//! assert_eq!(normalized.axes[1].space_direction, Some([2.0, 0.0, 0.0]));
//! ```

pub mod anisotropy;
pub mod axis;
pub mod config;
pub mod enums;
pub mod error;
pub mod frame;
pub mod gradient;
pub mod key_value;
pub mod logger;
pub mod normalizer;
pub mod sample;
pub mod timing;
pub mod volume;

pub use axis::AxisLocator;
pub use axis::Permutation;
pub use axis::Permuter;
pub use config::NormalizerConfig;
pub use config::NormalizerConfigBuilder;
pub use enums::AxisKind;
pub use enums::SpaceFrame;
pub use error::NormalizeError;
pub use error::Result;
pub use frame::FrameCanonicalizer;
pub use gradient::GradientClassifier;
pub use gradient::GradientEntry;
pub use gradient::GradientTable;
pub use key_value::KeyValueStore;
pub use normalizer::Normalizer;
pub use sample::Sample;
pub use timing::PipelineTimings;
pub use timing::StepTiming;
pub use timing::Timer;
pub use volume::AxisInfo;
pub use volume::NormalizedVolume;
pub use volume::RawVolume;
