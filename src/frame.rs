//! Conversion of the spatial metadata to a right-anterior-superior frame

use tracing::info;

use crate::enums::SpaceFrame;
use crate::error::NormalizeError;
use crate::error::Result;
use crate::volume::NormalizedVolume;

pub struct FrameCanonicalizer;

impl FrameCanonicalizer {
    /// Rewrite the spatial metadata of `volume` in RAS
    ///
    /// Returns `true` when the frame was changed. Only the anatomical axes
    /// (1 to 3) carry space directions and are touched.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::CoordinateFrame`] for frames other than RAS,
    /// LAS and LPS.
    pub fn to_ras(volume: &mut NormalizedVolume) -> Result<bool> {
        let (flip_x, flip_y) = match volume.space {
            SpaceFrame::RightAnteriorSuperior => return Ok(false),
            SpaceFrame::LeftAnteriorSuperior => (true, false),
            SpaceFrame::LeftPosteriorSuperior => (true, true),
            frame => return Err(NormalizeError::CoordinateFrame { frame }),
        };

        info!("Converting the world coordinate system from {} to RAS", volume.space);
        Self::flip(volume, flip_x, flip_y);
        volume.space = SpaceFrame::RightAnteriorSuperior;
        Ok(true)
    }

    /// Negate the x and/or y component of the space directions, the
    /// measurement frame rows and the space origin
    pub fn flip(volume: &mut NormalizedVolume, flip_x: bool, flip_y: bool) {
        let flip = |v: &mut [f64; 3]| {
            if flip_x {
                v[0] = -v[0];
            }
            if flip_y {
                v[1] = -v[1];
            }
        };

        for axis in volume.axes.iter_mut().skip(1) {
            if let Some(direction) = axis.space_direction.as_mut() {
                flip(direction);
            }
        }
        volume.measurement_frame.iter_mut().for_each(flip);
        flip(&mut volume.space_origin);
    }
}
