//! Native element types a raw volume may be stored in

use half::f16;

/// Element type convertible to the `f32` working type of the normalizer
pub trait Sample: Copy + bytemuck::Pod {
    /// Returns `None` when the value has no finite `f32` representation
    fn to_f32(self) -> Option<f32>;
}

macro_rules! integer_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f32(self) -> Option<f32> {
                    Some(self as f32)
                }
            }
        )*
    };
}

integer_sample!(u8, i8, u16, i16, u32, i32);

impl Sample for f16 {
    #[inline]
    fn to_f32(self) -> Option<f32> {
        Some(self.to_f32())
    }
}

impl Sample for f32 {
    #[inline]
    fn to_f32(self) -> Option<f32> {
        Some(self)
    }
}

impl Sample for f64 {
    #[inline]
    fn to_f32(self) -> Option<f32> {
        let narrowed = self as f32;
        // NaN and infinities carry over, finite values must stay finite
        if self.is_finite() && !narrowed.is_finite() {
            None
        } else {
            Some(narrowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_convert() {
        assert_eq!(Sample::to_f32(65535u16), Some(65535.0));
        assert_eq!(Sample::to_f32(-3i16), Some(-3.0));
    }

    #[test]
    fn half_converts() {
        assert_eq!(Sample::to_f32(f16::from_f32(0.5)), Some(0.5));
    }

    #[test]
    fn f64_out_of_range_fails() {
        assert_eq!(Sample::to_f32(1e300f64), None);
        assert_eq!(Sample::to_f32(2.5f64), Some(2.5));
        assert!(Sample::to_f32(f64::INFINITY).is_some());
    }
}
