use crate::error::NormalizeError;
use crate::error::Result;
use crate::volume::AxisInfo;

use ndarray::Array4;
use ndarray::ArrayView4;
use ndarray::ShapeBuilder;

pub const DATA_DIMENSION: usize = 4;

pub struct AxisLocator;

impl AxisLocator {
    /// Index of the single list/vector/point axis
    ///
    /// Axes are scanned in order and the first offending axis decides the
    /// error.
    ///
    /// # Errors
    ///
    /// * [`NormalizeError::AmbiguousAxis`] - a second gradient axis was found
    /// * [`NormalizeError::UnknownAxisKind`] - an axis is neither gradient nor
    ///   domain/space
    /// * [`NormalizeError::MissingGradientAxis`] - no gradient axis at all
    pub fn locate(axes: &[AxisInfo]) -> Result<usize> {
        let mut gradient_axis: Option<usize> = None;

        for (index, axis) in axes.iter().enumerate() {
            if axis.kind.is_gradient() {
                if let Some(first) = gradient_axis {
                    return Err(NormalizeError::AmbiguousAxis {
                        first,
                        second: index,
                    });
                }
                gradient_axis = Some(index);
            } else if !axis.kind.is_anatomical() {
                return Err(NormalizeError::UnknownAxisKind {
                    axis: index,
                    kind: axis.kind,
                });
            }
        }

        gradient_axis.ok_or(NormalizeError::MissingGradientAxis)
    }
}

/// Bijection on the four axes; new axis `i` is old axis `order()[i]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permutation {
    order: [usize; DATA_DIMENSION],
}

impl Permutation {
    pub fn new(order: [usize; DATA_DIMENSION]) -> Option<Self> {
        let mut seen = [false; DATA_DIMENSION];
        for &axis in &order {
            if axis >= DATA_DIMENSION || std::mem::replace(&mut seen[axis], true) {
                return None;
            }
        }
        Some(Self { order })
    }

    pub fn identity() -> Self {
        Self {
            order: [0, 1, 2, 3],
        }
    }

    /// Move `gradient_axis` to the front, the others keep their relative order
    pub fn gradient_first(gradient_axis: usize) -> Option<Self> {
        if gradient_axis >= DATA_DIMENSION {
            return None;
        }

        let mut order = [gradient_axis; DATA_DIMENSION];
        let mut remaining = (0..DATA_DIMENSION).filter(|&axis| axis != gradient_axis);
        for slot in order.iter_mut().skip(1) {
            *slot = remaining.next()?;
        }
        Some(Self { order })
    }

    pub fn order(&self) -> [usize; DATA_DIMENSION] {
        self.order
    }

    pub fn inverse(&self) -> Self {
        let mut order = [0; DATA_DIMENSION];
        for (new, &old) in self.order.iter().enumerate() {
            order[old] = new;
        }
        Self { order }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Reorder per-axis metadata
    pub fn apply<T: Copy>(&self, items: &[T; DATA_DIMENSION]) -> [T; DATA_DIMENSION] {
        std::array::from_fn(|i| items[self.order[i]])
    }
}

pub struct Permuter;

impl Permuter {
    /// Copy `data` with its axes reordered
    ///
    /// Values are untouched; the copy is laid out with the new axis 0
    /// varying fastest.
    pub fn permute<A: Clone>(data: ArrayView4<'_, A>, permutation: Permutation) -> Array4<A> {
        let view = data.permuted_axes(permutation.order());
        Array4::from_shape_fn(view.raw_dim().f(), |index| view[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AxisKind;

    fn axes(kinds: [AxisKind; 4]) -> Vec<AxisInfo> {
        kinds.into_iter().map(AxisInfo::new).collect()
    }

    #[test]
    fn locates_each_gradient_kind() {
        use AxisKind::*;
        assert_eq!(AxisLocator::locate(&axes([List, Space, Space, Space])).unwrap(), 0);
        assert_eq!(AxisLocator::locate(&axes([Space, Domain, Vector, Space])).unwrap(), 2);
        assert_eq!(AxisLocator::locate(&axes([Space, Space, Space, Point])).unwrap(), 3);
    }

    #[test]
    fn rejects_two_gradient_axes() {
        use AxisKind::*;
        assert!(matches!(
            AxisLocator::locate(&axes([Space, List, Space, Vector])),
            Err(NormalizeError::AmbiguousAxis { first: 1, second: 3 })
        ));
    }

    #[test]
    fn rejects_missing_gradient_axis() {
        use AxisKind::*;
        assert!(matches!(
            AxisLocator::locate(&axes([Space, Space, Domain, Space])),
            Err(NormalizeError::MissingGradientAxis)
        ));
    }

    #[test]
    fn rejects_unknown_kinds() {
        use AxisKind::*;
        assert!(matches!(
            AxisLocator::locate(&axes([List, Space, Time, Space])),
            Err(NormalizeError::UnknownAxisKind { axis: 2, kind: Time })
        ));
    }

    #[test]
    fn gradient_first_orders() {
        let orders: Vec<_> = (0..4)
            .map(|k| Permutation::gradient_first(k).unwrap().order())
            .collect();
        assert_eq!(orders, vec![[0, 1, 2, 3], [1, 0, 2, 3], [2, 0, 1, 3], [3, 0, 1, 2]]);
        assert!(Permutation::gradient_first(4).is_none());
    }

    #[test]
    fn permutation_must_be_bijective() {
        assert!(Permutation::new([0, 1, 2, 3]).is_some());
        assert!(Permutation::new([0, 0, 2, 3]).is_none());
        assert!(Permutation::new([0, 1, 2, 4]).is_none());
    }

    #[test]
    fn inverse_composes_to_identity() {
        for k in 0..4 {
            let permutation = Permutation::gradient_first(k).unwrap();
            let round_trip = permutation.inverse().apply(&permutation.apply(&[0, 1, 2, 3]));
            assert_eq!(round_trip, [0, 1, 2, 3]);
        }
    }

    #[test]
    fn permute_moves_values() {
        let data = Array4::from_shape_fn((2, 3, 4, 5), |(a, b, c, d)| {
            (1000 * a + 100 * b + 10 * c + d) as f32
        });
        let permutation = Permutation::gradient_first(2).unwrap();
        let permuted = Permuter::permute(data.view(), permutation);

        assert_eq!(permuted.dim(), (4, 2, 3, 5));
        for ((c, a, b, d), &value) in permuted.indexed_iter() {
            assert_eq!(value, data[[a, b, c, d]]);
        }
        // gradient axis is contiguous
        assert_eq!(permuted.strides()[0], 1);
    }
}
