use crate::error::NormalizeError;
use crate::error::Result;
use crate::key_value::KeyValueStore;

pub const DEFAULT_GRADIENT_PREFIX: &str = "DWMRI_gradient";

/// One gradient direction read from the key/value table
#[derive(Debug, Clone, PartialEq)]
pub struct GradientEntry {
    pub key: String,
    pub direction: [f64; 3],
}

impl GradientEntry {
    /// Euclidean norm in single precision, the precision the directions are
    /// stored with; components below ~1e-19 square to zero
    pub fn norm(&self) -> f32 {
        let [x, y, z] = self.direction.map(|c| c as f32);
        (x * x + y * y + z * z).sqrt()
    }

    /// Diffusion-weighted acquisition; zero-norm entries are baselines
    pub fn is_non_zero(&self) -> bool {
        self.norm() > 0.0
    }
}

/// Gradient entries in the order their keys appear in the volume metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientTable {
    entries: Vec<GradientEntry>,
}

impl GradientTable {
    pub fn entries(&self) -> &[GradientEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` at every diffusion-weighted slot of the gradient axis
    pub fn non_zero_flags(&self) -> Vec<bool> {
        self.entries.iter().map(GradientEntry::is_non_zero).collect()
    }

    pub fn num_non_zero(&self) -> usize {
        self.entries.iter().filter(|e| e.is_non_zero()).count()
    }

    pub fn num_zero(&self) -> usize {
        self.len() - self.num_non_zero()
    }

    /// Source slot of every output gradient: the non-zero slots in
    /// ascending order, so output slot `h` reads source `source_indices()[h]`
    pub fn source_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_non_zero())
            .map(|(index, _)| index)
            .collect()
    }

    /// The gradient axis must hold exactly one slot per entry
    pub fn check_axis_size(&self, axis_size: usize) -> Result<()> {
        if self.len() != axis_size {
            return Err(NormalizeError::GradientCountMismatch {
                gradients: self.len(),
                axis_size,
            });
        }
        Ok(())
    }
}

/// Finds and classifies the gradient entries of a key/value table
#[derive(Debug, Clone)]
pub struct GradientClassifier {
    prefix: String,
}

impl Default for GradientClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_GRADIENT_PREFIX)
    }
}

impl GradientClassifier {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Keys strictly longer than the prefix and starting with it
    pub fn is_gradient_key(&self, key: &str) -> bool {
        key.len() > self.prefix.len() && key.starts_with(&self.prefix)
    }

    /// Parse a `"gx gy gz"` value
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::MalformedGradient`] unless the value holds
    /// exactly three whitespace separated floats.
    pub fn parse_direction(key: &str, value: &str) -> Result<[f64; 3]> {
        let malformed = || NormalizeError::MalformedGradient {
            key: key.to_string(),
            value: value.to_string(),
        };

        let components: Vec<f64> = value
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| malformed())?;

        match components.as_slice() {
            &[x, y, z] => Ok([x, y, z]),
            _ => Err(malformed()),
        }
    }

    /// Collect every gradient entry and check both acquisition classes exist
    ///
    /// # Errors
    ///
    /// Fails on the first malformed gradient value, then with
    /// [`NormalizeError::NoDiffusionData`] when no entry is non-zero and
    /// [`NormalizeError::NoBaselineData`] when no entry is zero.
    pub fn classify(&self, key_values: &KeyValueStore) -> Result<GradientTable> {
        let entries = key_values
            .iter()
            .filter(|(key, _)| self.is_gradient_key(key))
            .map(|(key, value)| {
                Ok(GradientEntry {
                    key: key.to_string(),
                    direction: Self::parse_direction(key, value)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let table = GradientTable { entries };
        let (non_zero, zero) = (table.num_non_zero(), table.num_zero());
        if non_zero == 0 {
            return Err(NormalizeError::NoDiffusionData { zero });
        }
        if zero == 0 {
            return Err(NormalizeError::NoBaselineData { non_zero });
        }
        Ok(table)
    }

    /// [`classify`](Self::classify) followed by the gradient axis size check
    pub fn classify_for_axis(
        &self,
        key_values: &KeyValueStore,
        axis_size: usize,
    ) -> Result<GradientTable> {
        let table = self.classify(key_values)?;
        table.check_axis_size(axis_size)?;
        Ok(table)
    }
}
