use crate::gradient::DEFAULT_GRADIENT_PREFIX;

/// Value written where the baseline is zero, keeps a later log() finite
pub const DEFAULT_ZERO_BASELINE_VALUE: f32 = 1e-10;

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub zero_baseline_value: f32,
    pub canonicalize_frame: bool,
    pub gradient_key_prefix: String,
    pub clear_content: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            zero_baseline_value: DEFAULT_ZERO_BASELINE_VALUE,
            canonicalize_frame: true,
            gradient_key_prefix: DEFAULT_GRADIENT_PREFIX.to_string(),
            clear_content: true,
        }
    }
}

impl NormalizerConfig {
    pub fn builder() -> NormalizerConfigBuilder {
        NormalizerConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct NormalizerConfigBuilder {
    zero_baseline_value: Option<f32>,
    canonicalize_frame: Option<bool>,
    gradient_key_prefix: Option<String>,
    clear_content: Option<bool>,
}

impl NormalizerConfigBuilder {
    pub fn zero_baseline_value(mut self, value: f32) -> Self {
        self.zero_baseline_value = Some(value);
        self
    }

    pub fn canonicalize_frame(mut self, enabled: bool) -> Self {
        self.canonicalize_frame = Some(enabled);
        self
    }

    pub fn gradient_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.gradient_key_prefix = Some(prefix.into());
        self
    }

    pub fn clear_content(mut self, clear: bool) -> Self {
        self.clear_content = Some(clear);
        self
    }

    pub fn build(self) -> NormalizerConfig {
        let default = NormalizerConfig::default();
        NormalizerConfig {
            zero_baseline_value: self.zero_baseline_value.unwrap_or(default.zero_baseline_value),
            canonicalize_frame: self.canonicalize_frame.unwrap_or(default.canonicalize_frame),
            gradient_key_prefix: self.gradient_key_prefix.unwrap_or(default.gradient_key_prefix),
            clear_content: self.clear_content.unwrap_or(default.clear_content),
        }
    }
}
