//! Batch correction configuration types

/// Configuration for a batch correction run
#[derive(Debug, Clone)]
pub struct CorrectionConfig {
    /// Whether to validate image dimensions before writing
    pub validate_dimensions: bool,
    /// Upper bound on either image dimension; None disables the cap
    pub max_dimension: Option<usize>,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            validate_dimensions: true,
            max_dimension: Some(65_536),
        }
    }
}

impl CorrectionConfig {
    pub fn builder() -> CorrectionConfigBuilder {
        CorrectionConfigBuilder::default()
    }
}

/// Builder for CorrectionConfig
#[derive(Default)]
pub struct CorrectionConfigBuilder {
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
}

impl CorrectionConfigBuilder {
    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> CorrectionConfig {
        let default = CorrectionConfig::default();
        CorrectionConfig {
            validate_dimensions: self
                .validate_dimensions
                .unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}
