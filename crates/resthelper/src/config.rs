//! Lookup configuration.

/// Configuration for `RestHelperService` and `Lookup`.
#[derive(Debug, Clone)]
pub struct HelperConfig {
    /// Attribute holding the externally stable unique identifier.
    pub uuid_attribute: &'static str,
    /// Whether to log a warning when a field-set lookup scans a whole extent.
    pub warn_on_unfiltered_scan: bool,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            uuid_attribute: "uuid",
            warn_on_unfiltered_scan: true,
        }
    }
}

impl HelperConfig {
    pub fn with_uuid_attribute(mut self, attribute: &'static str) -> Self {
        self.uuid_attribute = attribute;
        self
    }

    pub fn with_unfiltered_scan_warning(mut self, enabled: bool) -> Self {
        self.warn_on_unfiltered_scan = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_config_defaults() {
        let config = HelperConfig::default();
        assert_eq!(config.uuid_attribute, "uuid");
        assert!(config.warn_on_unfiltered_scan);
    }

    #[test]
    fn test_helper_config_setters() {
        let config = HelperConfig::default()
            .with_uuid_attribute("externalId")
            .with_unfiltered_scan_warning(false);
        assert_eq!(config.uuid_attribute, "externalId");
        assert!(!config.warn_on_unfiltered_scan);
    }
}
