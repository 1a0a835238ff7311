//! Logger configuration

/// When finished entries are handed to the reporter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Remove under the lock, report after releasing it
    /// The reporter may call back into the logger
    #[default]
    Deferred,
    /// Report while holding the lock
    /// Reporter calls are serialized with all table access
    UnderLock,
}

/// Event timing logger configuration
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// Reporting strategy
    pub report_mode: ReportMode,
    /// Warn once the in-flight table grows past this many entries (0 = never)
    /// Nothing is evicted; events whose processing never ends stay resident
    pub in_flight_warn_threshold: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            report_mode: ReportMode::Deferred,
            in_flight_warn_threshold: 1024,
        }
    }
}

impl LoggerConfig {
    /// Fully serialized configuration: reporting happens under the table lock
    pub fn strict() -> Self {
        LoggerConfig {
            report_mode: ReportMode::UnderLock,
            ..Self::default()
        }
    }

    pub fn with_report_mode(mut self, report_mode: ReportMode) -> Self {
        self.report_mode = report_mode;
        self
    }

    pub fn with_in_flight_warn_threshold(mut self, threshold: usize) -> Self {
        self.in_flight_warn_threshold = threshold;
        self
    }

    /// Does a table of `in_flight` entries cross the warning threshold?
    pub(crate) fn crosses_warn_threshold(&self, in_flight: usize) -> bool {
        self.in_flight_warn_threshold != 0 && in_flight == self.in_flight_warn_threshold + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.report_mode, ReportMode::Deferred);
        assert_eq!(config.in_flight_warn_threshold, 1024);
        assert_eq!(LoggerConfig::strict().report_mode, ReportMode::UnderLock);
    }

    #[test]
    fn test_warn_threshold() {
        let config = LoggerConfig::default().with_in_flight_warn_threshold(2);
        assert!(!config.crosses_warn_threshold(2));
        assert!(config.crosses_warn_threshold(3));
        assert!(!config.crosses_warn_threshold(4));

        let off = config.with_in_flight_warn_threshold(0);
        assert!(!off.crosses_warn_threshold(1));
    }
}
