/// Decides whether a transfer failure still marks the item as downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordPolicy {
    /// Record the identity once the transfer was attempted, even if it failed.
    #[default]
    RecordAttempts,
    /// Record only confirmed transfers so failures are retried next run.
    RecordSuccessOnly,
}

impl RecordPolicy {
    pub fn should_record(&self, transfer_succeeded: bool) -> bool {
        match self {
            RecordPolicy::RecordAttempts => true,
            RecordPolicy::RecordSuccessOnly => transfer_succeeded,
        }
    }
}

/// How a qualifying item is handled once selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunMode {
    /// Dry run: never transfer.
    pub debug: bool,
    /// Mark items as seen without transferring them.
    pub update: bool,
    pub record_policy: RecordPolicy,
}

impl RunMode {
    pub fn transfers_enabled(&self) -> bool {
        !self.debug && !self.update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_attempts_records_failures() {
        assert!(RecordPolicy::RecordAttempts.should_record(true));
        assert!(RecordPolicy::RecordAttempts.should_record(false));
    }

    #[test]
    fn test_record_success_only_skips_failures() {
        assert!(RecordPolicy::RecordSuccessOnly.should_record(true));
        assert!(!RecordPolicy::RecordSuccessOnly.should_record(false));
    }

    #[test]
    fn test_transfers_suppressed_by_debug_or_update() {
        assert!(RunMode::default().transfers_enabled());
        assert!(!RunMode { debug: true, ..Default::default() }.transfers_enabled());
        assert!(!RunMode { update: true, ..Default::default() }.transfers_enabled());
    }
}
