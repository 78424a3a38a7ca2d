//! Run-wide statistics helpers.

use std::fmt;

use crate::domain::ImageReport;

/// Counters for a batch run.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Number of images processed successfully.
    pub images_processed: usize,
    /// Number of images skipped due to errors.
    pub images_failed: usize,
    /// Total candidate regions extracted across all images.
    pub candidates_extracted: usize,
    /// Candidates that survived classification.
    pub targets_classified: usize,
}

impl PipelineStats {
    /// Aggregates counters from per-image reports.
    pub fn from_reports(reports: &[ImageReport]) -> Self {
        let mut stats = PipelineStats::default();
        for report in reports {
            if report.error.is_some() {
                stats.images_failed += 1;
            } else {
                stats.images_processed += 1;
            }
            stats.candidates_extracted += report.candidates;
            stats.targets_classified += report.records.len();
        }
        stats
    }

    /// Candidates discarded because no color segment produced an accepted
    /// letter.
    pub fn candidates_discarded(&self) -> usize {
        self.candidates_extracted - self.targets_classified
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run statistics:")?;
        writeln!(f, "  Images processed: {}", self.images_processed)?;
        writeln!(f, "  Images failed: {}", self.images_failed)?;
        writeln!(f, "  Candidates extracted: {}", self.candidates_extracted)?;
        writeln!(
            f,
            "  Targets classified: {} ({} discarded)",
            self.targets_classified,
            self.candidates_discarded()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reports() {
        let reports = vec![
            ImageReport {
                index: 0,
                candidates: 3,
                records: Vec::new(),
                error: None,
            },
            ImageReport {
                index: 1,
                candidates: 0,
                records: Vec::new(),
                error: Some("image load".to_string()),
            },
        ];
        let stats = PipelineStats::from_reports(&reports);
        assert_eq!(stats.images_processed, 1);
        assert_eq!(stats.images_failed, 1);
        assert_eq!(stats.candidates_extracted, 3);
        assert_eq!(stats.candidates_discarded(), 3);
    }
}
