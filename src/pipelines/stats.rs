use std::time::{Duration, Instant};

/// Statistics for one evaluation request.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total execution time.
    pub total_time: Duration,
    /// Number of sentences evaluated.
    pub sentences_processed: usize,
}

impl PipelineStats {
    /// Create a new stats tracker (call at start of operation).
    pub(crate) fn start() -> PipelineStatsBuilder {
        PipelineStatsBuilder {
            start_time: Instant::now(),
        }
    }
}

/// Builder for PipelineStats - tracks timing from creation to finalize.
pub(crate) struct PipelineStatsBuilder {
    start_time: Instant,
}

impl PipelineStatsBuilder {
    /// Finalize stats with the number of sentences processed.
    pub fn finish(self, sentences_processed: usize) -> PipelineStats {
        PipelineStats {
            total_time: self.start_time.elapsed(),
            sentences_processed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineStats;

    #[test]
    fn records_elapsed_time_and_count() {
        let builder = PipelineStats::start();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let stats = builder.finish(3);
        assert_eq!(stats.sentences_processed, 3);
        assert!(stats.total_time >= std::time::Duration::from_millis(1));
    }
}
