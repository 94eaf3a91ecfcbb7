//! Bounded batching of mutations with per-item outcomes.

use tracing::{debug, info, warn};

use crate::api::{DriveApi, Mutation};
use crate::error::{DriveError, Result};

/// Items per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Largest batch the Drive batch endpoint accepts.
pub const MAX_BATCH_SIZE: usize = 100;

/// What to do when an item in a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failed item. Batches already sent stay applied.
    #[default]
    AbortOnFirstError,
    /// Record every failure and keep going.
    ContinueOnError,
}

/// Batch size and failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    batch_size: usize,
    policy: FailurePolicy,
}

impl BatchConfig {
    pub fn new(batch_size: usize, policy: FailurePolicy) -> Result<Self> {
        if !(1..=MAX_BATCH_SIZE).contains(&batch_size) {
            return Err(DriveError::InvalidBatchSize {
                size: batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(Self { batch_size, policy })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            policy: FailurePolicy::default(),
        }
    }
}

/// Split `items` into ordered groups of at most `size` items.
///
/// Yields `ceil(len / size)` groups whose concatenation is `items`.
pub fn partition<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

/// Outcome of running a sequence of batches.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub batches: usize,
    pub succeeded: usize,
    /// Only populated under [`FailurePolicy::ContinueOnError`].
    pub failures: Vec<DriveError>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: BatchReport) {
        self.batches += other.batches;
        self.succeeded += other.succeeded;
        self.failures.extend(other.failures);
    }
}

/// Sends items as batches of mutations, one batch at a time.
pub struct BatchExecutor<'a, A: ?Sized> {
    api: &'a A,
    config: BatchConfig,
}

impl<'a, A> BatchExecutor<'a, A>
where
    A: DriveApi + ?Sized,
{
    pub fn new(api: &'a A, config: BatchConfig) -> Self {
        Self { api, config }
    }

    /// Submit `items` in batches.
    ///
    /// * `to_mutation` - builds the request for one item
    /// * `before_batch` - runs before each batch is sent; an error stops
    ///   everything without sending that batch
    /// * `on_outcome` - sees every item's result, in order
    ///
    /// Under [`FailurePolicy::AbortOnFirstError`] the first failed item is
    /// returned as the error and the remaining items and batches are skipped.
    /// A failure of the batch request itself is always returned.
    pub async fn run<T, M, B, C>(
        &self,
        items: &[T],
        to_mutation: M,
        mut before_batch: B,
        mut on_outcome: C,
    ) -> Result<BatchReport>
    where
        M: Fn(&T) -> Mutation,
        B: FnMut(&[T]) -> Result<()>,
        C: FnMut(&T, &Result<()>),
    {
        let mut report = BatchReport::default();
        let chunks = partition(items, self.config.batch_size);
        let total = chunks.len();

        for (idx, chunk) in chunks.into_iter().enumerate() {
            before_batch(chunk)?;

            info!(
                batch = idx + 1,
                of = total,
                size = chunk.len(),
                "Submitting batch"
            );
            let mutations: Vec<Mutation> = chunk.iter().map(&to_mutation).collect();
            let outcomes = self.api.submit_batch(&mutations).await?;
            report.batches += 1;

            if outcomes.len() != chunk.len() {
                return Err(DriveError::MalformedBatchResponse(format!(
                    "expected {} outcomes, got {}",
                    chunk.len(),
                    outcomes.len()
                )));
            }

            for (item, outcome) in chunk.iter().zip(outcomes) {
                on_outcome(item, &outcome);
                match outcome {
                    Ok(()) => report.succeeded += 1,
                    Err(e) => match self.config.policy {
                        FailurePolicy::AbortOnFirstError => return Err(e),
                        FailurePolicy::ContinueOnError => {
                            warn!(error = %e, "Batch item failed, continuing");
                            report.failures.push(e);
                        }
                    },
                }
            }
        }

        debug!(
            batches = report.batches,
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "Batches complete"
        );
        Ok(report)
    }
}
