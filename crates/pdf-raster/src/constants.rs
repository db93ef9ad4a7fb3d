//! Tunables for the rasterization worker

use std::time::Duration;

/// Pages decoded per call before the worker looks for newer sizes
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Attempts per batch before a render cycle is reported as failed
pub const DEFAULT_MAX_DECODE_ATTEMPTS: u32 = 3;

/// Wait before the first retry; doubles on each further attempt
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Upper bound on any single retry wait
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(10);

/// How often a worker waiting to retry checks for new requests
pub const BACKOFF_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Page size used when a document has no MediaBox (US Letter, points)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (612.0, 792.0);

/// Parent links followed when looking up inherited page attributes
pub const MAX_PAGE_TREE_DEPTH: usize = 32;
