//! Progress reporting for uploads.

/// Progress information for an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    /// Bytes handed to the transport so far
    pub done: u64,
    /// Total bytes to transfer
    pub total: u64,
    /// Name of the file being transferred
    pub filename: String,
}

impl TransferProgress {
    /// Create a new progress report.
    pub fn new(done: u64, total: u64, filename: impl Into<String>) -> Self {
        Self {
            done,
            total,
            filename: filename.into(),
        }
    }

    /// Progress as a fraction in `0.0..=1.0`. An empty file counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.done as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    /// Progress as a percentage (0.0 to 100.0).
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    /// Check if transfer is complete.
    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}

/// Callback invoked as upload bytes are consumed by the transport.
pub type ProgressCallback = Box<dyn FnMut(&TransferProgress) + Send>;
