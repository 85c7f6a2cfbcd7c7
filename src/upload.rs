//! Upload tracking.
//!
//! [`UploadQueue`] owns every upload created in a session and drives each one
//! through its own state machine:
//!
//! ```text
//! Queued -> Uploading(progress) -> Done
//!                               \-> Failed(error)
//! ```
//!
//! The queue does no I/O. Transfers report back with [`UploadEvent`] values
//! addressed by [`UploadId`], and [`UploadQueue::apply`] folds them into the
//! matching task. Tasks stay visible until dismissed, and only finished tasks
//! can be dismissed.

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::io::ReaderStream;

use crate::error::{BrowseError, Result};
use crate::path::RemotePath;

/// Session-unique upload identifier. Never reused, even after dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadId(u64);

impl UploadId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contents of an upload, one piece at a time.
pub type ChunkStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Where the bytes of an upload come from.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Local file, streamed from disk when the transfer starts.
    File(PathBuf),
    /// Bytes already in memory.
    Bytes(Bytes),
}

impl UploadSource {
    /// Open the contents as pieces of at most `chunk_size` bytes, together
    /// with the total length. Files are never loaded whole.
    pub async fn open(&self, chunk_size: usize) -> Result<(u64, ChunkStream)> {
        let chunk_size = chunk_size.max(1);
        match self {
            UploadSource::File(path) => {
                let file = tokio::fs::File::open(path).await?;
                let len = file.metadata().await?.len();
                Ok((len, ReaderStream::with_capacity(file, chunk_size).boxed()))
            }
            UploadSource::Bytes(data) => {
                let data = data.clone();
                let len = data.len();
                let pieces = (0..len).step_by(chunk_size).map(move |start| {
                    let end = (start + chunk_size).min(len);
                    Ok::<_, std::io::Error>(data.slice(start..end))
                });
                Ok((len as u64, stream::iter(pieces).boxed()))
            }
        }
    }
}

/// A file selected for upload, before it is tracked.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub file_name: String,
    pub source: UploadSource,
}

impl PendingUpload {
    /// Upload a local file under its own name.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .ok_or_else(|| BrowseError::Custom(format!("Invalid file path: {}", path.display())))?
            .to_string_lossy()
            .to_string();
        Ok(Self {
            file_name,
            source: UploadSource::File(path),
        })
    }

    /// Upload in-memory bytes as `file_name`.
    pub fn from_bytes(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            source: UploadSource::Bytes(data.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Queued,
    Uploading { progress: f64 },
    Done,
    Failed(String),
}

impl UploadState {
    /// Done or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Done | UploadState::Failed(_))
    }

    pub fn progress(&self) -> f64 {
        match self {
            UploadState::Queued => 0.0,
            UploadState::Uploading { progress } => *progress,
            UploadState::Done => 1.0,
            UploadState::Failed(_) => 0.0,
        }
    }
}

/// One tracked file transfer.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: UploadId,
    pub file_name: String,
    /// Directory the file goes to, fixed at creation
    pub destination: RemotePath,
    pub source: UploadSource,
    pub state: UploadState,
}

impl UploadTask {
    /// The selection this task was created from; enqueue it again to retry.
    pub fn to_pending(&self) -> PendingUpload {
        PendingUpload {
            file_name: self.file_name.clone(),
            source: self.source.clone(),
        }
    }
}

/// Report from a running transfer.
#[derive(Debug)]
pub enum UploadEvent {
    Progress { id: UploadId, fraction: f64 },
    Finished { id: UploadId, result: Result<()> },
}

impl UploadEvent {
    pub fn id(&self) -> UploadId {
        match self {
            UploadEvent::Progress { id, .. } | UploadEvent::Finished { id, .. } => *id,
        }
    }
}

/// What applying an event changed.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Progressed(UploadId),
    /// The file is on the server; listings of `destination` are out of date.
    Completed { id: UploadId, destination: RemotePath },
    Failed(UploadId),
    /// Event for an unknown or already finished task.
    Ignored,
}

/// All uploads of a session, in creation order.
#[derive(Debug, Default)]
pub struct UploadQueue {
    next_id: u64,
    tasks: Vec<UploadTask>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `files` as new `Queued` tasks bound for `destination`.
    pub fn enqueue(&mut self, files: Vec<PendingUpload>, destination: &RemotePath) -> Vec<UploadTask> {
        let created: Vec<UploadTask> = files
            .into_iter()
            .map(|file| {
                self.next_id += 1;
                UploadTask {
                    id: UploadId(self.next_id),
                    file_name: file.file_name,
                    destination: destination.clone(),
                    source: file.source,
                    state: UploadState::Queued,
                }
            })
            .collect();
        self.tasks.extend(created.iter().cloned());
        created
    }

    /// Move a queued task to `Uploading(0)`.
    pub fn start(&mut self, id: UploadId) -> bool {
        match self.get_mut(id) {
            Some(task) if task.state == UploadState::Queued => {
                task.state = UploadState::Uploading { progress: 0.0 };
                true
            }
            _ => false,
        }
    }

    /// Fold a transfer report into its task.
    pub fn apply(&mut self, event: UploadEvent) -> UploadOutcome {
        let Some(task) = self.get_mut(event.id()) else {
            return UploadOutcome::Ignored;
        };
        if task.state.is_terminal() {
            return UploadOutcome::Ignored;
        }

        match event {
            UploadEvent::Progress { id, fraction } => {
                task.state = UploadState::Uploading {
                    progress: fraction.clamp(0.0, 1.0),
                };
                UploadOutcome::Progressed(id)
            }
            UploadEvent::Finished { id, result: Ok(()) } => {
                task.state = UploadState::Done;
                UploadOutcome::Completed {
                    id,
                    destination: task.destination.clone(),
                }
            }
            UploadEvent::Finished { id, result: Err(e) } => {
                task.state = UploadState::Failed(e.to_string());
                UploadOutcome::Failed(id)
            }
        }
    }

    /// Remove a finished task. Queued or running tasks are left alone.
    pub fn dismiss(&mut self, id: UploadId) -> bool {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(index) if self.tasks[index].state.is_terminal() => {
                self.tasks.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Remove every finished task, returning how many went.
    pub fn dismiss_finished(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.state.is_terminal());
        before - self.tasks.len()
    }

    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn get(&self, id: UploadId) -> Option<&UploadTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: UploadId) -> Option<&mut UploadTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Number of tasks not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tasks.iter().filter(|t| !t.state.is_terminal()).count()
    }
}
