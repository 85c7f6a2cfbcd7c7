//! Upload scheduling.

use std::sync::Arc;

use tracing::debug;

use super::{Browser, BrowserEvent};
use crate::progress::{ProgressCallback, TransferProgress};
use crate::upload::{PendingUpload, UploadEvent, UploadId, UploadTask};

impl Browser {
    /// Start uploading `files` into the active directory.
    ///
    /// Every file gets its own task and its own transfer; all of them run at
    /// once. The tasks are returned immediately, already `Uploading(0)`.
    pub fn enqueue(&mut self, files: Vec<PendingUpload>) -> Vec<UploadTask> {
        let destination = self.path().clone();
        let mut created = self.uploads.enqueue(files, &destination);

        for task in &mut created {
            self.spawn_transfer(task);
            self.uploads.start(task.id);
            if let Some(started) = self.uploads.get(task.id) {
                task.state = started.state.clone();
            }
        }
        created
    }

    /// Start a new upload of the same file as a finished task, into the
    /// same directory it originally targeted.
    pub fn retry(&mut self, id: UploadId) -> Option<UploadTask> {
        let task = self.uploads.get(id)?;
        if !task.state.is_terminal() {
            return None;
        }
        let file = task.to_pending();
        let destination = task.destination.clone();

        let mut created = self.uploads.enqueue(vec![file], &destination);
        let mut task = created.pop()?;
        self.spawn_transfer(&task);
        self.uploads.start(task.id);
        task.state = self.uploads.get(task.id)?.state.clone();
        Some(task)
    }

    /// Remove a finished upload from the list. Returns `false`, changing
    /// nothing, for unknown tasks and tasks still queued or uploading.
    pub fn dismiss(&mut self, id: UploadId) -> bool {
        self.uploads.dismiss(id)
    }

    /// Remove every finished upload.
    pub fn dismiss_finished(&mut self) -> usize {
        self.uploads.dismiss_finished()
    }

    /// All uploads not yet dismissed, oldest first.
    pub fn uploads(&self) -> &[UploadTask] {
        self.uploads.tasks()
    }

    pub fn upload(&self, id: UploadId) -> Option<&UploadTask> {
        self.uploads.get(id)
    }

    fn spawn_transfer(&self, task: &UploadTask) {
        debug!(upload = %task.id, file = %task.file_name, destination = %task.destination, "starting upload");

        let id = task.id;
        let destination = task.destination.clone();
        let file = task.to_pending();
        let api = Arc::clone(&self.api);
        let tx = self.sender();

        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let progress: ProgressCallback = Box::new(move |p: &TransferProgress| {
                let _ = progress_tx.send(BrowserEvent::Upload(UploadEvent::Progress {
                    id,
                    fraction: p.fraction(),
                }));
            });

            let result = api.upload(&destination, file, progress).await;
            let _ = tx.send(BrowserEvent::Upload(UploadEvent::Finished { id, result }));
        });
    }
}
