//! Asset loading contract and a file-backed loader.
//!
//! Loaders report through [`LoadCallbacks`], which posts [`LoadEvent`]s onto
//! the scene event queue. Completion consumes the callbacks, so at most one of
//! success or failure is ever reported and progress can only precede it.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;

use crate::error::LoadError;
use crate::events::{EventSender, SceneEvent};

/// A loaded model. Decoding the payload is the renderer's business.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelAsset {
    pub source: PathBuf,
    pub bytes: Vec<u8>,
}

impl ModelAsset {
    /// Node name derived from the file stem.
    pub fn name(&self) -> String {
        self.source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    Progress { path: PathBuf, fraction: f32 },
    Loaded(ModelAsset),
    Failed { path: PathBuf, error: LoadError },
}

/// Completion handle handed to an [`AssetLoader`].
///
/// Dropping it without completing reports [`LoadError::Abandoned`].
#[derive(Debug)]
pub struct LoadCallbacks {
    path: PathBuf,
    events: EventSender,
    completed: bool,
}

impl LoadCallbacks {
    pub fn new(path: impl Into<PathBuf>, events: EventSender) -> Self {
        Self {
            path: path.into(),
            events,
            completed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Report the completed fraction in `[0, 1]`.
    pub fn progress(&mut self, fraction: f32) {
        self.post(LoadEvent::Progress {
            path: self.path.clone(),
            fraction: fraction.clamp(0.0, 1.0),
        });
    }

    pub fn succeed(mut self, asset: ModelAsset) {
        self.completed = true;
        self.post(LoadEvent::Loaded(asset));
    }

    pub fn fail(mut self, error: LoadError) {
        self.completed = true;
        let path = self.path.clone();
        self.post(LoadEvent::Failed { path, error });
    }

    fn post(&self, event: LoadEvent) {
        // A closed queue means the loop is gone; there is nobody left to tell.
        let _ = self.events.send(SceneEvent::Load(event));
    }
}

impl Drop for LoadCallbacks {
    fn drop(&mut self) {
        if !self.completed {
            let path = self.path.clone();
            self.post(LoadEvent::Failed {
                error: LoadError::Abandoned { path: path.clone() },
                path,
            });
        }
    }
}

/// Resolves resource paths to models asynchronously.
pub trait AssetLoader {
    /// Start loading `path`. Must not block the caller.
    fn load(&mut self, path: &Path, callbacks: LoadCallbacks);
}

/// Reads model files on a worker thread, reporting progress per chunk.
#[derive(Debug, Clone)]
pub struct FileAssetLoader {
    root: PathBuf,
    chunk_size: usize,
}

impl FileAssetLoader {
    pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

    /// Relative paths are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&mut self, path: &Path, callbacks: LoadCallbacks) {
        let full_path = self.resolve(path);
        let chunk_size = self.chunk_size;
        let spawned = thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || read_with_progress(&full_path, chunk_size, callbacks));
        if let Err(e) = spawned {
            // The closure (and with it the callbacks) was dropped, which
            // already reported the load as abandoned.
            tracing::error!("failed to spawn asset loader thread: {e}");
        }
    }
}

/// Read `path` in `chunk_size` pieces, reporting progress, then complete.
pub fn read_with_progress(path: &Path, chunk_size: usize, mut callbacks: LoadCallbacks) {
    let io_error = |e: std::io::Error| LoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return callbacks.fail(io_error(e)),
    };
    let total = match file.metadata() {
        Ok(meta) => meta.len() as usize,
        Err(e) => return callbacks.fail(io_error(e)),
    };
    if total == 0 {
        return callbacks.fail(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let mut bytes = Vec::with_capacity(total);
    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                bytes.extend_from_slice(&chunk[..n]);
                callbacks.progress((bytes.len() as f64 / total as f64) as f32);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return callbacks.fail(io_error(e)),
        }
    }

    callbacks.succeed(ModelAsset {
        source: path.to_path_buf(),
        bytes,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventReceiver, event_queue};
    use std::time::Duration;

    fn load_events(rx: &EventReceiver) -> Vec<LoadEvent> {
        rx.try_iter()
            .map(|event| match event {
                SceneEvent::Load(load) => load,
                other => panic!("unexpected event {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_progress_precedes_single_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plane.gltf");
        std::fs::write(&path, vec![7u8; 10]).unwrap();

        let (tx, rx) = event_queue();
        read_with_progress(&path, 4, LoadCallbacks::new(&path, tx));

        let events = load_events(&rx);
        assert_eq!(events.len(), 4);
        let fractions: Vec<f32> = events[..3]
            .iter()
            .map(|e| match e {
                LoadEvent::Progress { fraction, .. } => *fraction,
                other => panic!("expected progress, got {other:?}"),
            })
            .collect();
        assert_eq!(fractions, [0.4, 0.8, 1.0]);
        match &events[3] {
            LoadEvent::Loaded(asset) => {
                assert_eq!(asset.bytes.len(), 10);
                assert_eq!(asset.name(), "plane");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_fails_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.gltf");
        let (tx, rx) = event_queue();
        read_with_progress(&path, 4, LoadCallbacks::new(&path, tx));

        let events = load_events(&rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            LoadEvent::Failed {
                error: LoadError::Io { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.gltf");
        std::fs::write(&path, b"").unwrap();
        let (tx, rx) = event_queue();
        read_with_progress(&path, 4, LoadCallbacks::new(&path, tx));
        assert!(matches!(
            load_events(&rx).as_slice(),
            [LoadEvent::Failed {
                error: LoadError::Empty { .. },
                ..
            }]
        ));
    }

    #[test]
    fn test_dropped_callbacks_report_abandoned() {
        let (tx, rx) = event_queue();
        drop(LoadCallbacks::new("model.gltf", tx));
        assert!(matches!(
            load_events(&rx).as_slice(),
            [LoadEvent::Failed {
                error: LoadError::Abandoned { .. },
                ..
            }]
        ));
    }

    #[test]
    fn test_file_loader_runs_off_thread() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a380.gltf"), b"{\"asset\":{}}").unwrap();

        let (tx, rx) = event_queue();
        let mut loader = FileAssetLoader::new(dir.path());
        loader.load(
            Path::new("a380.gltf"),
            LoadCallbacks::new("a380.gltf", tx),
        );

        let mut loaded = None;
        while let Ok(event) = rx.recv_timeout(Duration::from_secs(5)) {
            if let SceneEvent::Load(LoadEvent::Loaded(asset)) = event {
                loaded = Some(asset);
                break;
            }
        }
        let asset = loaded.expect("loader thread should complete");
        assert_eq!(asset.source, dir.path().join("a380.gltf"));
    }
}
