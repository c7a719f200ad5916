use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;

use super::constants::MOOD_SCHEMA_VERSION;
use super::types::PetMoodState;
use crate::error::{PetError, PetResult};

/// Where the mood record lives between runs.
pub trait MoodStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> PetResult<Option<PetMoodState>>;

    fn save(&self, state: &PetMoodState) -> PetResult<()>;
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Single JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MoodStore for JsonFileStore {
    fn load(&self) -> PetResult<Option<PetMoodState>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state: PetMoodState = serde_json::from_str(&data)?;
        if state.version > MOOD_SCHEMA_VERSION {
            log::warn!(
                "Mood record {} has version {} (newer than {}), loading best effort",
                self.path.display(),
                state.version,
                MOOD_SCHEMA_VERSION
            );
        }
        Ok(Some(state))
    }

    fn save(&self, state: &PetMoodState) -> PetResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Shared in-memory record. Clones see the same slot, so a test can inspect
/// what a service saved. `set_failing(true)` makes every call error.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<PetMoodState>>>,
    saves: Rc<Cell<u32>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PetMoodState) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(state);
        store
    }

    pub fn snapshot(&self) -> Option<PetMoodState> {
        self.slot.borrow().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u32 {
        self.saves.get()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn unavailable() -> PetError {
        PetError::Io(io::Error::new(io::ErrorKind::Other, "store unavailable"))
    }
}

impl MoodStore for MemoryStore {
    fn load(&self) -> PetResult<Option<PetMoodState>> {
        if self.failing.get() {
            return Err(Self::unavailable());
        }
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, state: &PetMoodState) -> PetResult<()> {
        if self.failing.get() {
            return Err(Self::unavailable());
        }
        *self.slot.borrow_mut() = Some(state.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Background writer
// ---------------------------------------------------------------------------

enum Command {
    Save(PetMoodState),
    Load(mpsc::Sender<PetResult<Option<PetMoodState>>>),
}

/// Moves the wrapped store onto a writer thread. `save` only enqueues a
/// snapshot, so the render loop never waits on disk; write failures are
/// logged on the worker. Dropping the store drains pending writes.
pub struct BackgroundStore {
    tx: Option<mpsc::Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl BackgroundStore {
    pub fn spawn<S>(inner: S) -> Self
    where
        S: MoodStore + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Command>();
        let worker = thread::Builder::new()
            .name("petpal-store".into())
            .spawn(move || {
                for cmd in rx {
                    match cmd {
                        Command::Save(state) => {
                            if let Err(e) = inner.save(&state) {
                                log::warn!("Failed to save mood: {e}");
                            }
                        }
                        Command::Load(reply) => {
                            let _ = reply.send(inner.load());
                        }
                    }
                }
            })
            .ok();

        if worker.is_none() {
            log::warn!("Could not start store writer thread; saves will be dropped");
        }

        Self {
            tx: worker.as_ref().map(|_| tx),
            worker,
        }
    }

    fn send(&self, cmd: Command) -> PetResult<()> {
        match &self.tx {
            Some(tx) => tx.send(cmd).map_err(|_| disconnected()),
            None => Err(disconnected()),
        }
    }
}

fn disconnected() -> PetError {
    PetError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "store writer stopped"))
}

impl MoodStore for BackgroundStore {
    /// Blocks until the worker has read the record.
    fn load(&self) -> PetResult<Option<PetMoodState>> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(Command::Load(reply_tx))?;
        reply_rx.recv().map_err(|_| disconnected())?
    }

    fn save(&self, state: &PetMoodState) -> PetResult<()> {
        self.send(Command::Save(state.clone()))
    }
}

impl Drop for BackgroundStore {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
