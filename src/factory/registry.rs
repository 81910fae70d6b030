//! Socket registry

use super::handle::SocketHandle;
use socket2::Socket;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

static GLOBAL_REGISTRY: OnceLock<Arc<SocketRegistry>> = OnceLock::new();

/// The registry shared by every factory that was not given its own
pub fn global_registry() -> Arc<SocketRegistry> {
    GLOBAL_REGISTRY
        .get_or_init(|| Arc::new(SocketRegistry::new()))
        .clone()
}

/// Append-only log of created sockets, in creation order
///
/// Entries are never removed. An entry holds a weak reference, so it reports
/// the socket as closed once every [`SocketHandle`] for it has been dropped.
#[derive(Debug, Default)]
pub struct SocketRegistry {
    entries: Mutex<Vec<Weak<Socket>>>,
}

impl SocketRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Record a socket and hand back its handle
    pub(crate) fn register(&self, socket: Socket) -> SocketHandle {
        let socket = Arc::new(socket);
        let mut entries = self.lock();
        let id = entries.len() as u64;
        entries.push(Arc::downgrade(&socket));
        SocketHandle::new(id, socket)
    }

    /// Number of sockets ever recorded
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of every entry, in creation order
    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.lock()
            .iter()
            .enumerate()
            .map(|(id, socket)| RegistryEntry {
                id: id as u64,
                socket: socket.clone(),
            })
            .collect()
    }

    /// Look up one entry by id
    pub fn get(&self, id: u64) -> Option<RegistryEntry> {
        let index = usize::try_from(id).ok()?;
        self.lock().get(index).map(|socket| RegistryEntry {
            id,
            socket: socket.clone(),
        })
    }

    /// Handles to every recorded socket that is still open
    pub fn open_sockets(&self) -> Vec<SocketHandle> {
        self.entries()
            .iter()
            .filter_map(RegistryEntry::socket)
            .collect()
    }

    // Appends cannot leave the vector half-written, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<Weak<Socket>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One recorded socket
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    id: u64,
    socket: Weak<Socket>,
}

impl RegistryEntry {
    /// Creation index
    pub fn id(&self) -> u64 {
        self.id
    }

    /// A handle to the socket, if some holder still has it open
    pub fn socket(&self) -> Option<SocketHandle> {
        self.socket
            .upgrade()
            .map(|socket| SocketHandle::new(self.id, socket))
    }

    /// True once every holder has dropped the socket
    pub fn is_closed(&self) -> bool {
        self.socket.strong_count() == 0
    }
}
