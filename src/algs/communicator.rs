//! Thin façade over intra-process (Rayon) or inter-process (MPI) message passing.
//!
//! Messages are contiguous byte slices. Every handle is waitable; callers
//! `.wait()` before trusting a receive buffer. The only collective the
//! forest needs, [`Communicator::broadcast`], has a default built from
//! point-to-point messages.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::mesh_error::MeshForestError;

/// Base tag of a message family; `offset` separates rounds within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn base(self) -> u16 {
        self.0
    }

    pub const fn offset(self, k: u16) -> u16 {
        self.0.wrapping_add(k)
    }
}

/// Tag used by tree reordering to broadcast the partition vector.
pub const REORDER_TAG: CommTag = CommTag(0x4f52);

/// Non-blocking communication interface (minimal by design).
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// True for the serial stand-in, where no message ever travels.
    fn is_no_comm(&self) -> bool {
        false
    }

    /// Copy `root`'s `buf` into every other rank's `buf`.
    ///
    /// All ranks must pass buffers of the same length.
    fn broadcast(&self, root: usize, tag: u16, buf: &mut [u8]) -> Result<(), MeshForestError> {
        let (rank, size) = (self.rank(), self.size());
        if root >= size {
            return Err(MeshForestError::InvalidRank { rank: root, size });
        }
        if size == 1 {
            return Ok(());
        }
        if rank == root {
            let sends: Vec<_> = (0..size)
                .filter(|&peer| peer != root)
                .map(|peer| self.isend(peer, tag, buf))
                .collect();
            for s in sends {
                s.wait();
            }
            return Ok(());
        }
        let expected = buf.len();
        let data = self.irecv(root, tag, buf).wait().ok_or_else(|| {
            MeshForestError::Communication(format!("rank {rank}: no broadcast from {root}"))
        })?;
        if data.len() != expected {
            return Err(MeshForestError::Communication(format!(
                "rank {rank}: broadcast carried {} bytes, expected {expected}",
                data.len()
            )));
        }
        buf.copy_from_slice(&data);
        Ok(())
    }
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Serial communicator: rank 0 of 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}
    fn is_no_comm(&self) -> bool {
        true
    }
}

// --- RayonComm: intra-process / multi-thread ---
type Key = (usize, usize, u16); // (src, dst, tag)

static MAILBOX: Lazy<DashMap<Key, VecDeque<Bytes>>> = Lazy::new(DashMap::new);

fn take_message(key: &Key) -> Option<Bytes> {
    let mut queue = MAILBOX.get_mut(key)?;
    queue.pop_front()
}

/// Receive handle of [`RayonComm`]: a thread polling the mailbox.
pub struct LocalHandle {
    buf: Arc<Mutex<Option<Vec<u8>>>>,
    handle: Option<JoinHandle<()>>,
}

impl Wait for LocalHandle {
    fn wait(mut self) -> Option<Vec<u8>> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let mut guard = self.buf.lock().ok()?;
        guard.take()
    }
}

/// In-process ranks exchanging messages through a global mailbox.
///
/// Messages between the same `(src, dst, tag)` are delivered in send order.
/// Tests that share tags must not run concurrently.
#[derive(Clone, Debug)]
pub struct RayonComm {
    rank: usize,
    size: usize,
}

impl RayonComm {
    pub fn new(rank: usize, size: usize) -> Self {
        debug_assert!(rank < size, "rank {rank} out of range for size {size}");
        Self { rank, size }
    }
}

impl Communicator for RayonComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
        let key = (self.rank, peer, tag);
        MAILBOX
            .entry(key)
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> LocalHandle {
        let key = (peer, self.rank, tag);
        let buf_arc = Arc::new(Mutex::new(None));
        let buf_arc_clone = buf_arc.clone();
        let buf_len = buf.len();
        let handle = std::thread::spawn(move || {
            loop {
                if let Some(bytes) = take_message(&key) {
                    let n = buf_len.min(bytes.len());
                    if let Ok(mut guard) = buf_arc_clone.lock() {
                        *guard = Some(bytes[..n].to_vec());
                    }
                    break;
                }
                std::thread::yield_now();
            }
        });
        LocalHandle {
            buf: buf_arc,
            handle: Some(handle),
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, Wait};
    use crate::mesh_error::MeshForestError;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Destination, Root, Source};

    /// World communicator of an MPI job.
    ///
    /// Point-to-point messages complete eagerly inside `isend`/`irecv`;
    /// broadcast maps to the native collective.
    pub struct MpiComm {
        _universe: Universe,
        pub world: SimpleCommunicator,
        pub rank: usize,
        pub size: usize,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, MeshForestError> {
            let universe = mpi::initialize().ok_or_else(|| {
                MeshForestError::Communication("MPI is already initialized".into())
            })?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    /// A completed MPI operation and the bytes it received, if any.
    pub struct MpiHandle(Option<Vec<u8>>);

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, tag as i32);
            MpiHandle(None)
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            self.world
                .process_at_rank(peer as i32)
                .receive_into_with_tag(buf, tag as i32);
            MpiHandle(Some(buf.to_vec()))
        }

        fn broadcast(
            &self,
            root: usize,
            _tag: u16,
            buf: &mut [u8],
        ) -> Result<(), MeshForestError> {
            if root >= self.size {
                return Err(MeshForestError::InvalidRank {
                    rank: root,
                    size: self.size,
                });
            }
            self.world.process_at_rank(root as i32).broadcast_into(buf);
            Ok(())
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
