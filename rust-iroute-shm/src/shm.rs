//! Low-level POSIX shared memory regions.

use bytes::Bytes;
use log::{error, warn};
use rust_iroute_common::{Error, Result};
use rustix::fs::ftruncate;
use rustix::fd::OwnedFd;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use rustix::shm::{shm_open, shm_unlink, Mode, ShmOFlags};
use std::ffi::CString;
use std::ptr::NonNull;

/// Handle to one fixed-capacity mapped region.
///
/// Creation is idempotent with respect to a pre-existing region of the same
/// name: `shm_open` with `CREATE` (without `EXCL`) opens rather than fails,
/// so either side of the channel may come up first. On drop the mapping is
/// released and the name unlinked; both are best-effort, failures are
/// logged only.
pub struct ShmRegion {
    // Held so the descriptor outlives the mapping; closed on drop.
    #[allow(dead_code)]
    fd: OwnedFd,
    addr: NonNull<u8>,
    capacity: usize,
    name: String,
}

// SAFETY: the handle itself is plain data; cross-process access to the
// mapped bytes is governed by the alternating-turn header protocol, not by
// this type.
unsafe impl Send for ShmRegion {}
unsafe impl Sync for ShmRegion {}

impl ShmRegion {
    /// Create the region, or open it if the peer already created it, and
    /// map it read-write at the requested capacity.
    pub fn create_or_open(name: &str, capacity: usize) -> Result<Self> {
        let c_name = CString::new(name)
            .map_err(|_| Error::Mapping(format!("region name {name:?} contains a NUL byte")))?;

        // 0666: both processes run as plain users and need write access.
        let fd = shm_open(
            c_name.as_c_str(),
            ShmOFlags::CREATE | ShmOFlags::RDWR,
            Mode::RUSR | Mode::WUSR | Mode::RGRP | Mode::WGRP | Mode::ROTH | Mode::WOTH,
        )
        .map_err(|e| Error::Mapping(format!("shm_open {name}: {e}")))?;

        ftruncate(&fd, capacity as u64)
            .map_err(|e| Error::Mapping(format!("ftruncate {name} to {capacity}: {e}")))?;

        let addr = unsafe {
            mmap(
                std::ptr::null_mut(),
                capacity,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                &fd,
                0,
            )
            .map_err(|e| Error::Mapping(format!("mmap {name}: {e}")))?
        };
        let addr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| Error::Mapping(format!("mmap {name} returned null")))?;

        Ok(Self {
            fd,
            addr,
            capacity,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Zero the whole region. Done once at bridge construction so a stale
    /// header from a previous run cannot be mistaken for a peer response.
    pub fn clear(&self) {
        unsafe {
            std::ptr::write_bytes(self.addr.as_ptr(), 0, self.capacity);
        }
    }

    /// Copy `data` into the region starting at offset 0.
    ///
    /// Writes longer than the capacity are rejected rather than truncated
    /// or overflowed.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        if data.len() > self.capacity {
            return Err(Error::BufferOverflow {
                len: data.len(),
                capacity: self.capacity,
            });
        }
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.addr.as_ptr(), data.len());
        }
        Ok(())
    }

    /// Read at most `max_len` bytes from the start of the region, stopping
    /// at the first NUL byte. Payloads on the wire are ASCII with no
    /// explicit terminator, so this is the printable prefix.
    pub fn read(&self, max_len: usize) -> Bytes {
        let bounded = max_len.min(self.capacity);
        let raw = unsafe { std::slice::from_raw_parts(self.addr.as_ptr(), bounded) };
        let end = raw.iter().position(|&b| b == 0).unwrap_or(bounded);
        Bytes::copy_from_slice(&raw[..end])
    }

    /// `read`, decoded as a lossy UTF-8 string.
    pub fn read_string(&self, max_len: usize) -> String {
        String::from_utf8_lossy(&self.read(max_len)).into_owned()
    }
}

impl Drop for ShmRegion {
    fn drop(&mut self) {
        if let Err(e) = unsafe { munmap(self.addr.as_ptr().cast(), self.capacity) } {
            error!("munmap {}: {e}", self.name);
        }
        match CString::new(self.name.clone()) {
            Ok(c_name) => {
                if let Err(e) = shm_unlink(c_name.as_c_str()) {
                    // The peer may have unlinked first.
                    warn!("shm_unlink {}: {e}", self.name);
                }
            }
            Err(_) => warn!("shm_unlink skipped, bad name {:?}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trip() {
        let region = ShmRegion::create_or_open("/iroute_test_rw", 64).unwrap();
        region.clear();

        region.write(b"0 1 5/").unwrap();
        assert_eq!(region.read(64).as_ref(), b"0 1 5/");
        assert_eq!(region.read_string(3), "0 1");
    }

    #[test]
    fn second_open_sees_first_writers_bytes() {
        let first = ShmRegion::create_or_open("/iroute_test_shared", 32).unwrap();
        first.clear();
        first.write(b"ai/00000004").unwrap();

        let second = ShmRegion::create_or_open("/iroute_test_shared", 32).unwrap();
        assert_eq!(second.read_string(11), "ai/00000004");

        drop(second);
        drop(first);
    }

    #[test]
    fn oversized_write_is_rejected() {
        let region = ShmRegion::create_or_open("/iroute_test_overflow", 8).unwrap();
        region.clear();

        let err = region.write(b"123456789").unwrap_err();
        assert!(matches!(
            err,
            Error::BufferOverflow { len: 9, capacity: 8 }
        ));
        // Region is untouched after a rejected write.
        assert_eq!(region.read(8).len(), 0);
    }

    #[test]
    fn read_is_bounded_by_capacity() {
        let region = ShmRegion::create_or_open("/iroute_test_bounds", 4).unwrap();
        region.clear();
        region.write(b"abcd").unwrap();
        assert_eq!(region.read(1024).as_ref(), b"abcd");
    }
}
