use std::io;
use std::ptr::{self, NonNull};

use crate::{ExecAllocator, JitError, JitFunction};

const FALLBACK_PAGE_SIZE: usize = 4096;

/// Maps code buffers into fresh read/execute pages, one mapping per call.
#[derive(Debug)]
pub struct JitRuntime {
    page_size: usize,
    mapped: usize,
}

impl JitRuntime {
    pub fn new() -> Self {
        Self {
            page_size: host_page_size(),
            mapped: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of successful mappings made by this runtime.
    pub fn mapped_count(&self) -> usize {
        self.mapped
    }

    fn round_to_pages(&self, len: usize) -> Option<usize> {
        let mask = self.page_size - 1;
        len.checked_add(mask).map(|v| v & !mask)
    }
}

impl Default for JitRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecAllocator for JitRuntime {
    type Code = ExecutableCode;

    fn map_executable(&mut self, code: &[u8]) -> Result<ExecutableCode, JitError> {
        if code.is_empty() {
            return Err(JitError::EmptyCode);
        }
        let capacity = self
            .round_to_pages(code.len())
            .ok_or(JitError::TooLarge { len: code.len() })?;

        // SAFETY: anonymous private mapping; no existing memory is touched.
        let raw = unsafe {
            libc::mmap(
                ptr::null_mut(),
                capacity,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANON,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(JitError::Map {
                len: capacity,
                source: io::Error::last_os_error(),
            });
        }
        let Some(ptr) = NonNull::new(raw.cast::<u8>()) else {
            return Err(JitError::Map {
                len: capacity,
                source: io::Error::other("mmap returned a null mapping"),
            });
        };

        // From here on, dropping `region` unmaps the pages.
        let region = ExecutableCode {
            ptr,
            len: code.len(),
            capacity,
        };

        // SAFETY: the mapping is writable and at least `code.len()` bytes long.
        unsafe { ptr::copy_nonoverlapping(code.as_ptr(), region.ptr.as_ptr(), code.len()) };

        // SAFETY: `raw`/`capacity` describe the mapping created above.
        let rc = unsafe { libc::mprotect(raw, capacity, libc::PROT_READ | libc::PROT_EXEC) };
        if rc != 0 {
            return Err(JitError::Protect {
                source: io::Error::last_os_error(),
            });
        }
        flush_icache(region.ptr.as_ptr(), region.len);

        self.mapped += 1;
        tracing::trace!(len = region.len, capacity, "mapped executable code");
        Ok(region)
    }
}

/// Read/execute pages holding one code buffer. Unmapped on drop.
pub struct ExecutableCode {
    ptr: NonNull<u8>,
    len: usize,
    capacity: usize,
}

impl ExecutableCode {
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The mapped bytes.
    pub fn bytes(&self) -> &[u8] {
        // SAFETY: the mapping stays readable and holds `len` initialised bytes until drop.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl JitFunction for ExecutableCode {
    unsafe fn call(&self) {
        // SAFETY: the caller guarantees the bytes are a valid host function; the pages are RX.
        unsafe {
            let func: extern "C" fn() = std::mem::transmute(self.ptr.as_ptr());
            func();
        }
    }
}

impl Drop for ExecutableCode {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`capacity` describe a live mapping owned by this value.
        let rc = unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.capacity) };
        if rc != 0 {
            tracing::warn!(
                capacity = self.capacity,
                "munmap failed: {}",
                io::Error::last_os_error()
            );
        }
    }
}

fn host_page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    match usize::try_from(raw) {
        Ok(size) if size.is_power_of_two() => size,
        _ => FALLBACK_PAGE_SIZE,
    }
}

#[cfg(all(target_arch = "aarch64", target_os = "linux"))]
fn flush_icache(ptr: *mut u8, len: usize) {
    extern "C" {
        fn __clear_cache(start: *mut libc::c_char, end: *mut libc::c_char);
    }
    // SAFETY: the range lies within a live mapping.
    unsafe { __clear_cache(ptr.cast(), ptr.add(len).cast()) };
}

#[cfg(all(target_arch = "aarch64", target_os = "macos"))]
fn flush_icache(ptr: *mut u8, len: usize) {
    extern "C" {
        fn sys_icache_invalidate(start: *mut libc::c_void, len: usize);
    }
    // SAFETY: the range lies within a live mapping.
    unsafe { sys_icache_invalidate(ptr.cast(), len) };
}

// x86 keeps instruction and data caches coherent.
#[cfg(not(all(target_arch = "aarch64", any(target_os = "linux", target_os = "macos"))))]
fn flush_icache(_ptr: *mut u8, _len: usize) {}
