//! Thread-local pool of read buffers.

use std::cell::RefCell;

/// Size of each pooled read buffer.
pub const READ_BUFFER_SIZE: usize = 64 * 1024; // 64 KiB

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A reusable, fixed-size read buffer.
///
/// Dropping the buffer returns its allocation to the current thread's pool,
/// so repeated tree builds and delta runs on one thread reuse memory.
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Takes a buffer from the thread-local pool or allocates a new one.
    pub fn take() -> Self {
        let data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_else(|| vec![0u8; READ_BUFFER_SIZE]);
        Self { data }
    }

    /// The whole buffer, for passing to `read`.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The first `len` bytes, after a `read` filled them.
    pub fn filled(&self, len: usize) -> &[u8] {
        &self.data[..len]
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.data.len() == READ_BUFFER_SIZE {
            THREAD_BUFFER_POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(std::mem::take(&mut self.data));
                }
            });
        }
    }
}

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_take() {
        let mut buf = Buffer::take();
        assert_eq!(buf.as_mut_slice().len(), READ_BUFFER_SIZE);
    }

    #[test]
    fn test_buffer_reuse() {
        let ptr = {
            let mut buf = Buffer::take();
            buf.as_mut_slice()[0] = 0xEE;
            buf.data.as_ptr()
        };

        let buf = Buffer::take();
        assert_eq!(buf.data.as_ptr(), ptr, "Dropped buffer should be reused");
        assert_eq!(buf.filled(1), &[0xEE]);
    }
}
