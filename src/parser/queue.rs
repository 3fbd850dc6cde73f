//! Growable byte queue used for script text and token assembly.
//!
//! The backing buffer is shared behind an `Rc` so that cloning a queue (which
//! is what an input checkpoint does) only copies the read cursor. Appending
//! to a queue whose buffer is shared with a checkpoint copies on write.

use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct ByteQueue {
    buf: Rc<Vec<u8>>,
    start: usize,
}

impl ByteQueue {
    pub fn new() -> Self {
        ByteQueue::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteQueue {
            buf: Rc::new(Vec::with_capacity(capacity)),
            start: 0,
        }
    }

    /// Append bytes at the tail of the queue.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        let buf = Rc::make_mut(&mut self.buf);
        if self.start > 0 && self.start == buf.len() {
            // Fully consumed, reuse the allocation.
            buf.clear();
            self.start = 0;
        }
        buf.extend_from_slice(bytes);
    }

    pub fn put_byte(&mut self, b: u8) {
        self.put_bytes(&[b]);
    }

    /// Consume one byte from the head of the queue.
    pub fn getc(&mut self) -> Option<u8> {
        let b = self.buf.get(self.start).copied();
        if b.is_some() {
            self.start += 1;
        }
        b
    }

    /// Return the last consumed byte to the head of the queue.
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.start).copied()
    }

    pub fn len(&self) -> usize {
        self.buf.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    /// Discard all queued bytes.
    pub fn flush(&mut self) {
        if Rc::get_mut(&mut self.buf).is_some() {
            Rc::make_mut(&mut self.buf).clear();
        } else {
            self.buf = Rc::new(Vec::new());
        }
        self.start = 0;
    }

    /// Drain the queue into a string, replacing invalid UTF-8 sequences.
    pub fn take_string(&mut self) -> String {
        let s = String::from_utf8_lossy(self.as_bytes()).into_owned();
        self.flush();
        s
    }
}
