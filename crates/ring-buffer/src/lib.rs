//! Bounded Ring Buffer
//!
//! Fixed-capacity FIFO that evicts its oldest entry on overflow. Writers are
//! serialized internally, so a shared `&RingBuffer` is safe across threads.

mod buffer;

pub use buffer::{RingBuffer, DEFAULT_CAPACITY};
