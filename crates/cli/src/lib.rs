//! Library half of the `hush` binary: debounce lines of text

pub mod pipe;
pub mod util;
