//! Time-series containers and signal transforms.
//!
//! The batch container ([`TimeSeries`]) holds a whole recorded procedure;
//! the streaming container ([`StreamingSeries`]) retains only the trailing
//! window a live session needs. Both are driven by the same transform
//! kernels in [`kernels`], so the batch and streaming paths cannot drift
//! apart numerically: the two call sites differ only in the record slice
//! they hand the kernel.

pub mod batch;
pub mod kernels;
pub mod record;
pub mod streaming;
pub mod window;

pub use batch::TimeSeries;
pub use kernels::{squared_distance, GAUSSIAN_CUTOFF_SIGMAS};
pub use record::TimeRecord;
pub use streaming::StreamingSeries;
pub use window::SampleWindow;
