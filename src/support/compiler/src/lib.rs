mod cancellation;
mod options;

pub use cancellation::{CancellationToken, Cancelled};
pub use options::{BuildOptions, Capabilities};
