mod privacy;
mod target;

pub use privacy::Privacy;
pub use target::{AttributeTarget, TargetSet};
