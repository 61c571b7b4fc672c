use std::num::NonZero;

#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub capabilities: Capabilities,
    pub available_parallelism: NonZero<usize>,
    pub warn_unread_parameters: bool,
}

impl BuildOptions {
    pub fn single_threaded() -> Self {
        Self {
            available_parallelism: NonZero::<usize>::MIN,
            ..Self::default()
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        let available_parallelism = NonZero::new(num_cpus::get()).unwrap_or(NonZero::<usize>::MIN);

        Self {
            capabilities: Capabilities::default(),
            available_parallelism,
            warn_unread_parameters: true,
        }
    }
}

/// What the eventual backend/runtime is able to express.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Overrides may narrow a reference return type (needed for clone methods
    /// that return the derived record rather than the root record)
    pub covariant_returns: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            covariant_returns: true,
        }
    }
}
