//! Pool and registry configuration parameters.

/// What a pool does with a record whose grouping key is
/// [`KeyValue::Absent`](regroup_core::KeyValue::Absent).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingKeyPolicy {
    /// Group such records under the `Absent` key.
    #[default]
    Group,
    /// Fail the run with [`GroupError::MissingKey`](regroup_core::GroupError::MissingKey).
    Reject,
}

/// Configuration for a single [`GroupPool`](crate::GroupPool).
///
/// Immutable once the pool is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Handling of records without the grouping attribute.
    ///
    /// Default: [`MissingKeyPolicy::Group`].
    pub missing_key: MissingKeyPolicy,

    /// Number of groups to reserve space for on creation.
    ///
    /// Default: 0 (grow on demand).
    pub initial_capacity: usize,
}

impl PoolConfig {
    /// Default initial group capacity.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 0;

    /// Create a pool config with default values.
    pub fn new() -> Self {
        Self {
            missing_key: MissingKeyPolicy::default(),
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Same config, rejecting records without the grouping attribute.
    #[must_use]
    pub fn reject_missing(mut self) -> Self {
        self.missing_key = MissingKeyPolicy::Reject;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`PoolRegistry`](crate::PoolRegistry).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Config applied to every pool the registry creates, including
    /// unregistered scratch pools.
    pub pool: PoolConfig,

    /// Maximum number of registered pools.
    ///
    /// Default: `None` (unbounded). Registered pools are only released
    /// through [`PoolRegistry::remove`](crate::PoolRegistry::remove) or
    /// [`PoolRegistry::clear`](crate::PoolRegistry::clear), so a host that
    /// mints memo ids dynamically should set a limit.
    pub max_pools: Option<usize>,
}

impl RegistryConfig {
    /// Create a registry config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same config with a pool limit.
    #[must_use]
    pub fn with_max_pools(mut self, max_pools: usize) -> Self {
        self.max_pools = Some(max_pools);
        self
    }
}
