//! Ring configuration

use crate::error::{Error, Result};
use crate::flags::SetupFlags;
use std::time::Duration;

/// Largest SQ depth the kernel accepts without `SetupFlags::CLAMP`
pub const MAX_QUEUE_DEPTH: u32 = 32768;

/// Depth used by [`RingConfig::default`]
pub const DEFAULT_QUEUE_DEPTH: u32 = 64;

/// Configuration for a [`Ring`](crate::Ring)
///
/// ```
/// use std::time::Duration;
/// use uring_core::RingConfig;
///
/// let config = RingConfig::new(32)
///     .feature("SINGLE_ISSUER", true)?
///     .with_wait_timeout(Duration::from_millis(50));
/// assert_eq!(config.queue_depth, 32);
/// # Ok::<(), uring_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingConfig {
    /// Requested number of submission slots (rounded up to a power of two)
    pub queue_depth: u32,

    /// Setup flags handed to the kernel
    pub flags: SetupFlags,

    /// Timeout applied by [`Ring::next_completion`](crate::Ring::next_completion)
    pub wait_timeout: Option<Duration>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            flags: SetupFlags::empty(),
            wait_timeout: None,
        }
    }
}

impl RingConfig {
    /// Configuration with the given depth and no optional features
    pub fn new(queue_depth: u32) -> Self {
        Self {
            queue_depth,
            ..Self::default()
        }
    }

    /// Replace the setup flags
    pub fn with_flags(mut self, flags: SetupFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the default wait timeout
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// Turn a named capability on or off
    ///
    /// Names are the [`SetupFlags`] constant names, e.g. `"SQPOLL"`.
    pub fn feature(mut self, name: &str, enabled: bool) -> Result<Self> {
        let flag = SetupFlags::from_name(name)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown feature `{}`", name)))?;
        self.flags.set(flag, enabled);
        Ok(self)
    }

    /// Apply a whole capability map at once
    pub fn features<'a, I>(self, features: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        features
            .into_iter()
            .try_fold(self, |config, (name, enabled)| config.feature(name, enabled))
    }

    /// Check the configuration before the kernel sees it
    pub fn validate(&self) -> Result<()> {
        if self.queue_depth == 0 {
            return Err(Error::InvalidConfig("queue depth must be positive".into()));
        }
        if self.queue_depth > MAX_QUEUE_DEPTH && !self.flags.contains(SetupFlags::CLAMP) {
            return Err(Error::InvalidConfig(format!(
                "queue depth {} exceeds {}",
                self.queue_depth, MAX_QUEUE_DEPTH
            )));
        }
        if self.flags.contains(SetupFlags::SQ_AFF) && !self.flags.contains(SetupFlags::SQPOLL) {
            return Err(Error::InvalidConfig("SQ_AFF requires SQPOLL".into()));
        }
        if self.flags.contains(SetupFlags::DEFER_TASKRUN)
            && !self.flags.contains(SetupFlags::SINGLE_ISSUER)
        {
            return Err(Error::InvalidConfig(
                "DEFER_TASKRUN requires SINGLE_ISSUER".into(),
            ));
        }
        Ok(())
    }
}
