//! Prefix policy and display settings.
//!
//! A [`Configuration`] can be built and passed around explicitly, or the
//! process-wide one can be read and changed with [`configuration`],
//! [`configure`], and [`reset_configuration`].

use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use tracing::debug;

use crate::eid::DEFAULT_HANDLE_LENGTH;
use crate::error::ExidError;

/// Default maximum prefix length, in characters.
pub const DEFAULT_MAX_PREFIX_LEN: usize = 4;

/// Predicate deciding whether a prefix may be attached to a record type.
pub type PrefixValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct Configuration {
    prefix_validator: PrefixValidator,
    handle_length: usize,
}

impl Configuration {
    /// Creates the default configuration: prefixes of at most 4 characters,
    /// 10-character handles.
    pub fn new() -> Self {
        Self {
            prefix_validator: max_len_validator(DEFAULT_MAX_PREFIX_LEN),
            handle_length: DEFAULT_HANDLE_LENGTH,
        }
    }

    /// Loads the configuration from `EXID_PREFIX_MAX_LEN` and
    /// `EXID_HANDLE_LENGTH`, falling back to the defaults.
    pub fn from_env() -> Result<Self, ExidError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ExidError> {
        let parse = |key: &str, default: usize| -> Result<usize, ExidError> {
            match lookup(key) {
                None => Ok(default),
                Some(value) => value.trim().parse().map_err(|_| ExidError::InvalidConfig {
                    key: key.to_string(),
                    value,
                }),
            }
        };

        let max_prefix_len = parse("EXID_PREFIX_MAX_LEN", DEFAULT_MAX_PREFIX_LEN)?;
        let handle_length = parse("EXID_HANDLE_LENGTH", DEFAULT_HANDLE_LENGTH)?;

        Ok(Self::new()
            .with_max_prefix_len(max_prefix_len)
            .with_handle_length(handle_length))
    }

    /// Accepts prefixes of at most `max` characters.
    #[must_use]
    pub fn with_max_prefix_len(mut self, max: usize) -> Self {
        self.prefix_validator = max_len_validator(max);
        self
    }

    /// Replaces the prefix policy with a custom predicate.
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.prefix_validator = Arc::new(validator);
        self
    }

    /// Sets the default number of payload characters in a handle.
    #[must_use]
    pub fn with_handle_length(mut self, len: usize) -> Self {
        self.handle_length = len;
        self
    }

    /// Sets the prefix policy in place.
    pub fn set_prefix_validator<F>(&mut self, validator: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.prefix_validator = Arc::new(validator);
    }

    /// Sets the handle length in place.
    pub fn set_handle_length(&mut self, len: usize) {
        self.handle_length = len;
    }

    pub fn prefix_validator(&self) -> &PrefixValidator {
        &self.prefix_validator
    }

    pub fn handle_length(&self) -> usize {
        self.handle_length
    }

    /// Whether both configurations use the same validator instance.
    fn shares_validator(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.prefix_validator, &other.prefix_validator)
    }

    /// Checks a prefix against the configured policy.
    pub fn validate_prefix(&self, prefix: &str) -> Result<(), ExidError> {
        if (self.prefix_validator)(prefix) {
            return Ok(());
        }

        Err(ExidError::PolicyViolation {
            prefix: prefix.to_string(),
        })
    }
}

fn max_len_validator(max: usize) -> PrefixValidator {
    Arc::new(move |prefix: &str| prefix.chars().count() <= max)
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("prefix_validator", &"<fn>")
            .field("handle_length", &self.handle_length)
            .finish()
    }
}

static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::new()));

/// Returns a copy of the process-wide configuration.
pub fn configuration() -> Configuration {
    CONFIGURATION
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Changes the process-wide configuration.
pub fn configure(f: impl FnOnce(&mut Configuration)) {
    let mut config = CONFIGURATION
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = config.clone();
    f(&mut config);
    debug!(
        handle_length = config.handle_length,
        validator_replaced = !config.shares_validator(&before),
        "exid configuration updated"
    );
}

/// Restores the process-wide configuration to its defaults.
pub fn reset_configuration() {
    configure(|config| *config = Configuration::new());
}
