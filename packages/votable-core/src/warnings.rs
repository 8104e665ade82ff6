//! Advisory warnings and the per-parse diagnostics sink.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use crate::config::{ParserConfig, Pedantic};
use crate::error::{Position, Result, VoError};

/// Advisory conformance warnings.
///
/// Each variant maps to a VOTable `Wxx` code, except `ArrayLength`, which
/// is the `E02` condition downgraded for lax parsing. Warnings describe input that
/// violates the standard but can be repaired; pedantic mode may escalate
/// them into [`VoError::Strict`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    /// E02 tolerated outside pedantic mode
    #[error("E02: Incorrect number of elements in array. Expected {expected} (or a multiple), got {got}")]
    ArrayLength { expected: usize, got: usize },

    /// W01
    #[error("W01: Array uses commas rather than whitespace")]
    CommaSeparator,

    /// W30
    #[error("W30: Invalid literal for float '{value}'. Treating as empty.")]
    InvalidFloat { value: String },

    /// W31
    #[error("W31: NaN given in an integral field without a specified null value")]
    IntegerNan,

    /// W39
    #[error("W39: Bit values can not be masked")]
    MaskedBit,

    /// W46
    #[error("W46: {datatype} value is too long for specified length of {length}")]
    TooLong { datatype: String, length: usize },

    /// W47
    #[error("W47: Missing arraysize indicates length 1")]
    MissingArraySize,

    /// W49
    #[error("W49: Empty cell illegal for {datatype} fields.")]
    EmptyCell { datatype: String },
}

impl Warning {
    /// Returns the VOTable warning code.
    pub fn code(&self) -> &'static str {
        match self {
            Warning::ArrayLength { .. } => "E02",
            Warning::CommaSeparator => "W01",
            Warning::InvalidFloat { .. } => "W30",
            Warning::IntegerNan => "W31",
            Warning::MaskedBit => "W39",
            Warning::TooLong { .. } => "W46",
            Warning::MissingArraySize => "W47",
            Warning::EmptyCell { .. } => "W49",
        }
    }
}

/// A warning together with the position it was raised at.
#[derive(Debug, Clone, PartialEq)]
pub struct VoWarning {
    pub warning: Warning,
    pub pos: Position,
}

/// Collects warnings raised while converting a table.
///
/// A reporter is shared by every converter built for one table. It is
/// `Sync`, so rows may be converted from several threads at once.
#[derive(Debug, Default)]
pub struct Reporter {
    config: ParserConfig,
    counts: Mutex<HashMap<&'static str, usize>>,
    log: Mutex<Vec<VoWarning>>,
}

impl Reporter {
    /// Creates a reporter for the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            counts: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Returns the configuration this reporter was created with.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Returns `true` when standard violations are raised as errors.
    pub fn is_pedantic(&self) -> bool {
        self.config.pedantic == Pedantic::Exception
    }

    /// Records a warning.
    ///
    /// The first `max_warnings` warnings of each code are logged through
    /// `tracing` and kept for [`Reporter::warnings`]; later ones are only
    /// counted. Nothing is recorded in `ignore` mode.
    pub fn warn(&self, warning: Warning, pos: Position) {
        if self.config.pedantic == Pedantic::Ignore {
            return;
        }

        let count = {
            let mut counts = self.counts.lock();
            let entry = counts.entry(warning.code()).or_insert(0);
            *entry += 1;
            *entry
        };

        let limit = self.config.max_warnings;
        if count < limit {
            tracing::warn!("{} ({})", warning, pos);
        } else if count == limit {
            tracing::warn!(
                "{} ({}) (suppressing further warnings of this type...)",
                warning,
                pos
            );
        } else {
            return;
        }

        self.log.lock().push(VoWarning { warning, pos });
    }

    /// Raises `warning` as an error in pedantic mode, otherwise records it.
    pub fn warn_or_raise(&self, warning: Warning, pos: Position) -> Result<()> {
        if self.is_pedantic() {
            return Err(VoError::Strict { warning, pos });
        }
        self.warn(warning, pos);
        Ok(())
    }

    /// Returns a copy of the stored warnings, in the order raised.
    ///
    /// At most `max_warnings` are kept per code; use [`Reporter::count`] or
    /// [`Reporter::total`] for full counts.
    pub fn warnings(&self) -> Vec<VoWarning> {
        self.log.lock().clone()
    }

    /// Returns how many warnings with the given code were raised.
    pub fn count(&self, code: &str) -> usize {
        self.counts.lock().get(code).copied().unwrap_or(0)
    }

    /// Returns how many warnings were raised across all codes.
    pub fn total(&self) -> usize {
        self.counts.lock().values().sum()
    }

    /// Forgets all recorded warnings.
    pub fn clear(&self) {
        self.counts.lock().clear();
        self.log.lock().clear();
    }
}
