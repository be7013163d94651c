use thiserror::Error;

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while generating data or running a campaign.
///
/// The stores themselves never fail: searching an empty store is just a miss.
#[derive(Error, Debug)]
pub enum Error {
    /// A count, range or bound was rejected before any store was touched.
    #[error("invalid {what}: {value}")]
    InvalidInput { what: &'static str, value: String },

    /// Missing-key rejection sampling ran out of draws.
    #[error("missing-key sampling exhausted after {attempts} draws ({collected}/{requested} misses collected)")]
    Exhausted {
        collected: usize,
        requested: usize,
        attempts: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A data-file line did not have the `key auxiliary payload` shape.
    #[error("malformed data file line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl Error {
    pub(crate) fn invalid(what: &'static str, value: impl ToString) -> Self {
        Error::InvalidInput {
            what,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = Error::invalid("key count", 0);
        assert_eq!(e.to_string(), "invalid key count: 0");

        let e = Error::Exhausted {
            collected: 3,
            requested: 10,
            attempts: 500,
        };
        assert!(e.to_string().contains("3/10"));
    }
}
