//! Error type for input parsing and graph construction.
//!
//! Search outcomes never use these: an unreachable goal is `None`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("edge {from} -> {to} has negative cost {cost}")]
    NegativeCost { from: String, to: String, cost: f64 },

    #[error("{what} limit exceeded: {found} > {limit}")]
    TooLarge {
        what: &'static str,
        found: usize,
        limit: usize,
    },

    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        SearchError::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            SearchError::parse(3, "expected a floor").to_string(),
            "line 3: expected a floor"
        );
        assert_eq!(
            SearchError::TooLarge {
                what: "item kinds",
                found: 9,
                limit: 8
            }
            .to_string(),
            "item kinds limit exceeded: 9 > 8"
        );
    }
}
