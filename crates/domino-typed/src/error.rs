#![forbid(unsafe_code)]

//! Construction errors for checked collection builders.

use std::fmt;

use crate::id_type::{Id, IdType};

/// Why a list of groups is not a partition of its set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupPartitionError {
    /// Id appears in more than one group.
    Overlap { id: Id },
    /// Id of the set is in no group.
    Uncovered { id: Id },
    /// Group contains an id the set does not.
    Foreign { id: Id },
    /// Group is tagged with a different identifier space than the set.
    TagMismatch { expected: IdType, found: IdType },
}

impl fmt::Display for GroupPartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { id } => write!(f, "id {id} appears in more than one group"),
            Self::Uncovered { id } => write!(f, "id {id} is not covered by any group"),
            Self::Foreign { id } => write!(f, "group contains id {id} not present in the set"),
            Self::TagMismatch { expected, found } => {
                write!(f, "group tagged {found} but set is tagged {expected}")
            }
        }
    }
}

impl std::error::Error for GroupPartitionError {}

/// Errors building multi-typed collections from components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiTypedError {
    /// Component `component` has `found` rows where `expected` were required.
    RowCountMismatch {
        component: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for MultiTypedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCountMismatch {
                component,
                expected,
                found,
            } => write!(
                f,
                "component {component} has {found} rows, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for MultiTypedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            GroupPartitionError::Overlap { id: 3 }.to_string(),
            "id 3 appears in more than one group"
        );
        let err = MultiTypedError::RowCountMismatch {
            component: 1,
            expected: 4,
            found: 2,
        };
        assert_eq!(err.to_string(), "component 1 has 2 rows, expected 4");
    }
}
