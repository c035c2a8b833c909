//! Result combinators for collections of fallible outcomes
//!
//! Rust's `Result` already provides `map`/`and_then`; this module adds the
//! collection-level combinators the service and gateway layers share:
//!
//! - [`sequence`] - all-or-nothing: first error wins
//! - [`partition`] - never fails: splits outcomes into both groups
//! - [`expect_ok`] - unwrap with a message, for contexts proven successful
//!   beforehand (test setup). Using it in a request-handling path is a defect.

/// Outcomes split into successes and failures, order preserved within each group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitioned<T, E> {
    pub successes: Vec<T>,
    pub failures: Vec<E>,
}

/// Collapse a list of results into a single result.
///
/// Fails fast on the first error in input order; on success the values keep
/// their original order.
pub fn sequence<T, E>(results: Vec<Result<T, E>>) -> Result<Vec<T>, E> {
    let mut values = Vec::with_capacity(results.len());
    for result in results {
        values.push(result?);
    }
    Ok(values)
}

/// Split a list of results into successes and failures.
///
/// Total function: always returns both groups, order preserved.
pub fn partition<T, E>(results: Vec<Result<T, E>>) -> Partitioned<T, E> {
    let mut successes = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(value) => successes.push(value),
            Err(error) => failures.push(error),
        }
    }
    Partitioned {
        successes,
        failures,
    }
}

/// Unwrap a result with a caller-supplied message.
///
/// Only for contexts where prior validation proves success (fixtures, test
/// setup). Request-handling code must propagate the error instead.
pub fn expect_ok<T, E: std::fmt::Debug>(result: Result<T, E>, message: &str) -> T {
    match result {
        Ok(value) => value,
        Err(error) => panic!("{}: {:?}", message, error),
    }
}
