//! Aggregated success flag plus every error collected along the way.

use std::fmt;

use crate::errors::Error;

/// Outcome of a multi-step process.
///
/// Steps report into the same result instead of returning early, so a
/// failed setup lists every root cause. Once failed, a result never turns
/// successful again, and errors are only ever appended.
#[derive(Debug)]
pub struct OperationResult {
    success: bool,
    errors: Vec<Error>,
}

impl OperationResult {
    /// A successful result with no errors.
    pub fn new() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    /// Merge a step outcome: `success` is and-ed in, `errors` are appended.
    pub fn set(&mut self, success: bool, errors: impl IntoIterator<Item = Error>) {
        self.success &= success;
        self.errors.extend(errors);
    }

    /// Record a single failure.
    pub fn add_error(&mut self, error: impl Into<Error>) {
        self.set(false, [error.into()]);
    }

    /// Record the error side of a step result, if any. Returns the success value.
    pub fn record<T, E: Into<Error>>(&mut self, step: Result<T, E>) -> Option<T> {
        match step {
            Ok(value) => Some(value),
            Err(e) => {
                self.add_error(e);
                None
            }
        }
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: OperationResult) {
        self.set(other.success, other.errors);
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    /// Convert to a `Result`, keeping every error on failure.
    pub fn into_result(self) -> Result<(), Vec<Error>> {
        if self.success {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl Default for OperationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            return f.write_str("success");
        }
        write!(f, "failed with {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PropertyError;

    fn not_found(id: &str) -> Error {
        PropertyError::NotFound { id: id.to_string() }.into()
    }

    #[test]
    fn test_new_result_is_successful() {
        let result = OperationResult::new();
        assert!(result.success());
        assert!(result.errors().is_empty());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_failure_never_reverts() {
        let mut result = OperationResult::new();
        result.set(false, [not_found("a")]);
        result.set(true, []);
        assert!(!result.success());
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_errors_accumulate_across_steps() {
        // 5 steps, steps 1 and 3 fail
        let mut result = OperationResult::new();
        for step in 0..5 {
            if step % 2 == 1 {
                result.add_error(PropertyError::NotFound {
                    id: format!("step{}", step),
                });
            } else {
                result.set(true, []);
            }
        }
        assert!(!result.success());
        let ids: Vec<String> = result.errors().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            ids,
            vec!["Property not found: step1", "Property not found: step3"]
        );
    }

    #[test]
    fn test_record_and_merge() {
        let mut first = OperationResult::new();
        assert_eq!(first.record::<_, PropertyError>(Ok(3)), Some(3));
        let none: Option<()> = first.record(Err(PropertyError::NotFound {
            id: "x".to_string(),
        }));
        assert!(none.is_none());

        let mut second = OperationResult::new();
        second.add_error(not_found("y"));

        first.merge(second);
        assert!(!first.success());
        assert_eq!(first.errors().len(), 2);
        assert!(first.to_string().starts_with("failed with 2 error(s)"));
    }
}
