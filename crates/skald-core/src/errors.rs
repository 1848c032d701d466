use std::error::Error;

/// Base trait for all library errors
pub trait SkaldError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error should be logged as an error or warning
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the library
pub type SkaldResult<T> = Result<T, Box<dyn SkaldError>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skald_result() {
        let _result: SkaldResult<i32> = Ok(42);
    }
}
