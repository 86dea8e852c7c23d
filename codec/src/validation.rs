//! Checks shared by generated setters. The messages match the wording the
//! schema compiler uses for the same rules.

use std::fmt::Display;

use crate::error::ValidationError;

pub fn check_length(len: usize, min: Option<usize>, max: Option<usize>) -> Result<(), ValidationError> {
    let min_ok = min.map_or(true, |min| len >= min);
    let max_ok = max.map_or(true, |max| len <= max);
    if min_ok && max_ok {
        return Ok(());
    }
    Err(ValidationError::new(range_message("length", min, max)))
}

pub fn check_limit<T: PartialOrd + Display + Copy>(
    value: T,
    min: Option<T>,
    max: Option<T>,
) -> Result<(), ValidationError> {
    let min_ok = min.map_or(true, |min| value >= min);
    let max_ok = max.map_or(true, |max| value <= max);
    if min_ok && max_ok {
        return Ok(());
    }
    Err(ValidationError::new(range_message("value", min, max)))
}

pub fn mismatch(expression: &str) -> ValidationError {
    ValidationError::new(format!("value must match {}", expression))
}

fn range_message<T: Display>(subject: &str, min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{} must be between {} and {}", subject, min, max),
        (Some(min), None) => format!("{} must be at least {}", subject, min),
        (None, Some(max)) => format!("{} must be at most {}", subject, max),
        (None, None) => format!("{} is out of range", subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_messages() {
        assert!(check_length(5, Some(1), Some(20)).is_ok());
        assert_eq!(
            check_length(0, Some(1), Some(20)).unwrap_err().message(),
            "length must be between 1 and 20"
        );
        assert_eq!(
            check_length(9, None, Some(3)).unwrap_err().message(),
            "length must be at most 3"
        );
    }

    #[test]
    fn limit_messages() {
        assert!(check_limit(42, Some(0), Some(100)).is_ok());
        assert_eq!(
            check_limit(-1, Some(0), Some(100)).unwrap_err().message(),
            "value must be between 0 and 100"
        );
        assert_eq!(
            check_limit(0.5f64, Some(1.0), None).unwrap_err().message(),
            "value must be at least 1"
        );
    }
}
