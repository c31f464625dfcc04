//! Early-return helpers for blockport errors

/// Return an invalid value error from the enclosing function
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::BlockportError::invalid_value($context, $value))
    };
}
