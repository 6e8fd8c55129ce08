//! Diagnostics.

/// Early-return with a [`StrResult`].
///
/// ```ignore
/// bail!("bailing with a {}", "string result");
/// ```
#[macro_export]
#[doc(hidden)]
macro_rules! __bail {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        return Err($crate::diag::error!($fmt $(, $arg)*))
    };

    ($error:expr) => {
        return Err($error)
    };
}

/// Construct an [`EcoString`] error message.
#[macro_export]
#[doc(hidden)]
macro_rules! __error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::diag::eco_format!($fmt, $($arg),*)
    };
}

#[rustfmt::skip]
#[doc(inline)]
pub use {
    crate::__bail as bail,
    crate::__error as error,
    ecow::{EcoString, eco_format},
};

/// A result type with a string error message.
pub type StrResult<T> = Result<T, EcoString>;
