//! Logging shims.
//!
//! The driver logs through `defmt` or `log` depending on the enabled feature.
//! With neither feature enabled the macros compile to nothing but still borrow
//! their arguments so that values only used for diagnostics don't warn.

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => {
                ::defmt::debug!($s $(, $x)*)
            };
        }

        macro_rules! error {
            ($s:literal $(, $x:expr)* $(,)?) => {
                ::defmt::error!($s $(, $x)*)
            };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => {
                ::log::debug!($s $(, $x)*)
            };
        }

        macro_rules! error {
            ($s:literal $(, $x:expr)* $(,)?) => {
                ::log::error!($s $(, $x)*)
            };
        }
    } else {
        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => {{
                let _ = ($( & $x ),*);
            }};
        }

        macro_rules! error {
            ($s:literal $(, $x:expr)* $(,)?) => {{
                let _ = ($( & $x ),*);
            }};
        }
    }
}
