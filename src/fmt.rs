//! Logging shim: forwards to `defmt` when enabled, compiles away otherwise.
#![allow(unused_macros, unused_imports)]

#[cfg(feature = "defmt")]
pub(crate) use defmt as log;

#[cfg(not(feature = "defmt"))]
pub(crate) mod log {
    macro_rules! trace {
        ( $( $x:expr ),* ) => {
            { $( let _ = &$x; )* }
        };
    }
    pub(crate) use trace;
    macro_rules! debug {
        ( $( $x:expr ),* ) => {
            { $( let _ = &$x; )* }
        };
    }
    pub(crate) use debug;
    macro_rules! info {
        ( $( $x:expr ),* ) => {
            { $( let _ = &$x; )* }
        };
    }
    pub(crate) use info;
    macro_rules! warner {
        ( $( $x:expr ),* ) => {
            { $( let _ = &$x; )* }
        };
    }
    pub(crate) use warner as warn;
}
