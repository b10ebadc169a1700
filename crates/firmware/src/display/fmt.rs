//! Logging shims
//!
//! `trace!` .. `error!` forward to `defmt` on hardware builds and to
//! `tracing` on host builds. With neither backend they expand to nothing
//! but still borrow their arguments so no binding goes unused.
//!
//! Format strings must be accepted by both backends: stick to `{}` with
//! integers, `&str` and types implementing both `Display` and
//! `defmt::Format`.

#![allow(unused_macros)]

macro_rules! log_event {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::$level!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::$level!($s $(, $x)*);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = ($(&$x,)*);
    }};
}

macro_rules! trace {
    ($($arg:tt)+) => { log_event!(trace, $($arg)+) };
}

macro_rules! debug {
    ($($arg:tt)+) => { log_event!(debug, $($arg)+) };
}

macro_rules! info {
    ($($arg:tt)+) => { log_event!(info, $($arg)+) };
}

macro_rules! warn {
    ($($arg:tt)+) => { log_event!(warn, $($arg)+) };
}

macro_rules! error {
    ($($arg:tt)+) => { log_event!(error, $($arg)+) };
}
