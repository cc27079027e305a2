/// Emits a `tracing` event at `$level` under `$target`; expands to nothing without the `tracing`
/// feature. Shared with `listsync-adapter`, which logs under its own target.
#[cfg(feature = "tracing")]
#[doc(hidden)]
#[macro_export]
macro_rules! __event {
    ($level:ident, $target:literal, $($tt:tt)*) => {
        $crate::__tracing::$level!(target: $target, $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __event {
    ($level:ident, $target:literal, $($tt:tt)*) => {};
}

macro_rules! ltrace {
    ($($tt:tt)*) => {
        $crate::__event!(trace, "listsync", $($tt)*)
    };
}

macro_rules! ldebug {
    ($($tt:tt)*) => {
        $crate::__event!(debug, "listsync", $($tt)*)
    };
}

macro_rules! lwarn {
    ($($tt:tt)*) => {
        $crate::__event!(warn, "listsync", $($tt)*)
    };
}
