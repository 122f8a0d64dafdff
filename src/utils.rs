#[macro_export]
macro_rules! debug_if {
    // logs only when the flag is set, e.g. `debug_if!(verbose, "x={}", x)`
    ($flag:expr, $($arg:tt)+) => {
        {
            if $flag {
                tracing::debug!($($arg)+)
            }
        }
    };
}
