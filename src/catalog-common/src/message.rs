//! Status lines for the command line, one colored level tag per line.
//!
//! Errors go to stderr.

#[doc(hidden)]
#[macro_export]
macro_rules! status_line {
    ($print:ident, $tag:literal, $color:ident, $($arg:tt)*) => {
        $print!(
            "{} {}",
            $crate::Colorize::bold($crate::Colorize::$color(concat!("[", $tag, "]"))),
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! success_message {
    ($($arg:tt)*) => {
        $crate::status_line!(println, "SUCCESS", green, $($arg)*)
    };
}

#[macro_export]
macro_rules! error_message {
    ($($arg:tt)*) => {
        $crate::status_line!(eprintln, "ERROR", red, $($arg)*)
    };
}

#[macro_export]
macro_rules! warning_message {
    ($($arg:tt)*) => {
        $crate::status_line!(println, "WARNING", yellow, $($arg)*)
    };
}

#[macro_export]
macro_rules! info_message {
    ($($arg:tt)*) => {
        $crate::status_line!(println, "INFO", cyan, $($arg)*)
    };
}
