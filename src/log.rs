//! Leveled debug logging (SPEC_FULL.md §B), adapted from the teacher's
//! `util::Log<T>`: a simple ordered level gated entirely by
//! `cfg!(debug_assertions)` and printed with plain `println!`. No external
//! logging crate — the teacher pulls none in either, and this stays ambient
//! infrastructure rather than a user-facing feature.

use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

impl<T> Log<T> {
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{s}")
            }
        }
    }
}

impl<TL: Display> Log<TL> {
    /// Print a success/failure line if the configured level is at least as
    /// verbose as the outcome warrants. No-op in release builds.
    pub fn trace<T: Debug>(&self, label: &str, position: impl Display, outcome: Option<&T>) {
        #[cfg(debug_assertions)]
        match outcome {
            Some(value) => {
                if self.order() >= Log::Success(()).order() {
                    println!("[{self}; {label}-success]: {value:?} at {position}");
                }
            }
            None => {
                if self.order() >= Log::Result(()).order() {
                    println!("[{self}; {label}-fail]: at {position}");
                }
            }
        }
        #[cfg(not(debug_assertions))]
        let _ = (label, position, outcome);
    }
}
