//! Text conversion for keys, values and options
//!
//! File-backed gates store everything as text. A type takes part by
//! implementing [`Lexical`]; the conversion must round-trip.

use crate::error::{Error, Result};

/// Bidirectional conversion between a value and its text form
pub trait Lexical: Sized {
    /// Render the value as text
    fn to_lexical(&self) -> String;

    /// Parse a value back from text produced by [`Lexical::to_lexical`]
    fn from_lexical(text: &str) -> Result<Self>;
}

impl Lexical for String {
    fn to_lexical(&self) -> String {
        self.clone()
    }

    fn from_lexical(text: &str) -> Result<Self> {
        Ok(text.to_string())
    }
}

macro_rules! lexical_via_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Lexical for $ty {
                fn to_lexical(&self) -> String {
                    self.to_string()
                }

                fn from_lexical(text: &str) -> Result<Self> {
                    text.parse::<$ty>().map_err(|_| Error::Lexical {
                        target: stringify!($ty),
                        input: text.to_string(),
                    })
                }
            }
        )*
    };
}

lexical_via_from_str!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

/// Convert a value of one lexical type into another through its text form
pub fn cast<S: Lexical, T: Lexical>(source: &S) -> Result<T> {
    T::from_lexical(&source.to_lexical())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_is_verbatim() {
        let text = "line one\nline two".to_string();
        assert_eq!(text.to_lexical(), text);
        assert_eq!(String::from_lexical(&text).unwrap(), text);
    }

    #[test]
    fn test_integer_parse() {
        assert_eq!(u64::from_lexical("1024").unwrap(), 1024);
        assert_eq!((-7i32).to_lexical(), "-7");
    }

    #[test]
    fn test_integer_parse_failure() {
        let err = u64::from_lexical("twelve").unwrap_err();
        match err {
            Error::Lexical { target, input } => {
                assert_eq!(target, "u64");
                assert_eq!(input, "twelve");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cast_between_types() {
        let n: u32 = cast(&"42".to_string()).unwrap();
        assert_eq!(n, 42);
        let s: String = cast(&3.5f64).unwrap();
        assert_eq!(s, "3.5");
        assert!(cast::<String, bool>(&"maybe".to_string()).is_err());
    }
}
