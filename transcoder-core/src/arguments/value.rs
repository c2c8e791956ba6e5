//! Conversion of typed option values into their command-line text.

use std::path::{Path, PathBuf};

/// A value that has a command-line representation.
///
/// Implementations return the raw text; quoting is applied later when the
/// token is rendered.
pub trait ArgumentValue {
    fn argument_string(&self) -> String;
}

impl ArgumentValue for str {
    fn argument_string(&self) -> String {
        self.to_string()
    }
}

impl ArgumentValue for String {
    fn argument_string(&self) -> String {
        self.clone()
    }
}

/// Paths are made absolute against the current directory, because the tool
/// may resolve them from somewhere else. Paths that cannot be resolved (such
/// as an empty one) are passed through unchanged.
impl ArgumentValue for Path {
    fn argument_string(&self) -> String {
        std::path::absolute(self)
            .unwrap_or_else(|_| self.to_path_buf())
            .to_string_lossy()
            .into_owned()
    }
}

impl ArgumentValue for PathBuf {
    fn argument_string(&self) -> String {
        self.as_path().argument_string()
    }
}

impl<T: ArgumentValue + ?Sized> ArgumentValue for &T {
    fn argument_string(&self) -> String {
        (**self).argument_string()
    }
}

macro_rules! display_argument_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ArgumentValue for $ty {
                fn argument_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_argument_value!(i32, i64, u8, u16, u32, u64, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_render_with_display() {
        assert_eq!(640_u32.argument_string(), "640");
        assert_eq!(23.976_f64.argument_string(), "23.976");
        assert_eq!((-3_i32).argument_string(), "-3");
    }

    #[test]
    fn test_absolute_paths_render_verbatim() {
        let path = PathBuf::from("/media/Some Movie/chapters.csv");
        assert_eq!(path.argument_string(), "/media/Some Movie/chapters.csv");
    }

    #[test]
    fn test_relative_paths_resolve_against_current_dir() {
        let rendered = PathBuf::from(Path::new("subs/forced.srt").argument_string());
        assert!(rendered.is_absolute());
        assert_eq!(rendered, std::env::current_dir().unwrap().join("subs/forced.srt"));
    }
}
