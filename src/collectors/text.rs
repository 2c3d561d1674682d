use super::Collector;
use anyhow::Result;
use std::fmt::{Display, Write};

/// Concatenates the `Display` renderings of elements.
#[derive(Clone, Debug, Default)]
pub struct Joining {
    delimiter: String,
    prefix: String,
    suffix: String,
}

impl<T: Display> Collector<T, Option<String>, String> for Joining {
    /// `None` until the first element, so merging knows whether a delimiter is
    /// needed.
    fn create(&self) -> Option<String> {
        None
    }

    fn add_input(&self, acc: &mut Option<String>, value: T) -> Result<()> {
        match acc {
            Some(s) => write!(s, "{}{value}", self.delimiter)?,
            None => *acc = Some(value.to_string()),
        }
        Ok(())
    }

    fn merge(&self, acc: &mut Option<String>, other: Option<String>) -> Result<()> {
        let Some(o) = other else {
            return Ok(());
        };
        match acc {
            Some(s) => {
                s.push_str(&self.delimiter);
                s.push_str(&o);
            }
            None => *acc = Some(o),
        }
        Ok(())
    }

    fn finish(&self, acc: Option<String>) -> String {
        format!("{}{}{}", self.prefix, acc.unwrap_or_default(), self.suffix)
    }
}

/// Concatenate with no delimiter.
pub fn joining() -> Joining {
    Joining::default()
}

pub fn joining_with(delimiter: impl Into<String>) -> Joining {
    Joining {
        delimiter: delimiter.into(),
        ..Joining::default()
    }
}

/// Concatenate with `delimiter` between elements, wrapped in `prefix` and
/// `suffix` (which are emitted even for no elements).
///
/// ```
/// use ironstream::{Stream, collectors::joining_with_affixes};
///
/// let s = Stream::of(vec!["one", " two", " three"])
///     .collect(joining_with_affixes(",", "[", "]"))
///     .unwrap();
/// assert_eq!(s, "[one, two, three]");
/// ```
pub fn joining_with_affixes(
    delimiter: impl Into<String>,
    prefix: impl Into<String>,
    suffix: impl Into<String>,
) -> Joining {
    Joining {
        delimiter: delimiter.into(),
        prefix: prefix.into(),
        suffix: suffix.into(),
    }
}
