use crate::{Error, Result, Sink};

/// Find the sink a user meant by `target`.
///
/// A target that parses entirely as an integer equal to some sink's index
/// always picks that sink. Otherwise the first sink in `sinks` whose name or
/// description matches wins: literally with `exact`, else as a case
/// insensitive substring.
pub fn resolve<'a>(sinks: &'a [Sink], target: &str, exact: bool) -> Result<&'a Sink> {
    if let Ok(index) = target.parse::<i64>() {
        if let Some(sink) = sinks.iter().find(|s| i64::from(s.index) == index) {
            return Ok(sink);
        }
    }

    let found = if exact {
        sinks
            .iter()
            .find(|s| s.name == target || s.description == target)
    } else {
        let lower = target.to_lowercase();
        sinks.iter().find(|s| {
            s.name.to_lowercase().contains(&lower) || s.description.to_lowercase().contains(&lower)
        })
    };

    found.ok_or_else(|| Error::Resolution {
        target: target.to_owned(),
        exact,
    })
}
