//! Parsing of untrusted form values into a [`FootprintInput`].
//!
//! A field that was never submitted counts as zero. A field that was
//! submitted must be a finite, non-negative number or the whole submission
//! is rejected.

use crate::{Error, FootprintInput, RawInput, Result};

impl RawInput {
    /// Build a raw input from plain string slices
    pub fn from_strs(
        travel: Option<&str>,
        electricity: Option<&str>,
        diet: Option<&str>,
        shopping: Option<&str>,
    ) -> Self {
        Self {
            travel: travel.map(str::to_owned),
            electricity: electricity.map(str::to_owned),
            diet: diet.map(str::to_owned),
            shopping: shopping.map(str::to_owned),
        }
    }
}

impl TryFrom<&RawInput> for FootprintInput {
    type Error = Error;

    fn try_from(raw: &RawInput) -> Result<Self> {
        let input = FootprintInput {
            travel: parse_field("travel", raw.travel.as_deref())?,
            electricity: parse_field("electricity", raw.electricity.as_deref())?,
            diet: parse_field("diet", raw.diet.as_deref())?,
            shopping: parse_field("shopping", raw.shopping.as_deref())?,
        };

        // Each field is finite on its own but the sum (or its 2 dp scaling)
        // can still overflow, and JSON cannot store infinity.
        let sum = input.travel + input.electricity + input.diet + input.shopping;
        if !(sum * 100.0).is_finite() || !input.total().is_finite() {
            return Err(Error::InvalidInput {
                field: "total",
                value: sum.to_string(),
                reason: "total too large",
            });
        }

        Ok(input)
    }
}

/// Parse one emissions value
fn parse_field(field: &'static str, value: Option<&str>) -> Result<f64> {
    let Some(text) = value else {
        return Ok(0.0);
    };

    let invalid = |reason| Error::InvalidInput {
        field,
        value: text.to_string(),
        reason,
    };

    let parsed: f64 = text.trim().parse().map_err(|_| invalid("not a number"))?;

    if !parsed.is_finite() {
        return Err(invalid("not a finite number"));
    }
    if parsed < 0.0 {
        return Err(invalid("must not be negative"));
    }

    // Normalise -0.0
    Ok(parsed + 0.0)
}
