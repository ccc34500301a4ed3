//! Session parameters and their parsing from positional arguments.
//!
//! Numbers are read the way a C `stoi` reads them: leading whitespace and a
//! sign are accepted, the longest run of digits is taken, and anything after
//! it is reported as a warning but otherwise ignored. Values must fit a
//! 32-bit signed integer and be meaningful for their field.

use crate::constants::{DEFAULT_CAMERA_ID, DEFAULT_FRAMERATE, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::ArgsError;

/// Number of positional values that make a complete argument set
pub const ARG_COUNT: usize = 4;

/// Immutable description of one recording run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    pub width: u32,
    pub height: u32,
    pub framerate: u32,
    pub camera_id: u32,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            framerate: DEFAULT_FRAMERATE,
            camera_id: DEFAULT_CAMERA_ID,
        }
    }
}

/// Result of reading the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub params: SessionParams,
    /// True when the defaults were used because no complete set was given
    pub defaulted: bool,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Width,
    Height,
    Framerate,
    CameraId,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Width => "width",
            Field::Height => "height",
            Field::Framerate => "framerate",
            Field::CameraId => "id",
        }
    }

    fn min(self) -> i64 {
        match self {
            Field::CameraId => 0,
            _ => 1,
        }
    }
}

/// Build session parameters from the user-supplied positional values.
///
/// Exactly [`ARG_COUNT`] values are parsed; any other count falls back to
/// [`SessionParams::default`]. Non-fatal remarks (trailing characters after
/// a number) are handed to `on_warning` as soon as they are found, so they
/// are not lost when a later value is rejected.
pub fn parse_args<S, W>(args: &[S], mut on_warning: W) -> Result<ParsedArgs, ArgsError>
where
    S: AsRef<str>,
    W: FnMut(String),
{
    if args.len() != ARG_COUNT {
        return Ok(ParsedArgs {
            params: SessionParams::default(),
            defaulted: true,
        });
    }

    let mut values = [0u32; ARG_COUNT];
    let fields = [Field::Width, Field::Height, Field::Framerate, Field::CameraId];

    for ((slot, field), text) in values.iter_mut().zip(fields).zip(args) {
        let text = text.as_ref();
        let (value, trailing) = parse_leading_int(text)?;
        if trailing {
            on_warning(format!(
                "Trailing characters after {}: {}",
                field.label(),
                text
            ));
        }
        if value < field.min() {
            return Err(ArgsError::OutOfRange);
        }
        *slot = u32::try_from(value).map_err(|_| ArgsError::OutOfRange)?;
    }

    let [width, height, framerate, camera_id] = values;
    Ok(ParsedArgs {
        params: SessionParams {
            width,
            height,
            framerate,
            camera_id,
        },
        defaulted: false,
    })
}

/// Parse the leading integer of `text`, returning it and whether characters
/// were left over.
fn parse_leading_int(text: &str) -> Result<(i64, bool), ArgsError> {
    // isspace() only knows ASCII whitespace
    let rest = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(ArgsError::Invalid);
    }

    let mut value: i64 = 0;
    for b in rest[..digits].bytes() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(b - b'0')))
            .ok_or(ArgsError::OutOfRange)?;
        if value > i64::from(i32::MAX) + 1 {
            return Err(ArgsError::OutOfRange);
        }
    }
    if negative {
        value = -value;
    }
    if value > i64::from(i32::MAX) || value < i64::from(i32::MIN) {
        return Err(ArgsError::OutOfRange);
    }

    Ok((value, digits < rest.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_accepts_sign_and_whitespace() {
        assert_eq!(parse_leading_int("  42"), Ok((42, false)));
        assert_eq!(parse_leading_int("+7"), Ok((7, false)));
        assert_eq!(parse_leading_int("-3"), Ok((-3, false)));
    }

    #[test]
    fn leading_int_reports_trailing() {
        assert_eq!(parse_leading_int("1280px"), Ok((1280, true)));
        assert_eq!(parse_leading_int("30 "), Ok((30, true)));
    }

    #[test]
    fn leading_int_rejects_non_numeric() {
        assert_eq!(parse_leading_int(""), Err(ArgsError::Invalid));
        assert_eq!(parse_leading_int("abc"), Err(ArgsError::Invalid));
        assert_eq!(parse_leading_int("-"), Err(ArgsError::Invalid));
    }

    #[test]
    fn leading_int_range_matches_i32() {
        assert_eq!(parse_leading_int("2147483647"), Ok((2147483647, false)));
        assert_eq!(parse_leading_int("-2147483648"), Ok((-2147483648, false)));
        assert_eq!(parse_leading_int("2147483648"), Err(ArgsError::OutOfRange));
        assert_eq!(
            parse_leading_int("99999999999999999999999999"),
            Err(ArgsError::OutOfRange)
        );
    }

    #[test]
    fn leading_int_skips_only_ascii_whitespace() {
        assert_eq!(parse_leading_int("\t\n 42"), Ok((42, false)));
        assert_eq!(parse_leading_int("\u{a0}42"), Err(ArgsError::Invalid));
        assert_eq!(parse_leading_int("\u{2003}42"), Err(ArgsError::Invalid));
    }

    #[test]
    fn zero_framerate_is_out_of_range() {
        assert_eq!(
            parse_args(&["640", "480", "0", "0"], |_| {}),
            Err(ArgsError::OutOfRange)
        );
    }

    #[test]
    fn negative_camera_is_out_of_range() {
        assert_eq!(
            parse_args(&["640", "480", "30", "-1"], |_| {}),
            Err(ArgsError::OutOfRange)
        );
    }

    #[test]
    fn warnings_before_a_rejected_value_are_kept() {
        let mut warnings = Vec::new();
        let result = parse_args(&["640px", "480", "abc", "0"], |w| warnings.push(w));
        assert_eq!(result, Err(ArgsError::Invalid));
        assert_eq!(warnings, vec!["Trailing characters after width: 640px"]);
    }
}
