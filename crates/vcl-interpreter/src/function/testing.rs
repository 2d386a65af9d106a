//! `testing.fixed_time`: pins the clock seen by `now`

use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::context::Context;
use crate::value::Value;

use super::{FunctionError, Tables};

pub const TESTING_FIXED_TIME: &str = "testing.fixed_time";

const EXPECTED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn testing_fixed_time(
    ctx: &mut Context,
    _tables: &Tables,
    args: &[Value],
) -> Result<Value, FunctionError> {
    let fixed = match &args[0] {
        Value::Integer(seconds) => Utc
            .timestamp_opt(*seconds, 0)
            .single()
            .ok_or_else(|| FunctionError::Testing(format!("Invalid unix time: {}", seconds)))?,
        Value::Time(time) => *time,
        Value::String(text) => NaiveDateTime::parse_from_str(text, EXPECTED_TIME_FORMAT)
            .map_err(|err| FunctionError::Testing(format!("Invalid time format: {}", err)))?
            .and_utc(),
        other => {
            return Err(FunctionError::Testing(format!(
                "First argument of {} must be INTEGER or TIME or STRING type, {} provided",
                TESTING_FIXED_TIME,
                other.value_type()
            )))
        }
    };

    ctx.fixed_time = Some(fixed);
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(arg: Value) -> Result<Context, FunctionError> {
        let mut ctx = Context::new();
        testing_fixed_time(&mut ctx, &Tables::new(), &[arg])?;
        Ok(ctx)
    }

    #[test]
    fn test_integer_is_unix_seconds() {
        let ctx = fix(Value::Integer(1_700_000_000)).unwrap();
        assert_eq!(ctx.now().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_string_format() {
        let ctx = fix(Value::from("2024-03-01 12:30:00")).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(ctx.fixed_time, Some(expected));
    }

    #[test]
    fn test_time_value() {
        let time = Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).unwrap();
        let ctx = fix(Value::Time(time)).unwrap();
        assert_eq!(ctx.now(), time);
    }

    #[test]
    fn test_invalid_string() {
        let err = fix(Value::from("yesterday")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid time format"));
    }

    #[test]
    fn test_rejects_other_types() {
        let err = fix(Value::Bool(true)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "First argument of testing.fixed_time must be INTEGER or TIME or STRING type, BOOL provided"
        );
    }
}
