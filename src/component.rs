use std::str::FromStr;

use chrono::{Month, Weekday};
use strum::{Display, EnumIs};
use tracing::debug;

/// The calendar fields a cron pattern constrains, in pattern order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
#[strum(serialize_all = "kebab-case")]
pub enum Field {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl Field {
    /// Smallest value the field can take.
    pub const fn min(self) -> u32 {
        match self {
            Field::Minute | Field::Hour | Field::DayOfWeek => 0,
            Field::DayOfMonth | Field::Month => 1,
        }
    }

    /// Largest value the field can take. Day of week runs from 0 (Sunday) to 6 (Saturday).
    pub const fn max(self) -> u32 {
        match self {
            Field::Minute => 59,
            Field::Hour => 23,
            Field::DayOfMonth => 31,
            Field::Month => 12,
            Field::DayOfWeek => 6,
        }
    }
}

/// Resolves a single token to a value within `min..=max`.
///
/// For the weekday range (`0..=6`) the token may also be a weekday name, and for the month
/// range (`1..=12`) a month name. Names are matched case-insensitively, both abbreviated
/// (`MON`, `jan`) and in full (`Monday`, `JANUARY`).
///
/// Returns `None` when the token is neither a known name nor a number within bounds.
pub fn parse_value(token: &str, min: u32, max: u32) -> Option<u32> {
    let named = match (min, max) {
        (0, 6) => Weekday::from_str(token)
            .ok()
            .map(|weekday| weekday.num_days_from_sunday()),
        (1, 12) => Month::from_str(token)
            .ok()
            .map(|month| month.number_from_month()),
        _ => None,
    };

    named
        .or_else(|| token.parse::<u32>().ok())
        .filter(|value| (min..=max).contains(value))
}

// Start of a stepped expression, the part before the '/'.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StepBase {
    // `*/n`, counted from the field minimum
    Any,
    // `a/n`, counted from `a` with no upper bound
    From(Option<u32>),
    // `a-b/n`, counted from `a` up to and including `b`
    Range(Option<u32>, Option<u32>),
}

// Parsed form of one field. Unresolvable tokens are kept as `None` so the expression
// fails closed instead of rejecting the whole pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FieldExpr {
    Any,
    Value(Option<u32>),
    Range(Option<u32>, Option<u32>),
    Step { base: StepBase, step: Option<u32> },
    List(Vec<FieldExpr>),
}

/// One parsed field of a cron pattern.
///
/// The field text is parsed once; matching a value afterwards does no string work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CronComponent {
    pub field: Field,
    expr: FieldExpr,
}

impl CronComponent {
    /// Parses the text of `field`. Never fails: tokens that cannot be resolved make the
    /// affected part of the field never match.
    pub fn parse(field: Field, spec: &str) -> Self {
        Self {
            field,
            expr: parse_expr(field, spec),
        }
    }

    /// Whether the field was given as a bare `*`.
    pub fn is_any(&self) -> bool {
        matches!(self.expr, FieldExpr::Any)
    }

    /// Checks a concrete calendar value against the field.
    pub fn matches(&self, value: u32) -> bool {
        expr_matches(&self.expr, value, self.field.min())
    }
}

fn parse_expr(field: Field, spec: &str) -> FieldExpr {
    if spec == "*" {
        return FieldExpr::Any;
    }

    if spec.contains(',') {
        return FieldExpr::List(
            spec.split(',')
                .map(|part| parse_expr(field, part.trim()))
                .collect(),
        );
    }

    if spec.contains('/') {
        let mut parts = spec.split('/');
        let base = parts.next().unwrap_or_default();
        let step = parts
            .next()
            .and_then(|step| step.parse::<u32>().ok())
            .filter(|&step| step > 0);
        if step.is_none() {
            debug!(%field, spec, "invalid step; field will never match");
        }

        let base = if base == "*" {
            StepBase::Any
        } else if base.contains('-') {
            let (start, end) = parse_bounds(field, base);
            StepBase::Range(start, end)
        } else {
            StepBase::From(resolve(field, base))
        };
        return FieldExpr::Step { base, step };
    }

    if spec.contains('-') {
        let (start, end) = parse_bounds(field, spec);
        return FieldExpr::Range(start, end);
    }

    FieldExpr::Value(resolve(field, spec))
}

// Splits `a-b` and resolves both ends. Anything after a second '-' is ignored.
fn parse_bounds(field: Field, range: &str) -> (Option<u32>, Option<u32>) {
    let mut bounds = range.split('-');
    let start = resolve(field, bounds.next().unwrap_or_default());
    let end = resolve(field, bounds.next().unwrap_or_default());
    (start, end)
}

fn resolve(field: Field, token: &str) -> Option<u32> {
    let value = parse_value(token, field.min(), field.max());
    if value.is_none() {
        debug!(%field, token, "unresolvable token; it will never match");
    }
    value
}

fn expr_matches(expr: &FieldExpr, value: u32, min: u32) -> bool {
    match expr {
        FieldExpr::Any => true,
        FieldExpr::List(parts) => parts.iter().any(|part| expr_matches(part, value, min)),
        FieldExpr::Value(expected) => *expected == Some(value),
        FieldExpr::Range(Some(start), Some(end)) => (*start..=*end).contains(&value),
        FieldExpr::Range(..) => false,
        FieldExpr::Step {
            step: Some(step), base,
        } => match base {
            StepBase::Any => value
                .checked_sub(min)
                .is_some_and(|offset| offset % step == 0),
            StepBase::From(Some(start)) => value
                .checked_sub(*start)
                .is_some_and(|offset| offset % step == 0),
            StepBase::Range(Some(start), Some(end)) => {
                value <= *end
                    && value
                        .checked_sub(*start)
                        .is_some_and(|offset| offset % step == 0)
            }
            StepBase::From(None) | StepBase::Range(..) => false,
        },
        FieldExpr::Step { step: None, .. } => false,
    }
}
