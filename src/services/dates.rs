//! Natural-language date resolution.
//!
//! Phrases are resolved against an anchor timestamp, so the same phrase and
//! anchor always give the same day. The phrase may be a whole sentence; the
//! longest recognised expression in it wins, the earliest on a tie.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, Weekday};

use crate::errors::DialogueError;

const MAX_WINDOW: usize = 5;
const FILLER: &[&str] = &["of", "the", "on"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    Day,
    Week,
    Month,
    Year,
}

pub fn resolve_date(phrase: &str, now: NaiveDateTime) -> Result<NaiveDate, DialogueError> {
    let today = now.date();
    let tokens = tokenize(phrase);
    let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

    let mut best: Option<(usize, NaiveDate)> = None;
    for start in 0..tokens.len() {
        let longest = MAX_WINDOW.min(tokens.len() - start);
        for len in (1..=longest).rev() {
            if best.map(|(l, _)| len <= l).unwrap_or(false) {
                break;
            }
            if let Some(date) = parse_expression(&tokens[start..start + len], today) {
                best = Some((len, date));
                break;
            }
        }
    }

    best.map(|(_, date)| date)
        .ok_or_else(|| DialogueError::UnparseableDate(phrase.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn tokenize(phrase: &str) -> Vec<String> {
    phrase
        .to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| matches!(c, '.' | '!' | '?' | ';' | ':' | '"' | '\'' | '(' | ')'))
                .to_string()
        })
        .filter(|t| !t.is_empty() && !FILLER.contains(&t.as_str()))
        .collect()
}

fn parse_expression(tokens: &[&str], today: NaiveDate) -> Option<NaiveDate> {
    match tokens {
        ["today"] | ["now"] | ["tonight"] => Some(today),
        ["tomorrow"] | ["tmrw"] => today.succ_opt(),
        ["yesterday"] => today.pred_opt(),
        ["day", "after", "tomorrow"] => today.checked_add_days(Days::new(2)),
        ["day", "before", "yesterday"] => today.checked_sub_days(Days::new(2)),
        ["this", word] => upcoming(today, weekday(word)?, true),
        ["next", word] => match weekday(word) {
            Some(wd) => upcoming(today, wd, false),
            None => shift(today, 1, unit(word)?),
        },
        ["last", word] => match weekday(word) {
            Some(wd) => previous(today, wd),
            None => shift(today, -1, unit(word)?),
        },
        ["in", n, u] => shift(today, count(n)?, unit(u)?),
        [n, u, "from", "now"] | [n, u, "from", "today"] | [n, u, "later"] => {
            shift(today, count(n)?, unit(u)?)
        }
        [n, u, "ago"] => shift(today, -count(n)?, unit(u)?),
        [single] => numeric_date(single, today)
            .or_else(|| weekday(single).and_then(|wd| upcoming(today, wd, false))),
        _ => calendar_date(tokens, today),
    }
}

/// `2024-03-05`, `2024/03/05`, `03/05/2024` (month first) and `3/5`.
fn numeric_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.split(['-', '/', '.']).collect();
    if parts.len() < 2
        || !parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    match parts.as_slice() {
        [y, m, d] if y.len() == 4 && m.len() <= 2 && d.len() <= 2 => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
        }
        [m, d, y] if y.len() == 4 && m.len() <= 2 && d.len() <= 2 => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
        }
        [m, d] if token.contains('/') && m.len() <= 2 && d.len() <= 2 => {
            rolling(today, m.parse().ok()?, d.parse().ok()?)
        }
        _ => None,
    }
}

/// `March 5`, `5 March`, `March 5 2024`, optionally after a weekday name.
fn calendar_date(tokens: &[&str], today: NaiveDate) -> Option<NaiveDate> {
    let tokens = match tokens {
        [first, rest @ ..] if rest.len() >= 2 && weekday(first).is_some() => rest,
        _ => tokens,
    };

    let (m, d, y) = match tokens {
        [a, b] => match (month(a), day(b)) {
            (Some(m), Some(d)) => (m, d, None),
            _ => (month(b)?, day(a)?, None),
        },
        [a, b, c] => match (month(a), day(b)) {
            (Some(m), Some(d)) => (m, d, Some(year(c)?)),
            _ => (month(b)?, day(a)?, Some(year(c)?)),
        },
        _ => return None,
    };

    match y {
        Some(y) => NaiveDate::from_ymd_opt(y, m, d),
        None => rolling(today, m, d),
    }
}

/// Month and day without a year: this year, or next year once the day has passed.
fn rolling(today: NaiveDate, m: u32, d: u32) -> Option<NaiveDate> {
    match NaiveDate::from_ymd_opt(today.year(), m, d) {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, m, d),
    }
}

fn upcoming(today: NaiveDate, wd: Weekday, include_today: bool) -> Option<NaiveDate> {
    let ahead = (7 + wd.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 && !include_today { 7 } else { ahead };
    today.checked_add_days(Days::new(u64::from(ahead)))
}

fn previous(today: NaiveDate, wd: Weekday) -> Option<NaiveDate> {
    let back = (7 + today.weekday().num_days_from_monday() - wd.num_days_from_monday()) % 7;
    let back = if back == 0 { 7 } else { back };
    today.checked_sub_days(Days::new(u64::from(back)))
}

fn shift(today: NaiveDate, n: i64, unit: Unit) -> Option<NaiveDate> {
    match unit {
        Unit::Day => shift_days(today, n),
        Unit::Week => shift_days(today, n.checked_mul(7)?),
        Unit::Month => shift_months(today, n),
        Unit::Year => shift_months(today, n.checked_mul(12)?),
    }
}

fn shift_days(today: NaiveDate, n: i64) -> Option<NaiveDate> {
    let days = Days::new(n.unsigned_abs());
    if n >= 0 {
        today.checked_add_days(days)
    } else {
        today.checked_sub_days(days)
    }
}

fn shift_months(today: NaiveDate, n: i64) -> Option<NaiveDate> {
    let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        today.checked_add_months(months)
    } else {
        today.checked_sub_months(months)
    }
}

fn weekday(word: &str) -> Option<Weekday> {
    match word {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tues" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thurs" | "thur" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month(word: &str) -> Option<u32> {
    let m = match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(m)
}

fn day(word: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix))
        .unwrap_or(word);
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let d: u32 = digits.parse().ok()?;
    (1..=31).contains(&d).then_some(d)
}

fn year(word: &str) -> Option<i32> {
    if word.len() == 4 && word.chars().all(|c| c.is_ascii_digit()) {
        word.parse().ok()
    } else {
        None
    }
}

fn count(word: &str) -> Option<i64> {
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ if word.len() <= 4 && word.chars().all(|c| c.is_ascii_digit()) => word.parse().ok()?,
        _ => return None,
    };
    Some(n)
}

fn unit(word: &str) -> Option<Unit> {
    match word {
        "day" | "days" => Some(Unit::Day),
        "week" | "weeks" => Some(Unit::Week),
        "month" | "months" => Some(Unit::Month),
        "year" | "years" => Some(Unit::Year),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wednesday
    fn anchor() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn resolve(phrase: &str) -> String {
        format_date(resolve_date(phrase, anchor()).unwrap())
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(resolve("2024-03-05"), "2024-03-05");
    }

    #[test]
    fn test_empty_phrase_fails() {
        let err = resolve_date("", anchor()).unwrap_err();
        assert!(matches!(err, DialogueError::UnparseableDate(_)));
    }

    #[test]
    fn test_gibberish_fails() {
        for phrase in ["banana", "I have 2 kids", "2024-02-30", "   "] {
            assert!(resolve_date(phrase, anchor()).is_err(), "resolved {phrase:?}");
        }
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(resolve("today"), "2024-03-06");
        assert_eq!(resolve("Tomorrow"), "2024-03-07");
        assert_eq!(resolve("yesterday"), "2024-03-05");
        assert_eq!(resolve("the day after tomorrow"), "2024-03-08");
        assert_eq!(resolve("day before yesterday"), "2024-03-04");
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(resolve("friday"), "2024-03-08");
        assert_eq!(resolve("this Friday"), "2024-03-08");
        assert_eq!(resolve("next friday"), "2024-03-08");
        assert_eq!(resolve("this wednesday"), "2024-03-06");
        assert_eq!(resolve("wednesday"), "2024-03-13");
        assert_eq!(resolve("next wednesday"), "2024-03-13");
        assert_eq!(resolve("last friday"), "2024-03-01");
        assert_eq!(resolve("last wednesday"), "2024-02-28");
    }

    #[test]
    fn test_weekday_abbreviations() {
        assert_eq!(resolve("Sat"), "2024-03-09");
        assert_eq!(resolve("next Mon"), "2024-03-11");
        assert_eq!(resolve("this thu"), "2024-03-07");
        assert_eq!(resolve("tues"), "2024-03-12");
        assert_eq!(resolve("last fri"), "2024-03-01");
        assert_eq!(resolve("Sun, Mar 10"), "2024-03-10");
    }

    #[test]
    fn test_offsets() {
        assert_eq!(resolve("in 3 days"), "2024-03-09");
        assert_eq!(resolve("in a week"), "2024-03-13");
        assert_eq!(resolve("in two months"), "2024-05-06");
        assert_eq!(resolve("2 weeks from now"), "2024-03-20");
        assert_eq!(resolve("5 days ago"), "2024-03-01");
        assert_eq!(resolve("next month"), "2024-04-06");
        assert_eq!(resolve("last year"), "2023-03-06");
    }

    #[test]
    fn test_month_arithmetic_clamps() {
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let date = resolve_date("in 1 month", anchor).unwrap();
        assert_eq!(format_date(date), "2024-02-29");
    }

    #[test]
    fn test_calendar_dates() {
        assert_eq!(resolve("March 5, 2024"), "2024-03-05");
        assert_eq!(resolve("5th of March 2024"), "2024-03-05");
        assert_eq!(resolve("december 25"), "2024-12-25");
        assert_eq!(resolve("Friday, March 8"), "2024-03-08");
        assert_eq!(resolve("03/05/2024"), "2024-03-05");
        assert_eq!(resolve("2024/03/05"), "2024-03-05");
        assert_eq!(resolve("3/7"), "2024-03-07");
    }

    #[test]
    fn test_past_month_day_rolls_forward() {
        assert_eq!(resolve("Mar 5th"), "2025-03-05");
        assert_eq!(resolve("3/5"), "2025-03-05");
    }

    #[test]
    fn test_embedded_in_sentence() {
        assert_eq!(resolve("Can I come in next Friday please?"), "2024-03-08");
        assert_eq!(resolve("book now for next friday"), "2024-03-08");
        assert_eq!(resolve("I'd like the appointment on 2024-04-01."), "2024-04-01");
    }

    #[test]
    fn test_deterministic_for_same_anchor() {
        let a = resolve_date("next tuesday", anchor()).unwrap();
        let b = resolve_date("next tuesday", anchor()).unwrap();
        assert_eq!(a, b);
        assert_eq!(format_date(a), "2024-03-12");
    }
}
