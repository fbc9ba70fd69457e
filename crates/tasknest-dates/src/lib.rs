//! Keyword-based due date extraction for task input.
//!
//! Recognizes a small set of natural phrases ("today", "tomorrow", "next
//! week", "on friday") in raw task text, strips the matched phrase, and
//! reports the target day as an epoch-millisecond timestamp at midnight UTC.
//! Text without a recognized phrase passes through unchanged. Consumers
//! store whatever comes back verbatim.

use time::{Duration, OffsetDateTime, Time, Weekday};

/// Result of scanning raw input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Input with the date phrase removed and whitespace collapsed.
    pub clean_text: String,
    /// Due timestamp in epoch milliseconds, when a phrase matched.
    pub due_date: Option<i64>,
}

/// Scan `raw` for a due-date phrase relative to the current day.
#[must_use]
pub fn parse(raw: &str) -> Extraction {
    parse_at(raw, OffsetDateTime::now_utc())
}

fn parse_at(raw: &str, now: OffsetDateTime) -> Extraction {
    let words: Vec<&str> = raw.split_whitespace().collect();

    let mut matched: Option<(usize, usize, i64)> = None;
    for (idx, word) in words.iter().enumerate() {
        let token = word.to_ascii_lowercase();
        let hit = match token.as_str() {
            "today" | "tonight" => Some((1, 0)),
            "tomorrow" => Some((1, 1)),
            "next"
                if words
                    .get(idx + 1)
                    .is_some_and(|next| next.eq_ignore_ascii_case("week")) =>
            {
                Some((2, 7))
            }
            "on" => words
                .get(idx + 1)
                .and_then(|next| weekday_from_token(&next.to_ascii_lowercase()))
                .map(|weekday| (2, days_until(now.weekday(), weekday))),
            _ => weekday_from_token(&token).map(|weekday| (1, days_until(now.weekday(), weekday))),
        };
        if let Some((len, days)) = hit {
            matched = Some((idx, len, days));
            break;
        }
    }

    matched.map_or_else(
        || Extraction {
            clean_text: raw.trim().to_owned(),
            due_date: None,
        },
        |(start, len, days)| {
            let clean: Vec<&str> = words
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx < start || *idx >= start + len)
                .map(|(_, word)| *word)
                .collect();
            Extraction {
                clean_text: clean.join(" "),
                due_date: Some(day_start_ms(now, days)),
            }
        },
    )
}

fn weekday_from_token(token: &str) -> Option<Weekday> {
    match token {
        "monday" | "mon" => Some(Weekday::Monday),
        "tuesday" | "tue" => Some(Weekday::Tuesday),
        "wednesday" | "wed" => Some(Weekday::Wednesday),
        "thursday" | "thu" => Some(Weekday::Thursday),
        "friday" | "fri" => Some(Weekday::Friday),
        "saturday" | "sat" => Some(Weekday::Saturday),
        "sunday" | "sun" => Some(Weekday::Sunday),
        _ => None,
    }
}

// The next occurrence of `to`, never the current day.
fn days_until(from: Weekday, to: Weekday) -> i64 {
    let from = i64::from(from.number_days_from_monday());
    let to = i64::from(to.number_days_from_monday());
    let diff = (to - from).rem_euclid(7);
    if diff == 0 { 7 } else { diff }
}

fn day_start_ms(now: OffsetDateTime, days_ahead: i64) -> i64 {
    let due = (now + Duration::days(days_ahead)).replace_time(Time::MIDNIGHT);
    i64::try_from(due.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}
