//! Date helper functions

use chrono::{DateTime, Datelike, TimeZone, Timelike};

/// Month-name locale for formatted dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    PtBr,
}

impl Locale {
    /// Resolve a BCP 47-ish language tag ("en", "pt-BR", "pt_br")
    pub fn from_tag(tag: &str) -> Self {
        let lower = tag.to_ascii_lowercase();
        if lower.starts_with("pt") {
            Locale::PtBr
        } else {
            Locale::En
        }
    }

    /// Abbreviated month name, `month` in 1..=12
    pub fn month_short(&self, month: u32) -> &'static str {
        let idx = (month.saturating_sub(1)) as usize % 12;
        match self {
            Locale::En => [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
                "Dec",
            ][idx],
            Locale::PtBr => [
                "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov",
                "dez",
            ][idx],
        }
    }

    /// Full month name, `month` in 1..=12
    pub fn month_full(&self, month: u32) -> &'static str {
        let idx = (month.saturating_sub(1)) as usize % 12;
        match self {
            Locale::En => [
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ][idx],
            Locale::PtBr => [
                "janeiro",
                "fevereiro",
                "março",
                "abril",
                "maio",
                "junho",
                "julho",
                "agosto",
                "setembro",
                "outubro",
                "novembro",
                "dezembro",
            ][idx],
        }
    }
}

/// Format a date using a date-fns-style pattern
///
/// Tokens: `yyyy`/`yy`, `MMMM`/`MMM`/`MM`/`M`, `dd`/`d`, `HH`, `mm`, `ss`.
/// Single-quoted runs are literals, `''` is an escaped quote.
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", Locale::En) // -> "15 Apr 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, pattern: &str, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::with_capacity(pattern.len() + 8);
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            // quoted literal runs to the next single quote
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                out.push(chars[i]);
                i += 1;
            }
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        match (c, run) {
            ('y', n) if n >= 4 => out.push_str(&format!("{:04}", date.year())),
            ('y', _) => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
            ('M', n) if n >= 4 => out.push_str(locale.month_full(date.month())),
            ('M', 3) => out.push_str(locale.month_short(date.month())),
            ('M', 2) => out.push_str(&format!("{:02}", date.month())),
            ('M', _) => out.push_str(&date.month().to_string()),
            ('d', n) if n >= 2 => out.push_str(&format!("{:02}", date.day())),
            ('d', _) => out.push_str(&date.day().to_string()),
            ('H', _) => out.push_str(&format!("{:02}", date.hour())),
            ('m', _) => out.push_str(&format!("{:02}", date.minute())),
            ('s', _) => out.push_str(&format!("{:02}", date.second())),
            _ => {
                for _ in 0..run {
                    out.push(c);
                }
            }
        }
        i += run;
    }

    out
}

/// Generate a <time> HTML element with a machine-readable datetime attribute
pub fn time_tag<Tz: TimeZone>(date: &DateTime<Tz>, pattern: &str, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let datetime = date.format("%Y-%m-%dT%H:%M:%S%:z").to_string();
    let display = format_date(date, pattern, locale);
    format!(r#"<time datetime="{}">{}</time>"#, datetime, display)
}
