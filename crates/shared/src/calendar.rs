//! Brazilian national holidays for the events calendar
//!
//! Fixed-date holidays are listed directly; the movable ones are offsets from
//! Easter Sunday, computed with the anonymous Gregorian (Meeus/Jones/Butcher)
//! algorithm.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::IgrejasError;

/// First year of the Gregorian calendar the Easter algorithm is valid for
pub const MIN_CALENDAR_YEAR: i32 = 1583;
pub const MAX_CALENDAR_YEAR: i32 = 9999;

const FIXED_HOLIDAYS: &[(u32, u32, &str)] = &[
    (1, 1, "Ano Novo"),
    (4, 21, "Tiradentes"),
    (5, 1, "Dia do Trabalho"),
    (9, 7, "Independência do Brasil"),
    (10, 12, "Nossa Sra. Aparecida"),
    (11, 2, "Finados"),
    (11, 15, "Proclamação da República"),
    (11, 20, "Consciência Negra"),
    (12, 25, "Natal"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayKind {
    Fixed,
    Movable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: &'static str,
    pub kind: HolidayKind,
}

/// Easter Sunday for a Gregorian year
pub fn easter_sunday(year: i32) -> Result<NaiveDate, IgrejasError> {
    check_year(year)?;

    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| IgrejasError::Internal(format!("Easter out of range for {}", year)))
}

/// All national holidays of `year`, sorted by date.
///
/// When a movable holiday lands on a fixed one (Easter on Tiradentes in 2019)
/// both entries are kept, fixed first.
pub fn brazilian_holidays(year: i32) -> Result<Vec<Holiday>, IgrejasError> {
    let easter = easter_sunday(year)?;

    let mut holidays = Vec::with_capacity(FIXED_HOLIDAYS.len() + 4);
    for &(month, day, name) in FIXED_HOLIDAYS {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            IgrejasError::Internal(format!("Invalid holiday date {}-{}", month, day))
        })?;
        holidays.push(Holiday {
            date,
            name,
            kind: HolidayKind::Fixed,
        });
    }

    let movable = [
        (easter.checked_sub_days(Days::new(47)), "Carnaval"),
        (easter.checked_sub_days(Days::new(2)), "Sexta-feira Santa"),
        (Some(easter), "Páscoa"),
        (easter.checked_add_days(Days::new(60)), "Corpus Christi"),
    ];
    for (date, name) in movable {
        let date = date.ok_or_else(|| {
            IgrejasError::Internal(format!("Movable holiday {} out of range", name))
        })?;
        holidays.push(Holiday {
            date,
            name,
            kind: HolidayKind::Movable,
        });
    }

    // Stable sort keeps fixed entries ahead of movable ones on the same day
    holidays.sort_by_key(|h| h.date);
    Ok(holidays)
}

fn check_year(year: i32) -> Result<(), IgrejasError> {
    if !(MIN_CALENDAR_YEAR..=MAX_CALENDAR_YEAR).contains(&year) {
        return Err(IgrejasError::Validation(format!(
            "Year must be between {} and {}",
            MIN_CALENDAR_YEAR, MAX_CALENDAR_YEAR
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_easter_known_years() {
        assert_eq!(easter_sunday(2019).unwrap(), date(2019, 4, 21));
        assert_eq!(easter_sunday(2024).unwrap(), date(2024, 3, 31));
        assert_eq!(easter_sunday(2025).unwrap(), date(2025, 4, 20));
        assert_eq!(easter_sunday(2026).unwrap(), date(2026, 4, 5));
        assert_eq!(easter_sunday(2038).unwrap(), date(2038, 4, 25));
    }

    #[test]
    fn test_movable_holidays_2025() {
        let holidays = brazilian_holidays(2025).unwrap();
        let find = |name: &str| holidays.iter().find(|h| h.name == name).unwrap().date;

        assert_eq!(find("Carnaval"), date(2025, 3, 4));
        assert_eq!(find("Sexta-feira Santa"), date(2025, 4, 18));
        assert_eq!(find("Páscoa"), date(2025, 4, 20));
        assert_eq!(find("Corpus Christi"), date(2025, 6, 19));
    }

    #[test]
    fn test_holidays_are_sorted_and_complete() {
        let holidays = brazilian_holidays(2026).unwrap();
        assert_eq!(holidays.len(), 13);
        assert!(holidays.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(holidays.first().unwrap().name, "Ano Novo");
        assert_eq!(holidays.last().unwrap().name, "Natal");
    }

    #[test]
    fn test_easter_on_tiradentes_keeps_both() {
        let holidays = brazilian_holidays(2019).unwrap();
        let same_day: Vec<_> = holidays
            .iter()
            .filter(|h| h.date == date(2019, 4, 21))
            .collect();
        assert_eq!(same_day.len(), 2);
        assert_eq!(same_day[0].name, "Tiradentes");
        assert_eq!(same_day[1].name, "Páscoa");
    }

    #[test]
    fn test_year_out_of_range() {
        assert!(matches!(
            brazilian_holidays(1500),
            Err(IgrejasError::Validation(_))
        ));
        assert!(easter_sunday(10_000).is_err());
    }

    #[test]
    fn test_holiday_serializes_iso_date() {
        let holiday = Holiday {
            date: date(2025, 12, 25),
            name: "Natal",
            kind: HolidayKind::Fixed,
        };
        let json = serde_json::to_value(&holiday).unwrap();
        assert_eq!(json["date"], "2025-12-25");
        assert_eq!(json["kind"], "fixed");
    }
}
