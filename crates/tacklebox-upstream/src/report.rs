//! Reshaping of an Open-Meteo forecast into the weather report payload.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Result, UpstreamError};
use crate::storm::StormAlert;
use crate::weather::{Coordinates, ForecastResponse, FORECAST_DAYS};

/// Conditions for the first hourly slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i32>,
    /// `YYYY-MM-DD HH:MM` local time.
    pub time: String,
}

/// Sun times and rain total for the first forecast day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Today {
    pub sunrise: String,
    pub sunset: String,
    pub precipitation_sum: Option<f64>,
}

/// One hour of today's forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct HourlyForecast {
    /// `HH:MM` local time.
    pub time: String,
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i32>,
    pub storm_alert: StormAlert,
}

/// One day of the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct DailyForecast {
    pub date: String,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub wind_direction_dominant: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub weather_code: Option<i32>,
    pub sunrise: String,
    pub sunset: String,
    pub storm_alert: StormAlert,
}

/// The full weather payload returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    /// The place name the client asked for, if any.
    pub location: Option<String>,
    /// Where the forecast applies.
    pub coordinates: Coordinates,
    /// Conditions right now.
    pub current: CurrentConditions,
    /// Today's sun times and rain total.
    pub today: Today,
    /// Alert for the current conditions.
    pub storm_alert: StormAlert,
    /// Remaining hours of today.
    pub hourly_forecast: Vec<HourlyForecast>,
    /// Day-by-day outlook.
    pub forecast: Vec<DailyForecast>,
}

/// Build the report from a raw forecast.
///
/// "Today" is the first day of the daily series, which Open-Meteo reports in
/// the requested timezone.
///
/// # Errors
///
/// Returns [`UpstreamError::Forecast`] if the series are empty or carry
/// timestamps that cannot be parsed.
pub fn build_report(
    location: Option<String>,
    coordinates: Coordinates,
    forecast: &ForecastResponse,
) -> Result<WeatherReport> {
    let hourly = &forecast.hourly;
    let daily = &forecast.daily;

    let first_hour = hourly
        .time
        .first()
        .ok_or_else(|| malformed("hourly series is empty"))?;
    let first_day = daily
        .time
        .first()
        .ok_or_else(|| malformed("daily series is empty"))?;
    let today_date = NaiveDate::parse_from_str(first_day, "%Y-%m-%d")
        .map_err(|e| malformed(&format!("bad date {first_day:?}: {e}")))?;

    let current = CurrentConditions {
        temperature: at(&hourly.temperature_2m, 0),
        wind_speed: at(&hourly.wind_speed_10m, 0),
        wind_direction: at(&hourly.wind_direction_10m, 0),
        precipitation: at(&hourly.precipitation, 0),
        weather_code: at(&hourly.weather_code, 0),
        time: parse_local(first_hour)?
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    };

    let today = Today {
        sunrise: clock_time(daily.sunrise.first())?,
        sunset: clock_time(daily.sunset.first())?,
        precipitation_sum: at(&daily.precipitation_sum, 0),
    };

    let storm_alert = alert(current.weather_code, current.precipitation);

    let mut hourly_forecast = Vec::new();
    for (i, stamp) in hourly.time.iter().enumerate() {
        let time = parse_local(stamp)?;
        if time.date() != today_date {
            continue;
        }
        let weather_code = at(&hourly.weather_code, i);
        let precipitation = at(&hourly.precipitation, i);
        hourly_forecast.push(HourlyForecast {
            time: time.format("%H:%M").to_string(),
            temperature: at(&hourly.temperature_2m, i),
            wind_speed: at(&hourly.wind_speed_10m, i),
            wind_direction: at(&hourly.wind_direction_10m, i),
            precipitation,
            weather_code,
            storm_alert: alert(weather_code, precipitation),
        });
    }

    let mut days = Vec::with_capacity(FORECAST_DAYS);
    for (i, date) in daily.time.iter().take(FORECAST_DAYS).enumerate() {
        let weather_code = at(&daily.weather_code, i);
        let precipitation_sum = at(&daily.precipitation_sum, i);
        days.push(DailyForecast {
            date: date.clone(),
            temperature_max: at(&daily.temperature_2m_max, i),
            temperature_min: at(&daily.temperature_2m_min, i),
            wind_speed_max: at(&daily.wind_speed_10m_max, i),
            wind_direction_dominant: at(&daily.wind_direction_10m_dominant, i),
            precipitation_sum,
            weather_code,
            sunrise: clock_time(daily.sunrise.get(i))?,
            sunset: clock_time(daily.sunset.get(i))?,
            storm_alert: alert(weather_code, precipitation_sum),
        });
    }

    Ok(WeatherReport {
        location,
        coordinates,
        current,
        today,
        storm_alert,
        hourly_forecast,
        forecast: days,
    })
}

fn at<T: Copy>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).copied().flatten()
}

fn alert(weather_code: Option<i32>, precipitation: Option<f64>) -> StormAlert {
    StormAlert::classify(weather_code.unwrap_or(0), precipitation.unwrap_or(0.0))
}

fn parse_local(stamp: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| malformed(&format!("bad timestamp {stamp:?}: {e}")))
}

fn clock_time(stamp: Option<&String>) -> Result<String> {
    let stamp = stamp.ok_or_else(|| malformed("missing sunrise/sunset"))?;
    Ok(parse_local(stamp)?.format("%H:%M").to_string())
}

fn malformed(detail: &str) -> UpstreamError {
    UpstreamError::Forecast(format!("malformed forecast: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coords() -> Coordinates {
        Coordinates {
            latitude: 44.28,
            longitude: -73.98,
            timezone: "America/New_York".to_string(),
        }
    }

    fn sample() -> ForecastResponse {
        let days: Vec<String> = (1..=15).map(|d| format!("2026-10-{d:02}")).collect();
        let sunrise: Vec<String> = days.iter().map(|d| format!("{d}T07:01")).collect();
        let sunset: Vec<String> = days.iter().map(|d| format!("{d}T18:30")).collect();
        let n = days.len();

        serde_json::from_value(json!({
            "hourly": {
                "time": ["2026-10-01T00:00", "2026-10-01T01:00", "2026-10-01T02:00", "2026-10-02T00:00"],
                "temperature_2m": [10.5, 10.1, 9.8, 8.0],
                "wind_speed_10m": [12.0, 11.0, 9.5, 4.0],
                "wind_direction_10m": [180, 190, 200, 90],
                "precipitation": [0.0, 12.0, 0.4, 0.0],
                "weather_code": [3, 61, 95, 0]
            },
            "daily": {
                "time": days,
                "temperature_2m_max": vec![15.0; n],
                "temperature_2m_min": vec![5.0; n],
                "wind_speed_10m_max": vec![20.0; n],
                "wind_direction_10m_dominant": vec![200; n],
                "sunrise": sunrise,
                "sunset": sunset,
                "precipitation_sum": vec![16.0; n],
                "weather_code": vec![2; n]
            }
        }))
        .unwrap()
    }

    #[test]
    fn current_is_first_hour() {
        let report = build_report(Some("Lake Placid".into()), coords(), &sample()).unwrap();

        assert_eq!(report.current.time, "2026-10-01 00:00");
        assert_eq!(report.current.temperature, Some(10.5));
        assert_eq!(report.current.weather_code, Some(3));
        assert_eq!(report.storm_alert, StormAlert::NoRisk);
    }

    #[test]
    fn today_has_sun_times() {
        let report = build_report(None, coords(), &sample()).unwrap();

        assert_eq!(report.today.sunrise, "07:01");
        assert_eq!(report.today.sunset, "18:30");
        assert_eq!(report.today.precipitation_sum, Some(16.0));
    }

    #[test]
    fn hourly_forecast_is_limited_to_today() {
        let report = build_report(None, coords(), &sample()).unwrap();

        let times: Vec<&str> = report.hourly_forecast.iter().map(|h| h.time.as_str()).collect();
        assert_eq!(times, ["00:00", "01:00", "02:00"]);
        assert_eq!(report.hourly_forecast[1].storm_alert, StormAlert::Minor);
        assert_eq!(report.hourly_forecast[2].storm_alert, StormAlert::Severe);
    }

    #[test]
    fn daily_forecast_is_capped_at_fourteen_days() {
        let report = build_report(None, coords(), &sample()).unwrap();

        assert_eq!(report.forecast.len(), 14);
        assert_eq!(report.forecast[0].date, "2026-10-01");
        assert_eq!(report.forecast[13].date, "2026-10-14");
        // 16 mm of rain outranks the clear-sky code
        assert_eq!(report.forecast[0].storm_alert, StormAlert::Moderate);
        assert_eq!(report.forecast[0].wind_direction_dominant, Some(200.0));
    }

    #[test]
    fn short_series_are_not_padded() {
        let mut forecast = sample();
        forecast.daily.time.truncate(3);

        let report = build_report(None, coords(), &forecast).unwrap();
        assert_eq!(report.forecast.len(), 3);
    }

    #[test]
    fn empty_series_is_an_error() {
        let mut forecast = sample();
        forecast.hourly.time.clear();

        let err = build_report(None, coords(), &forecast).unwrap_err();
        assert!(err.to_string().starts_with("Weather API error: malformed forecast"));
    }

    #[test]
    fn missing_values_serialize_as_null() {
        let mut forecast = sample();
        forecast.hourly.temperature_2m = vec![None];

        let report = build_report(None, coords(), &forecast).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["current"]["temperature"].is_null());
        assert!(json["location"].is_null());
        assert_eq!(json["storm_alert"], "No storm risk.");
        assert_eq!(json["coordinates"]["timezone"], "America/New_York");
    }
}
