use serde::{Deserialize, Serialize};

use crate::temperature::{categorize_temperature, to_fahrenheit, TempCategory};

/// Condition reported when the upstream payload carries no conditions at all
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Temperature block of the upstream payload, in the requested unit of measurement
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MainInfo {
    #[serde(default)]
    pub temp: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherCondition {
    /// Short label such as `Clear`, `Clouds` or `Rain`
    #[serde(default)]
    pub main: String,
}

/// Decoded OpenWeatherMap payload; the first condition, if any, is authoritative
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeatherData {
    #[serde(default)]
    pub main: MainInfo,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub weather_condition: String,
    pub temp_category: TempCategory,
}

impl WeatherResponse {
    pub fn from_weather_data(data: &WeatherData, unit_of_measurement: &str) -> Self {
        let weather_condition = data
            .weather
            .first()
            .filter(|condition| !condition.main.is_empty())
            .map(|condition| condition.main.clone())
            .unwrap_or_else(|| UNKNOWN_CONDITION.to_string());

        let temp_fahrenheit = to_fahrenheit(data.main.temp, unit_of_measurement);

        Self {
            weather_condition,
            temp_category: categorize_temperature(temp_fahrenheit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_data(temp: f64, conditions: &[&str]) -> WeatherData {
        WeatherData {
            main: MainInfo { temp },
            weather: conditions
                .iter()
                .map(|main| WeatherCondition {
                    main: main.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_response_from_celsius_data() {
        // -10C is 14F
        let response = WeatherResponse::from_weather_data(&weather_data(-10.0, &["Clear"]), "metric");
        assert_eq!(response.weather_condition, "Clear");
        assert_eq!(response.temp_category, TempCategory::Freezing);
    }

    #[test]
    fn test_response_from_fahrenheit_data() {
        let response = WeatherResponse::from_weather_data(&weather_data(75.0, &["Rain"]), "imperial");
        assert_eq!(response.weather_condition, "Rain");
        assert_eq!(response.temp_category, TempCategory::Mild);
    }

    #[test]
    fn test_first_condition_wins() {
        let response = WeatherResponse::from_weather_data(
            &weather_data(280.32, &["Snow", "Mist"]),
            "standard",
        );
        assert_eq!(response.weather_condition, "Snow");
        assert_eq!(response.temp_category, TempCategory::Cold);
    }

    #[test]
    fn test_missing_conditions_fall_back_to_unknown() {
        let response = WeatherResponse::from_weather_data(&weather_data(100.0, &[]), "imperial");
        assert_eq!(response.weather_condition, UNKNOWN_CONDITION);
        assert_eq!(response.temp_category, TempCategory::Hot);
    }

    #[test]
    fn test_blank_condition_label_falls_back_to_unknown() {
        let data: WeatherData =
            serde_json::from_str(r#"{"main":{"temp":280.32},"weather":[{"main":""}]}"#).unwrap();
        let response = WeatherResponse::from_weather_data(&data, "standard");
        assert_eq!(response.weather_condition, UNKNOWN_CONDITION);
        assert_eq!(response.temp_category, TempCategory::Cold);
    }

    #[test]
    fn test_condition_without_label_still_decodes() {
        let data: WeatherData =
            serde_json::from_str(r#"{"main":{"temp":280.32},"weather":[{"id":800}]}"#).unwrap();
        assert_eq!(data.weather.len(), 1);

        let response = WeatherResponse::from_weather_data(&data, "standard");
        assert_eq!(response.weather_condition, UNKNOWN_CONDITION);
    }

    #[test]
    fn test_weather_data_decoding() {
        let data: WeatherData = serde_json::from_str(
            r#"{"coord":{"lon":139,"lat":35},"main":{"temp":280.32,"humidity":81},"weather":[{"id":800,"main":"Clear"}]}"#,
        )
        .unwrap();
        assert_eq!(data, weather_data(280.32, &["Clear"]));

        let empty: WeatherData = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, WeatherData::default());
    }

    #[test]
    fn test_response_serialization() {
        let response = WeatherResponse {
            weather_condition: "Clear".to_string(),
            temp_category: TempCategory::Cold,
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"weatherCondition":"Clear","tempCategory":"Cold"}"#
        );
    }
}
