//! Current-conditions providers.
//!
//! | Source                 | Backing                                   |
//! |------------------------|-------------------------------------------|
//! | [`WeatherApiSource`]   | weatherapi.com `current.json` over HTTP   |
//! | [`FixedConditionSource`] | constant code (bench / simulation)      |
//!
//! Both implement [`ConditionCodeSource`].  Failures never propagate: they
//! are logged and surface as [`UNKNOWN_CONDITION_CODE`], which classifies
//! as clear weather.

use log::{debug, info, warn};
use serde::Deserialize;

use crate::app::ports::{ConditionCodeSource, HttpPort, UNKNOWN_CONDITION_CODE};
use crate::config::{StationConfig, WeatherApiConfig};

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    code: i32,
}

/// Extract `current.condition.code` from a `current.json` document.
pub fn parse_condition_code(body: &str) -> Option<i32> {
    serde_json::from_str::<CurrentWeather>(body)
        .ok()
        .map(|w| w.current.condition.code)
}

pub struct WeatherApiSource<H: HttpPort> {
    http: H,
    url: String,
}

impl<H: HttpPort> WeatherApiSource<H> {
    pub fn new(http: H, api: &WeatherApiConfig, station: &StationConfig) -> Self {
        let url = format!(
            "{}?key={}&q={},{}",
            api.base_url, api.api_key, station.latitude, station.longitude
        );
        Self { http, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<H: HttpPort> ConditionCodeSource for WeatherApiSource<H> {
    fn fetch_current_code(&mut self) -> i32 {
        let resp = match self.http.get(&self.url) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Weather: request failed: {}", e);
                return UNKNOWN_CONDITION_CODE;
            }
        };
        if !resp.is_success() {
            warn!("Weather: HTTP {}", resp.status);
            return UNKNOWN_CONDITION_CODE;
        }
        match parse_condition_code(&resp.body) {
            Some(code) => {
                debug!("Weather: condition code {}", code);
                code
            }
            None => {
                warn!("Weather: unparsable response");
                UNKNOWN_CONDITION_CODE
            }
        }
    }
}

/// Always reports the same code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConditionSource(pub i32);

impl ConditionCodeSource for FixedConditionSource {
    fn fetch_current_code(&mut self) -> i32 {
        self.0
    }
}

/// Source selected by configuration: the fixed override when one is set,
/// the HTTP provider otherwise.
pub enum ConfiguredSource<H: HttpPort> {
    Api(WeatherApiSource<H>),
    Fixed(FixedConditionSource),
}

impl<H: HttpPort> ConfiguredSource<H> {
    pub fn from_config(http: H, api: &WeatherApiConfig, station: &StationConfig) -> Self {
        if let Some(code) = api.condition_override {
            info!("Weather: using fixed condition code {}", code);
            return Self::Fixed(FixedConditionSource(code));
        }
        if api.api_key.is_empty() {
            warn!("Weather: no API key configured, requests will be rejected");
        }
        Self::Api(WeatherApiSource::new(http, api, station))
    }
}

impl<H: HttpPort> ConditionCodeSource for ConfiguredSource<H> {
    fn fetch_current_code(&mut self) -> i32 {
        match self {
            Self::Api(s) => s.fetch_current_code(),
            Self::Fixed(s) => s.fetch_current_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HttpResponse;
    use crate::error::TransportError;

    struct Canned(Result<HttpResponse, TransportError>, Vec<String>);

    impl HttpPort for Canned {
        fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError> {
            self.1.push(url.to_string());
            self.0.clone()
        }
        fn put(&mut self, _url: &str, _body: &str) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Io)
        }
    }

    const SAMPLE: &str = r#"{
        "location": {"name": "Delft", "lat": 51.94, "lon": 4.37},
        "current": {"temp_c": 11.0, "condition": {"text": "Heavy rain", "icon": "//cdn/296.png", "code": 1195}}
    }"#;

    fn source(resp: Result<HttpResponse, TransportError>) -> WeatherApiSource<Canned> {
        let api = WeatherApiConfig {
            api_key: "k3y".into(),
            ..WeatherApiConfig::default()
        };
        WeatherApiSource::new(Canned(resp, Vec::new()), &api, &StationConfig::default())
    }

    #[test]
    fn reads_condition_code() {
        let mut s = source(Ok(HttpResponse {
            status: 200,
            body: SAMPLE.into(),
        }));
        assert_eq!(s.fetch_current_code(), 1195);
        assert!(s.http.1[0].starts_with("http://api.weatherapi.com/v1/current.json?key=k3y&q=51.9"));
    }

    #[test]
    fn transport_failure_is_unknown() {
        let mut s = source(Err(TransportError::Timeout));
        assert_eq!(s.fetch_current_code(), UNKNOWN_CONDITION_CODE);
    }

    #[test]
    fn error_status_is_unknown() {
        let mut s = source(Ok(HttpResponse {
            status: 401,
            body: r#"{"error":{"code":2006,"message":"API key is invalid."}}"#.into(),
        }));
        assert_eq!(s.fetch_current_code(), UNKNOWN_CONDITION_CODE);
    }

    #[test]
    fn missing_code_is_unknown() {
        assert_eq!(parse_condition_code(r#"{"current":{"temp_c":3}}"#), None);
        assert_eq!(parse_condition_code("not json"), None);
    }

    #[test]
    fn override_bypasses_http() {
        let api = WeatherApiConfig {
            condition_override: Some(1087),
            ..WeatherApiConfig::default()
        };
        let http = Canned(Err(TransportError::Connect), Vec::new());
        let mut s = ConfiguredSource::from_config(http, &api, &StationConfig::default());
        assert_eq!(s.fetch_current_code(), 1087);
        assert!(matches!(s, ConfiguredSource::Fixed(_)));
    }

    #[test]
    fn fixed_source_is_constant() {
        let mut s = FixedConditionSource(1100);
        assert_eq!(s.fetch_current_code(), 1100);
        assert_eq!(s.fetch_current_code(), 1100);
    }
}
