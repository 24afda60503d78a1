use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UrlBuildError {
    #[error("error parsing base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Build the OpenWeatherMap request URL for a coordinate lookup.
///
/// `lat`, `lon`, `appid` and `units` replace any same-named parameters already present on
/// `base_url`; other parameters are kept. Keys are emitted in lexicographic order so identical
/// inputs always produce identical URLs.
pub fn build_openweathermap_url(
    base_url: &str,
    api_key: &str,
    lat: &str,
    lon: &str,
    unit_of_measurement: &str,
) -> Result<String, UrlBuildError> {
    let mut url = Url::parse(base_url).map_err(|source| UrlBuildError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    for (key, value) in [
        ("lat", lat),
        ("lon", lon),
        ("appid", api_key),
        ("units", unit_of_measurement),
    ] {
        params.insert(key.to_string(), vec![value.to_string()]);
    }

    url.query_pairs_mut().clear().extend_pairs(
        params
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key, value))),
    );

    Ok(url.into())
}
