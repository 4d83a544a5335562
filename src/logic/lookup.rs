//! Clients for the age, gender and nationality inference services
//! (agify.io, genderize.io and nationalize.io by default).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::EnrichmentConfig;
use crate::error::LookupError;

/// The three per-name lookups the enrichment pipeline relies on.
#[async_trait::async_trait]
pub trait NameLookup: Send + Sync {
    async fn fetch_age(&self, name: &str) -> Result<i32, LookupError>;
    /// May be empty when the service cannot tell.
    async fn fetch_gender_label(&self, name: &str) -> Result<String, LookupError>;
    /// Country code with the highest probability.
    async fn fetch_nationality_code(&self, name: &str) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct AgeResponse {
    #[serde(default)]
    age: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GenderResponse {
    #[serde(default)]
    gender: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NationalityResponse {
    #[serde(default)]
    country: Vec<CountryCandidate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryCandidate {
    pub country_id: String,
    pub probability: f64,
}

/// Highest probability wins; on a tie the earliest candidate is kept.
pub fn most_probable(candidates: &[CountryCandidate]) -> Option<&CountryCandidate> {
    let mut best: Option<&CountryCandidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.probability <= current.probability => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// HTTP implementation of [`NameLookup`]. Every call goes to the network;
/// nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct HttpNameLookup {
    http: reqwest::Client,
    age_url: String,
    gender_url: String,
    nationality_url: String,
}

impl HttpNameLookup {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            age_url: config.age_url.clone(),
            gender_url: config.gender_url.clone(),
            nationality_url: config.nationality_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, service: &'static str, url: &str, name: &str) -> Result<T, LookupError> {
        log::info!("Requesting {} data for name: {}", service, name);

        let response = self
            .http
            .get(url)
            .query(&[("name", name)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| {
                log::error!("Failed to request {} API: {}", service, source);
                LookupError::Transport { service, source }
            })?;

        log::debug!("Received response from {} API with status: {}", service, response.status());

        response.json::<T>().await.map_err(|source| {
            log::error!("Failed to decode {} API response: {}", service, source);
            LookupError::Decode { service, source }
        })
    }
}

#[async_trait::async_trait]
impl NameLookup for HttpNameLookup {
    async fn fetch_age(&self, name: &str) -> Result<i32, LookupError> {
        let response: AgeResponse = self.get_json("age", &self.age_url, name).await?;
        let age = response.age.unwrap_or_default();
        log::info!("Successfully determined age {} for name: {}", age, name);
        Ok(age)
    }

    async fn fetch_gender_label(&self, name: &str) -> Result<String, LookupError> {
        let response: GenderResponse = self.get_json("gender", &self.gender_url, name).await?;
        let gender = response.gender.unwrap_or_default();
        log::info!("Successfully determined gender '{}' for name: {}", gender, name);
        Ok(gender)
    }

    async fn fetch_nationality_code(&self, name: &str) -> Result<String, LookupError> {
        let response: NationalityResponse = self.get_json("nationality", &self.nationality_url, name).await?;

        let Some(best) = most_probable(&response.country) else {
            log::warn!("No nationality data found for name: {}", name);
            return Err(LookupError::NoCountry { name: name.to_string() });
        };

        log::info!(
            "Successfully determined nationality '{}' (probability: {:.2}) for name: {}",
            best.country_id,
            best.probability,
            name
        );
        Ok(best.country_id.clone())
    }
}
