use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const VIN_LEN: usize = 17;

#[derive(Debug, Error)]
pub enum VinError {
    #[error("invalid VIN: {0}")]
    Invalid(String),

    #[error("VIN could not be decoded: {0}")]
    NotDecoded(String),

    #[error("VIN service failure: {0}")]
    Upstream(String),
}

/// Decoded vehicle attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VinDetails {
    pub vin: String,
    pub make: String,
    pub model: Option<String>,
    pub model_year: Option<i32>,
    pub body_class: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub drive_type: Option<String>,
    pub engine_cylinders: Option<u32>,
    pub displacement_l: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    #[serde(rename = "Results")]
    results: Vec<DecodeResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DecodeResult {
    #[serde(rename = "Make")]
    make: Option<String>,
    #[serde(rename = "Model")]
    model: Option<String>,
    #[serde(rename = "ModelYear")]
    model_year: Option<String>,
    #[serde(rename = "BodyClass")]
    body_class: Option<String>,
    #[serde(rename = "FuelTypePrimary")]
    fuel_type: Option<String>,
    #[serde(rename = "TransmissionStyle")]
    transmission: Option<String>,
    #[serde(rename = "DriveType")]
    drive_type: Option<String>,
    #[serde(rename = "EngineCylinders")]
    engine_cylinders: Option<String>,
    #[serde(rename = "DisplacementL")]
    displacement_l: Option<String>,
    #[serde(rename = "ErrorText")]
    error_text: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_field<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

/// Upper-cases and checks a VIN: 17 characters, digits and letters except I, O and Q
pub fn normalize_vin(raw: &str) -> Result<String, VinError> {
    let vin = raw.trim().to_ascii_uppercase();
    let valid = vin.len() == VIN_LEN
        && vin
            .chars()
            .all(|c| c.is_ascii_digit() || (c.is_ascii_uppercase() && !matches!(c, 'I' | 'O' | 'Q')));
    if valid {
        Ok(vin)
    } else {
        Err(VinError::Invalid(
            "expected 17 characters of digits and letters other than I, O and Q".to_string(),
        ))
    }
}

/// Maps a vPIC `DecodeVinValues` body into [`VinDetails`]
pub fn parse_decode_response(vin: &str, body: &str) -> Result<VinDetails, VinError> {
    let response: DecodeResponse = serde_json::from_str(body)
        .map_err(|e| VinError::Upstream(format!("unexpected response body: {}", e)))?;
    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| VinError::NotDecoded("empty result set".to_string()))?;

    let Some(make) = non_empty(result.make) else {
        return Err(VinError::NotDecoded(
            non_empty(result.error_text).unwrap_or_else(|| "no make reported".to_string()),
        ));
    };

    Ok(VinDetails {
        vin: vin.to_string(),
        make,
        model: non_empty(result.model),
        model_year: parse_field(&result.model_year),
        body_class: non_empty(result.body_class),
        fuel_type: non_empty(result.fuel_type),
        transmission: non_empty(result.transmission),
        drive_type: non_empty(result.drive_type),
        engine_cylinders: parse_field(&result.engine_cylinders),
        displacement_l: parse_field(&result.displacement_l),
    })
}

/// Client for the vPIC vehicle decoding API
#[derive(Clone)]
pub struct VinDecoder {
    client: reqwest::Client,
    base_url: String,
}

impl VinDecoder {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn decode(&self, raw_vin: &str) -> Result<VinDetails, VinError> {
        let vin = normalize_vin(raw_vin)?;
        let url = format!(
            "{}/DecodeVinValues/{}?format=json",
            self.base_url,
            urlencoding::encode(&vin)
        );
        info!("Decoding VIN via {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| VinError::Upstream(e.to_string()))?;

        info!("Received response status: {}", response.status());

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VinError::Upstream(format!(
                "VIN API request failed: {}",
                error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VinError::Upstream(e.to_string()))?;
        debug!("Response body: {}", body);

        parse_decode_response(&vin, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_vin() {
        assert_eq!(normalize_vin(" 1hgcm82633a004352 ").unwrap(), "1HGCM82633A004352");
        assert!(normalize_vin("1HGCM82633A00435").is_err()); // 16 chars
        assert!(normalize_vin("1HGCM82633A00435O").is_err()); // contains O
        assert!(normalize_vin("1HGCM82633A0043-2").is_err());
    }

    #[test]
    fn test_parse_decode_response() {
        let body = r#"{"Count":1,"Message":"Results returned successfully","Results":[{
            "Make":"HONDA","Model":"Accord","ModelYear":"2003","BodyClass":"Coupe",
            "FuelTypePrimary":"Gasoline","TransmissionStyle":"Automatic","DriveType":"",
            "EngineCylinders":"6","DisplacementL":"3.0","ErrorCode":"0","ErrorText":""}]}"#;
        let details = parse_decode_response("1HGCM82633A004352", body).unwrap();
        assert_eq!(details.make, "HONDA");
        assert_eq!(details.model.as_deref(), Some("Accord"));
        assert_eq!(details.model_year, Some(2003));
        assert_eq!(details.drive_type, None);
        assert_eq!(details.engine_cylinders, Some(6));
        assert_eq!(details.displacement_l, Some(3.0));
    }

    #[test]
    fn test_undecodable_vin_reports_error_text() {
        let body = r#"{"Results":[{"Make":"","ErrorText":"11 - Incorrect Model Year"}]}"#;
        let err = parse_decode_response("1HGCM82633A004352", body).unwrap_err();
        assert!(matches!(err, VinError::NotDecoded(msg) if msg.contains("Incorrect Model Year")));
    }

    #[test]
    fn test_garbage_body_is_upstream_failure() {
        assert!(matches!(
            parse_decode_response("1HGCM82633A004352", "<html>"),
            Err(VinError::Upstream(_))
        ));
    }
}
