// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON records exchanged with a volume driver.
//!
//! Field names are PascalCase and every response carries an `Err` string that
//! is empty on success. Missing fields decode to their defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use volman_core::MountConfig;

use crate::error::DriverError;

/// Conversion between a wire response and the driver's `Result`.
pub trait WireResponse: Serialize + DeserializeOwned + Send + 'static {
    /// Success payload carried alongside `Err`.
    type Payload: Send;

    /// Builds the wire shape of a driver result.
    fn from_result(result: Result<Self::Payload, DriverError>) -> Self;

    /// Splits the wire shape back into a result.
    fn into_result(self) -> Result<Self::Payload, DriverError>;

    /// Failure-only response used when a request cannot be read or decoded.
    fn failure(err: &DriverError) -> Self
    where
        Self: Sized,
    {
        Self::from_result(Err(err.clone()))
    }
}

fn err_field(result: &Result<impl Sized, DriverError>) -> String {
    match result {
        Ok(_) => String::new(),
        Err(e) => e.to_wire(),
    }
}

fn check_err(err: &str) -> Result<(), DriverError> {
    if err.is_empty() {
        Ok(())
    } else {
        Err(DriverError::from_wire(err))
    }
}

/// Response to Activate: the capabilities the driver implements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivateResponse {
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub err: String,
}

impl WireResponse for ActivateResponse {
    type Payload = Vec<String>;

    fn from_result(result: Result<Vec<String>, DriverError>) -> Self {
        let err = err_field(&result);
        Self {
            implements: result.unwrap_or_default(),
            err,
        }
    }

    fn into_result(self) -> Result<Vec<String>, DriverError> {
        check_err(&self.err)?;
        Ok(self.implements)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetRequest {
    #[serde(default)]
    pub name: String,
}

/// Volume as reported by Get.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mountpoint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetResponse {
    #[serde(default)]
    pub volume: VolumeInfo,
    #[serde(default)]
    pub err: String,
}

impl WireResponse for GetResponse {
    type Payload = VolumeInfo;

    fn from_result(result: Result<VolumeInfo, DriverError>) -> Self {
        let err = err_field(&result);
        Self {
            volume: result.unwrap_or_default(),
            err,
        }
    }

    fn into_result(self) -> Result<VolumeInfo, DriverError> {
        check_err(&self.err)?;
        Ok(self.volume)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PathRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PathResponse {
    #[serde(default)]
    pub mountpoint: String,
    #[serde(default)]
    pub err: String,
}

impl WireResponse for PathResponse {
    type Payload = String;

    fn from_result(result: Result<String, DriverError>) -> Self {
        let err = err_field(&result);
        Self {
            mountpoint: result.unwrap_or_default(),
            err,
        }
    }

    fn into_result(self) -> Result<String, DriverError> {
        check_err(&self.err)?;
        Ok(self.mountpoint)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub opts: MountConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub opts: MountConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountResponse {
    #[serde(default)]
    pub mountpoint: String,
    #[serde(default)]
    pub err: String,
}

impl WireResponse for MountResponse {
    type Payload = String;

    fn from_result(result: Result<String, DriverError>) -> Self {
        let err = err_field(&result);
        Self {
            mountpoint: result.unwrap_or_default(),
            err,
        }
    }

    fn into_result(self) -> Result<String, DriverError> {
        check_err(&self.err)?;
        Ok(self.mountpoint)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnmountRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoveRequest {
    #[serde(default)]
    pub name: String,
}

/// Response for operations with no payload (Create, Unmount, Remove).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub err: String,
}

impl WireResponse for ErrorResponse {
    type Payload = ();

    fn from_result(result: Result<(), DriverError>) -> Self {
        Self {
            err: err_field(&result),
        }
    }

    fn into_result(self) -> Result<(), DriverError> {
        check_err(&self.err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_request_uses_pascal_case_fields() {
        let mut opts = MountConfig::new();
        opts.insert("source".into(), serde_json::json!("nfs://server/export"));
        let req = MountRequest {
            name: "vol1".into(),
            opts,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["Name"], "vol1");
        assert_eq!(json["Opts"]["source"], "nfs://server/export");
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let req: MountRequest = serde_json::from_str(r#"{"Name":"vol1"}"#).unwrap();
        assert!(req.opts.is_empty());

        let resp: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.err.is_empty());
        assert_eq!(resp.into_result(), Ok(()));
    }

    #[test]
    fn get_response_carries_volume_info() {
        let resp = GetResponse::from_result(Ok(VolumeInfo {
            name: "some-volume".into(),
            mountpoint: "dummy_path".into(),
        }));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""Volume":{"Name":"some-volume","Mountpoint":"dummy_path"}"#));
        assert!(json.contains(r#""Err":"""#));
    }

    #[test]
    fn failure_populates_only_err() {
        let resp = MountResponse::failure(&DriverError::decode("expected value at line 1"));
        assert!(resp.mountpoint.is_empty());
        assert_eq!(resp.err, "decode error: expected value at line 1");
    }

    #[test]
    fn non_empty_err_becomes_an_error() {
        let resp = PathResponse {
            mountpoint: "/ignored".into(),
            err: "volume vol9 not found".into(),
        };
        assert_eq!(
            resp.into_result(),
            Err(DriverError::Failed("volume vol9 not found".into()))
        );
    }
}
