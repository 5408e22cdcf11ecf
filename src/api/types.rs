use serde::Serialize;

use crate::models::booking::Spectator;
use crate::models::show::ShowDetails;
use crate::models::theater::Theater;
use crate::models::user::Role;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedDto {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub totp_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct TotpSetupDto {
    pub secret: String,
    pub provisioning_uri: String,
}

#[derive(Debug, Serialize)]
pub struct TheaterDetailDto {
    #[serde(flatten)]
    pub theater: Theater,
    pub shows: Vec<ShowDetails>,
}

#[derive(Debug, Serialize)]
pub struct ShowDetailDto {
    #[serde(flatten)]
    pub show: ShowDetails,
    /// Only filled in for managers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectators: Option<Vec<Spectator>>,
}

#[derive(Debug, Serialize)]
pub struct BookingCreatedDto {
    pub id: i32,
    pub show_id: i32,
    pub available: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub database: bool,
    pub uptime_seconds: u64,
    pub version: String,
}
