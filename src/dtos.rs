use serde::{Deserialize, Serialize};

pub trait Response{}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct UpdateReservationRequest{
    pub id: u32,
    #[serde(rename = "quantita")]
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct DeleteReservationRequest{
    pub id: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MessageResponse{
    #[serde(default)]
    pub success: bool,
    pub message: String,
}
impl Response for MessageResponse{}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorBody{
    pub error: String,
}
impl Response for ApiErrorBody{}
