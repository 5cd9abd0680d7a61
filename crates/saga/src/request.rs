//! Booking requests: the saga input and the per-leg step requests derived from it.

use chrono::{DateTime, Utc};
use common::BookingId;
use serde::{Deserialize, Serialize};

use crate::error::{StepError, ValidationError};

/// Aggregate input of the booking saga.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub booking_id: BookingId,
    pub user_id: String,
    pub hotel: HotelRequest,
    pub dinner: DinnerRequest,
    pub parking: ParkingRequest,
}

/// Hotel leg of a [`BookingRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelRequest {
    pub hotel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<DateTime<Utc>>,
}

/// Dinner leg of a [`BookingRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinnerRequest {
    pub menu_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
}

/// Parking leg of a [`BookingRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingRequest {
    pub space_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::MissingField { field });
    }
    Ok(())
}

fn require_ordered(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    field: &'static str,
    start_field: &str,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end)
        && end <= start
    {
        return Err(ValidationError::InvalidField {
            field,
            reason: format!("must be after {start_field}"),
        });
    }
    Ok(())
}

impl BookingRequest {
    /// Checks the structural invariants of the whole request.
    ///
    /// Runs once at saga entry; a failure means no step is attempted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(self.booking_id.as_str(), "booking_id")?;
        require(&self.user_id, "user_id")?;
        require(&self.hotel.hotel_id, "hotel.hotel_id")?;
        require(&self.dinner.menu_type, "dinner.menu_type")?;
        require(&self.parking.space_type, "parking.space_type")?;

        require_ordered(
            self.hotel.check_in,
            self.hotel.check_out,
            "hotel.check_out",
            "hotel.check_in",
        )?;
        require_ordered(
            self.parking.start_time,
            self.parking.end_time,
            "parking.end_time",
            "parking.start_time",
        )?;
        if self.dinner.guests == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "dinner.guests",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the request handed to the hotel booking step.
    pub fn hotel_request(&self) -> HotelBookingRequest {
        HotelBookingRequest {
            booking_id: self.booking_id.clone(),
            user_id: self.user_id.clone(),
            hotel: self.hotel.clone(),
        }
    }

    /// Builds the request handed to the dinner booking step.
    pub fn dinner_request(&self) -> DinnerBookingRequest {
        DinnerBookingRequest {
            booking_id: self.booking_id.clone(),
            user_id: self.user_id.clone(),
            dinner: self.dinner.clone(),
        }
    }

    /// Builds the request handed to the parking booking step.
    pub fn parking_request(&self) -> ParkingBookingRequest {
        ParkingBookingRequest {
            booking_id: self.booking_id.clone(),
            user_id: self.user_id.clone(),
            parking: self.parking.clone(),
        }
    }
}

// Step-level requests. Each step re-validates its own slice.

fn step_require(value: &str, code: &str, field: &str) -> Result<(), StepError> {
    if is_blank(value) {
        return Err(StepError::business(code, format!("{field} is required")));
    }
    Ok(())
}

fn step_require_identity(booking_id: &BookingId, user_id: &str) -> Result<(), StepError> {
    step_require(booking_id.as_str(), "INVALID_BOOKING_ID", "BookingID")?;
    step_require(user_id, "INVALID_USER_ID", "UserID")
}

/// Input of the hotel booking step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelBookingRequest {
    pub booking_id: BookingId,
    pub user_id: String,
    pub hotel: HotelRequest,
}

impl HotelBookingRequest {
    /// Validates the request, failing with a business error.
    pub fn validate(&self) -> Result<(), StepError> {
        step_require_identity(&self.booking_id, &self.user_id)?;
        step_require(&self.hotel.hotel_id, "INVALID_HOTEL_ID", "HotelID")
    }
}

/// Input of the dinner booking step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinnerBookingRequest {
    pub booking_id: BookingId,
    pub user_id: String,
    pub dinner: DinnerRequest,
}

impl DinnerBookingRequest {
    /// Validates the request, failing with a business error.
    pub fn validate(&self) -> Result<(), StepError> {
        step_require_identity(&self.booking_id, &self.user_id)?;
        step_require(&self.dinner.menu_type, "INVALID_MENU_TYPE", "MenuType")
    }
}

/// Input of the parking booking step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingBookingRequest {
    pub booking_id: BookingId,
    pub user_id: String,
    pub parking: ParkingRequest,
}

impl ParkingBookingRequest {
    /// Validates the request, failing with a business error.
    pub fn validate(&self) -> Result<(), StepError> {
        step_require_identity(&self.booking_id, &self.user_id)?;
        step_require(&self.parking.space_type, "INVALID_SPACE_TYPE", "SpaceType")
    }
}
