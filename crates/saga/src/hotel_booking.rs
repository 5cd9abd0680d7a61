//! Hotel booking saga constants and the legs it is made of.

use serde::{Deserialize, Serialize};

/// The saga type identifier for the hotel booking saga.
pub const SAGA_TYPE: &str = "HotelBooking";

/// One reservation leg of the saga, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    Hotel,
    Dinner,
    Parking,
}

impl Leg {
    /// All legs in the order the coordinator books them.
    pub const ORDER: [Leg; 3] = [Leg::Hotel, Leg::Dinner, Leg::Parking];

    /// Returns the leg name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Leg::Hotel => "hotel",
            Leg::Dinner => "dinner",
            Leg::Parking => "parking",
        }
    }

    /// Journal step name of the booking step for this leg.
    pub fn step_name(&self) -> &'static str {
        match self {
            Leg::Hotel => "book_hotel",
            Leg::Dinner => "book_dinner",
            Leg::Parking => "book_parking",
        }
    }

    /// Activity name of the compensation step for this leg.
    pub fn compensation_name(&self) -> &'static str {
        match self {
            Leg::Hotel => "compensate_hotel",
            Leg::Dinner => "compensate_dinner",
            Leg::Parking => "compensate_parking",
        }
    }
}

impl std::fmt::Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        let steps: Vec<&str> = Leg::ORDER.iter().map(Leg::step_name).collect();
        assert_eq!(steps, vec!["book_hotel", "book_dinner", "book_parking"]);
        assert_eq!(Leg::Parking.compensation_name(), "compensate_parking");
        assert_eq!(Leg::Dinner.to_string(), "dinner");
    }

    #[test]
    fn test_order_is_hotel_dinner_parking() {
        assert!(Leg::Hotel < Leg::Dinner);
        assert!(Leg::Dinner < Leg::Parking);
    }
}
