use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lat, coordinates.lng)
    }
}

// An address as the provider resolved it, not as the caller typed it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub formatted_address: String,
    pub location: Coordinates,
}

impl Place {
    pub fn new(location: Coordinates, formatted_address: String) -> Self {
        Self {
            formatted_address,
            location,
        }
    }
}
