use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::entities::{AccessRequest, Booking, Quote};

pub fn new() -> Oso {
    let mut o = Oso::new();

    o.register_class(Platform::get_polar_class()).unwrap();
    o.register_class(User::get_polar_class()).unwrap();
    o.register_class(AccessRequest::get_polar_class()).unwrap();
    o.register_class(Quote::get_polar_class()).unwrap();
    o.register_class(Booking::get_polar_class()).unwrap();

    o.load_str(include_str!("rules.polar")).unwrap();

    o
}

#[cfg(test)]
fn admin() -> User {
    use uuid::Uuid;

    User {
        id: Uuid::new_v4(),
        email: "admin@example.com".into(),
        roles: vec!["admin".into()],
    }
}

#[cfg(test)]
fn guest() -> User {
    use uuid::Uuid;

    User {
        id: Uuid::new_v4(),
        email: "".into(),
        roles: vec![],
    }
}

#[cfg(test)]
fn sample_quote() -> Quote {
    use crate::entities::{Coordinates, FareSettings, Leg, Place, Route, RouteRequest};
    use uuid::Uuid;

    let request = RouteRequest::new("A".into(), "B".into(), None).unwrap();
    let stops = request
        .stops()
        .iter()
        .map(|stop| Place::new(Coordinates { lat: 0.0, lng: 0.0 }, stop.to_string()))
        .collect();
    let route = Route::new(
        request,
        stops,
        vec![Leg {
            start_address: "A".into(),
            end_address: "B".into(),
            distance_km: 10.0,
            duration_min: 15,
        }],
        10.0,
        15,
        false,
        None,
    );

    Quote::new(route, FareSettings::default(), false, Uuid::new_v4())
}

#[test]
fn platform_admin_role_test() {
    let authorizor = new();

    let result = authorizor.query_rule("has_role", (admin(), "admin", Platform::default()));
    assert!(result.unwrap().next().unwrap().is_ok());

    let result = authorizor.query_rule("has_role", (guest(), "admin", Platform::default()));
    assert!(result.unwrap().next().is_none());
}

#[test]
fn settings_are_admin_only_test() {
    let authorizor = new();

    for action in ["update_settings", "reset_settings", "list_access_requests"] {
        let result = authorizor.is_allowed(admin(), action, Platform::default());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(guest(), action, Platform::default());
        assert_eq!(result.unwrap(), false);
    }
}

#[test]
fn access_request_decisions_are_admin_only_test() {
    let request = AccessRequest::new("dispatcher@example.com".into(), "Pat".into());

    let authorizor = new();

    let result = authorizor.is_allowed(admin(), "approve", request.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(admin(), "reject", request.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(guest(), "approve", request.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(guest(), "reject", request.clone());
    assert_eq!(result.unwrap(), false);
}

#[test]
fn history_deletion_is_admin_only_test() {
    use crate::validation::BookingDetails;
    use chrono::Utc;

    let quote = sample_quote();

    let details = BookingDetails {
        name: "Pat".into(),
        email: "pat@example.com".into(),
        phone: "+1 (506) 797-0087".into(),
        pickup_date: "2099-06-15".into(),
        pickup_time: "14:30".into(),
        pickup_at: Utc::now(),
        return_trip: false,
        return_date: None,
        return_time: None,
        return_at: None,
        passengers: 1,
        message: "".into(),
    };
    let booking = Booking::new(details, quote.clone());

    let authorizor = new();

    let result = authorizor.is_allowed(admin(), "delete", quote.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(guest(), "delete", quote.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(admin(), "delete", booking.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(guest(), "delete", booking.clone());
    assert_eq!(result.unwrap(), false);
}
