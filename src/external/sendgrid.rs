use sendgrid::v3::{Content, Email, Message, Personalization, Sender};
use std::env;

use crate::{
    entities::Booking,
    error::{
        notification_access_error, notification_auth_error, notification_config_error,
        notification_rate_error, notification_send_error, Error,
    },
    validation::REFERENCE_TZ,
};

// A booking is only considered accepted once this succeeds, so every
// failure maps to an error the caller can surface.
#[tracing::instrument(skip(booking), fields(booking_id = %booking.id))]
pub async fn send_booking_notification(booking: &Booking) -> Result<(), Error> {
    let api_key = env::var("SENDGRID_API_KEY").map_err(|_| notification_config_error())?;
    let inbox = env::var("BOOKING_INBOX").map_err(|_| notification_config_error())?;
    let from_address = env::var("BOOKING_FROM").unwrap_or_else(|_| inbox.clone());

    let body = render_booking(booking, &inbox);

    let message = Message::new(Email::new(&from_address).set_name("Bookings"))
        .set_subject(&format!(
            "New booking request from {}",
            booking.customer_name
        ))
        .set_reply_to(Email::new(&booking.email).set_name(&booking.customer_name))
        .add_content(
            Content::new()
                .set_content_type("text/plain")
                .set_value(body),
        )
        .add_personalization(Personalization::new(Email::new(&inbox)));

    let sender = Sender::new(api_key, None);
    let response = sender.send(&message).await?;

    match response.status().as_u16() {
        code if (200..300).contains(&code) => {
            tracing::info!("booking notification delivered");
            Ok(())
        }
        401 => Err(notification_auth_error()),
        403 => Err(notification_access_error()),
        429 => Err(notification_rate_error()),
        code => {
            tracing::error!(code, "notification rejected by the mail service");
            Err(notification_send_error())
        }
    }
}

// The dispatch inbox reads this as-is; every field the dispatcher needs to
// call the customer back is spelled out.
pub fn render_booking(booking: &Booking, to_email: &str) -> String {
    let route = &booking.quote.route;
    let booked_at = booking
        .created_at
        .with_timezone(&REFERENCE_TZ)
        .format("%Y-%m-%d %H:%M %Z");

    let lines = [
        format!("Customer name: {}", booking.customer_name),
        format!("Email address: {}", booking.email),
        format!("Phone number: {}", booking.phone),
        format!("Pickup address: {}", route.request.pickup),
        format!("Dropoff address: {}", route.request.dropoff),
        format!(
            "Second dropoff address: {}",
            route.request.second_dropoff.as_deref().unwrap_or("N/A")
        ),
        format!("Pickup date: {}", booking.pickup_date),
        format!("Pickup time: {}", booking.pickup_time),
        format!(
            "Return trip: {}",
            if booking.return_trip { "Yes" } else { "No" }
        ),
        format!(
            "Return date: {}",
            booking.return_date.as_deref().unwrap_or("N/A")
        ),
        format!(
            "Return time: {}",
            booking.return_time.as_deref().unwrap_or("N/A")
        ),
        format!("Number of passengers: {}", booking.passengers),
        format!("Distance: {:.2} km", route.distance_km),
        format!("Travel time: {} min", route.duration_min),
        format!(
            "Estimated fare: {} {:.2}",
            booking.quote.currency, booking.quote.amount
        ),
        format!("Booking date: {}", booked_at),
        format!("Message: {}", booking.message),
        format!("Sent to: {}", to_email),
    ];

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        Coordinates, FareSettings, Leg, Place, Quote, Route, RouteRequest,
    };
    use crate::validation::BookingDetails;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn booking() -> Booking {
        let request = RouteRequest::new(
            "86 Botsford St, Moncton".into(),
            "777 Main St, Moncton".into(),
            None,
        )
        .unwrap();
        let route = Route::new(
            request.clone(),
            request
                .stops()
                .iter()
                .map(|stop| Place::new(Coordinates { lat: 46.09, lng: -64.78 }, stop.to_string()))
                .collect(),
            vec![Leg {
                start_address: "86 Botsford St".into(),
                end_address: "777 Main St".into(),
                distance_km: 20.0,
                duration_min: 24,
            }],
            20.0,
            24,
            false,
            None,
        );
        let quote = Quote::new(route, FareSettings::default(), true, Uuid::new_v4());
        let details = BookingDetails {
            name: "Pat Cormier".into(),
            email: "pat@example.com".into(),
            phone: "+1 (506) 797-0087".into(),
            pickup_date: "2099-06-15".into(),
            pickup_time: "14:30".into(),
            pickup_at: Utc.with_ymd_and_hms(2099, 6, 15, 17, 30, 0).unwrap(),
            return_trip: true,
            return_date: Some("2099-06-16".into()),
            return_time: Some("09:00".into()),
            return_at: Some(Utc.with_ymd_and_hms(2099, 6, 16, 12, 0, 0).unwrap()),
            passengers: 3,
            message: "Two large suitcases".into(),
        };
        Booking::new(details, quote)
    }

    #[test]
    fn the_rendered_booking_carries_every_dispatch_field() {
        let body = render_booking(&booking(), "dispatch@example.com");

        assert!(body.contains("Customer name: Pat Cormier"));
        assert!(body.contains("Phone number: +1 (506) 797-0087"));
        assert!(body.contains("Pickup address: 86 Botsford St, Moncton"));
        assert!(body.contains("Second dropoff address: N/A"));
        assert!(body.contains("Return trip: Yes"));
        assert!(body.contains("Number of passengers: 3"));
        assert!(body.contains("Distance: 20.00 km"));
        assert!(body.contains("Travel time: 24 min"));
        assert!(body.contains("Estimated fare: CAD 72.00"));
        assert!(body.contains("Message: Two large suitcases"));
        assert!(body.contains("Sent to: dispatch@example.com"));
    }

    #[test]
    fn one_way_bookings_render_without_return_details() {
        let mut booking = booking();
        booking.return_trip = false;
        booking.return_date = None;
        booking.return_time = None;

        let body = render_booking(&booking, "dispatch@example.com");

        assert!(body.contains("Return trip: No"));
        assert!(body.contains("Return date: N/A"));
        assert!(body.contains("Return time: N/A"));
    }
}
