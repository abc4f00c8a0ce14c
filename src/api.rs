use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{
    AccessDecision, AccessRequest, Booking, Estimate, FareSettings, Quote, RouteRequest,
};
use crate::error::Error;
use crate::validation::BookingInput;

#[async_trait]
pub trait EstimateAPI {
    async fn create_estimate(
        &self,
        user: User,
        request: Option<RouteRequest>,
        return_trip: bool,
    ) -> Result<Estimate, Error>;

    async fn find_estimate(&self, user: User, id: Uuid) -> Result<Estimate, Error>;

    async fn update_addresses(
        &self,
        user: User,
        id: Uuid,
        request: RouteRequest,
        return_trip: Option<bool>,
    ) -> Result<Estimate, Error>;

    // The outcome is stored on the estimate unless the addresses changed
    // underneath the attempt, in which case it is dropped.
    async fn resolve_estimate(&self, user: User, id: Uuid) -> Result<Estimate, Error>;
}

#[async_trait]
pub trait QuoteAPI {
    async fn create_quote(&self, user: User, estimate_id: Uuid) -> Result<Quote, Error>;

    async fn find_quote(&self, user: User, token: Uuid) -> Result<Quote, Error>;

    async fn list_quotes(&self, user: User, limit: i64) -> Result<Vec<Quote>, Error>;

    async fn delete_quote(&self, user: User, token: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait BookingAPI {
    // Validates the form, prices the estimate's resolved route, notifies
    // the dispatch inbox and only then records the booking.
    async fn create_booking(
        &self,
        user: User,
        estimate_id: Uuid,
        input: BookingInput,
    ) -> Result<Booking, Error>;

    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;

    async fn list_bookings(&self, user: User, limit: i64) -> Result<Vec<Booking>, Error>;

    async fn delete_booking(&self, user: User, id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait SettingsAPI {
    async fn fetch_settings(&self, user: User) -> Result<FareSettings, Error>;

    async fn update_settings(
        &self,
        user: User,
        settings: FareSettings,
    ) -> Result<FareSettings, Error>;

    async fn reset_settings(&self, user: User) -> Result<FareSettings, Error>;
}

#[async_trait]
pub trait AccessRequestAPI {
    async fn create_access_request(
        &self,
        user: User,
        email: String,
        display_name: String,
    ) -> Result<AccessRequest, Error>;

    async fn check_access(&self, user: User, email: String) -> Result<AccessDecision, Error>;

    async fn list_access_requests(&self, user: User) -> Result<Vec<AccessRequest>, Error>;

    async fn approve_access_request(&self, user: User, id: Uuid) -> Result<AccessRequest, Error>;

    async fn reject_access_request(
        &self,
        user: User,
        id: Uuid,
        reason: String,
    ) -> Result<AccessRequest, Error>;
}

pub trait API:
    EstimateAPI + QuoteAPI + BookingAPI + SettingsAPI + AccessRequestAPI
{
}
