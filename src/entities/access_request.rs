use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_invocation_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize, PolarClass)]
pub struct AccessRequest {
    #[polar(attribute)]
    pub id: Uuid,
    #[polar(attribute)]
    pub email: String,
    pub display_name: String,
    pub status: Status,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Pending,
    Approved {
        approved_by: String,
        approved_at: DateTime<Utc>,
    },
    Rejected {
        rejected_by: String,
        rejected_at: DateTime<Utc>,
        reason: String,
    },
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Approved { .. } => "approved".into(),
            Self::Rejected { .. } => "rejected".into(),
        }
    }
}

impl AccessRequest {
    pub fn new(email: String, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_ascii_lowercase(),
            display_name,
            status: Status::Pending,
            requested_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, Status::Pending)
    }

    // decisions are final: only a pending request can be approved
    pub fn approve(&mut self, approved_by: String) -> Result<(), Error> {
        match self.status {
            Status::Pending => {
                self.status = Status::Approved {
                    approved_by,
                    approved_at: Utc::now(),
                };
                self.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    pub fn reject(&mut self, rejected_by: String, reason: String) -> Result<(), Error> {
        match self.status {
            Status::Pending => {
                self.status = Status::Rejected {
                    rejected_by,
                    rejected_at: Utc::now(),
                    reason,
                };
                self.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }
}

// What a sign-in flow needs to know about an account's standing.
#[derive(Clone, Debug, Serialize)]
pub struct AccessDecision {
    pub status: String,
    pub message: String,
}

impl AccessDecision {
    pub fn approved() -> Self {
        Self {
            status: "approved".into(),
            message: "User is approved".into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: "not_found".into(),
            message: "User not found in pending users".into(),
        }
    }

    pub fn for_request(request: &AccessRequest) -> Self {
        match &request.status {
            Status::Pending => Self {
                status: "pending".into(),
                message: "User approval is pending".into(),
            },
            Status::Approved { .. } => Self::approved(),
            Status::Rejected { .. } => Self {
                status: "rejected".into(),
                message: "User access has been rejected".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_are_final() {
        let mut request = AccessRequest::new("dispatcher@example.com".into(), "Pat".into());
        assert!(request.is_pending());

        request.approve("admin@example.com".into()).unwrap();
        assert!(request.reject("admin@example.com".into(), "changed my mind".into()).is_err());
        assert_eq!(request.status.name(), "approved");
    }

    #[test]
    fn emails_are_stored_lowercased() {
        let request = AccessRequest::new("  Dispatcher@Example.COM ".into(), "Pat".into());

        assert_eq!(request.email, "dispatcher@example.com");
    }

    #[test]
    fn standing_messages_follow_the_decision() {
        let mut request = AccessRequest::new("dispatcher@example.com".into(), "Pat".into());
        assert_eq!(AccessDecision::for_request(&request).status, "pending");

        request.reject("admin@example.com".into(), "unknown requester".into()).unwrap();
        let decision = AccessDecision::for_request(&request);
        assert_eq!(decision.status, "rejected");
        assert_eq!(decision.message, "User access has been rejected");
    }
}
