//! Access policy for restricted mutations.
//!
//! Every handler that changes an event, a membership or a profile asks
//! [`authorize`] first, with the caller and the capability the action needs.

use crate::error::{AppError, AppResult};
use crate::models::{EventMembersRow, EventsRow};

#[derive(Debug, Clone, Copy)]
pub enum Capability<'a> {
    /// Caller must be the event's host.
    HostOf(&'a EventsRow),
    /// Caller must hold the given membership row (None when they have none).
    MemberOf(Option<&'a EventMembersRow>),
    /// Caller must be the named user.
    SelfOf(i64),
}

pub fn authorize(caller_id: i64, capability: Capability<'_>) -> AppResult<()> {
    match capability {
        Capability::HostOf(event) if event.host_id == caller_id => Ok(()),
        Capability::HostOf(_) => Err(AppError::forbidden(
            "Only the host of this event can do that",
        )),
        Capability::MemberOf(Some(member)) if member.user_id == caller_id => Ok(()),
        Capability::MemberOf(_) => Err(AppError::validation(
            "You are not a member of this event",
        )),
        Capability::SelfOf(user_id) if user_id == caller_id => Ok(()),
        Capability::SelfOf(_) => Err(AppError::forbidden(
            "You can only act on your own account",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn event_hosted_by(host_id: i64) -> EventsRow {
        EventsRow {
            id: 1,
            host_id,
            location_id: 1,
            planned_time: "2015-09-03T02:30:00.000Z".to_string(),
            capacity: 10,
            current_size: 4,
            current_activity: "Ordering".to_string(),
            completed_status: 0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn member(user_id: i64) -> EventMembersRow {
        EventMembersRow {
            event_id: 1,
            user_id,
            approved: 0,
            status: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn host_capability() {
        let event = event_hosted_by(1);
        assert!(authorize(1, Capability::HostOf(&event)).is_ok());

        let err = authorize(2, Capability::HostOf(&event)).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_membership_is_a_bad_request() {
        let err = authorize(3, Capability::MemberOf(None)).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn membership_must_belong_to_caller() {
        let row = member(3);
        assert!(authorize(3, Capability::MemberOf(Some(&row))).is_ok());
        assert!(authorize(4, Capability::MemberOf(Some(&row))).is_err());
    }

    #[test]
    fn self_capability() {
        assert!(authorize(7, Capability::SelfOf(7)).is_ok());
        let err = authorize(7, Capability::SelfOf(8)).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
