//! Users filing tickets

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Ticket, require_id};

/// User entity. The id is assigned by the messaging platform, not generated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub birth_date: Option<NaiveDate>,
    pub is_registered: bool,
    pub registered_at: Option<DateTime<Utc>>,
}

/// Request for user creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location_lat: f64,
    #[serde(default)]
    pub location_lng: f64,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

impl NewUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_id(self.id, "id")
    }

    /// Build the stored user. A registered user without a timestamp is
    /// registered `now`; an unregistered user never carries one.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        let registered_at = if self.is_registered {
            Some(self.registered_at.unwrap_or(now))
        } else {
            None
        };

        User {
            id: self.id,
            full_name: self.full_name,
            phone: self.phone,
            location_lat: self.location_lat,
            location_lng: self.location_lng,
            birth_date: self.birth_date,
            is_registered: self.is_registered,
            registered_at,
        }
    }
}

/// Request for user update. Absent, empty and zero values leave the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location_lat: Option<f64>,
    #[serde(default)]
    pub location_lng: Option<f64>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_registered: Option<bool>,
}

impl UpdateUserRequest {
    /// Merge the supplied fields into `user`.
    ///
    /// Registration is one-way: `registered_at` is stamped on the first
    /// false to true transition and never touched afterwards.
    pub fn apply_to(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(full_name) = self.full_name.filter(|v| !v.is_empty()) {
            user.full_name = full_name;
        }
        if let Some(phone) = self.phone.filter(|v| !v.is_empty()) {
            user.phone = phone;
        }
        if let Some(lat) = self.location_lat.filter(|v| *v != 0.0) {
            user.location_lat = lat;
        }
        if let Some(lng) = self.location_lng.filter(|v| *v != 0.0) {
            user.location_lng = lng;
        }
        if let Some(birth_date) = self.birth_date {
            user.birth_date = Some(birth_date);
        }
        if self.is_registered == Some(true) && !user.is_registered {
            user.is_registered = true;
            user.registered_at = Some(now);
        }
    }
}

/// Response for user listing with pagination
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// User with the tickets they filed
#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    pub user: User,
    pub tickets: Vec<Ticket>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn unregistered() -> User {
        User {
            id: 42,
            full_name: "Иван Петров".into(),
            phone: "+79990000000".into(),
            location_lat: 55.75,
            location_lng: 37.61,
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17),
            is_registered: false,
            registered_at: None,
        }
    }

    #[test]
    fn test_new_registered_user_gets_timestamp() {
        let now = Utc::now();
        let request: NewUserRequest =
            serde_json::from_str(r#"{"id": 42, "full_name": "Иван", "is_registered": true}"#)
                .unwrap();
        assert!(request.validate().is_ok());

        let user = request.into_user(now);
        assert_eq!(user.registered_at, Some(now));
    }

    #[test]
    fn test_new_unregistered_user_drops_timestamp() {
        let request: NewUserRequest = serde_json::from_str(
            r#"{"id": 42, "is_registered": false, "registered_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(request.into_user(Utc::now()).registered_at, None);
    }

    #[test]
    fn test_update_merges_only_supplied_fields() {
        let mut user = unregistered();
        let update = UpdateUserRequest {
            full_name: Some(String::new()),
            phone: Some("+78880000000".into()),
            location_lat: Some(0.0),
            ..Default::default()
        };

        update.apply_to(&mut user, Utc::now());

        assert_eq!(user.full_name, "Иван Петров");
        assert_eq!(user.phone, "+78880000000");
        assert_eq!(user.location_lat, 55.75);
        assert!(!user.is_registered);
    }

    #[test]
    fn test_registration_timestamp_is_set_once() {
        let mut user = unregistered();
        let first = Utc::now();

        UpdateUserRequest {
            is_registered: Some(true),
            ..Default::default()
        }
        .apply_to(&mut user, first);
        assert!(user.is_registered);
        assert_eq!(user.registered_at, Some(first));

        UpdateUserRequest {
            is_registered: Some(true),
            ..Default::default()
        }
        .apply_to(&mut user, first + Duration::hours(1));
        assert_eq!(user.registered_at, Some(first));
    }
}
