use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const USERS: &str = "Users";
pub const COSTS: &str = "Costs";
pub const COST_AVERAGES: &str = "CostAverages";

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "personalId")]
    pub personal_id: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: String,
    pub marital_status: String,
    pub password: String,
}

impl User {
    /// The single user left behind by a user reset.
    pub fn seed() -> Self {
        User {
            id: None,
            personal_id: "123".to_string(),
            first_name: "Bar".to_string(),
            last_name: "Russo".to_string(),
            birthday: "16.8.1997".to_string(),
            marital_status: "Single".to_string(),
            password: "24041999".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Cost {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub description: String,
    pub sum: f64,
    pub date: NaiveDate,
    pub category: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Running aggregate of one user's costs in one calendar month.
/// At most one document exists per (userId, month, year); nothing in the
/// database enforces that, only the lookup-then-branch logic in `average`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CostAverage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// 0-based month, January = 0.
    pub month: u32,
    pub year: i32,
    pub sum: f64,
    pub count: i64,
    pub average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_user_keeps_the_fixed_personal_id() {
        assert_eq!(User::seed().personal_id, "123");
    }

    #[test]
    fn user_serializes_with_camel_case_key_and_no_unset_id() {
        let value = serde_json::to_value(User::seed()).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("personalId"));
        assert!(object.contains_key("first_name"));
        assert!(!object.contains_key("_id"));
    }

    #[test]
    fn cost_round_trips_the_wire_field_names() {
        let cost: Cost = serde_json::from_value(serde_json::json!({
            "description": "groceries",
            "sum": 120.5,
            "date": "2024-03-08",
            "category": "food",
            "userId": "123",
        }))
        .unwrap();
        assert_eq!(cost.user_id, "123");
        assert_eq!(cost.id, None);

        let value = serde_json::to_value(&cost).unwrap();
        assert_eq!(value["userId"], "123");
        assert_eq!(value["date"], "2024-03-08");
    }
}
