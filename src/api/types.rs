//! Wire types for the academy REST API
//!
//! Field names follow the backend's camelCase JSON. Response types are
//! lenient (most fields optional) so that a partial response is reported as
//! a missing field by the client rather than as a decode failure.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// === Accounts ===

/// Account role as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    #[serde(other)]
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
            Role::Other => "OTHER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// POST /auth/signup body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// POST /auth/login body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}

/// Generic `{"message": ...}` acknowledgement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// User record as listed by the admin endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
}

impl User {
    pub fn is_teacher(&self) -> bool {
        self.role == Some(Role::Teacher)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Bearer token returned by login
///
/// Kept in memory only; `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a token string, rejecting blank values
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 20 characters followed by an ellipsis, for console output
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(20).collect();
        format!("{}...", head)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

// === Courses ===

/// POST /courses body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    pub course_code: String,
    pub description: String,
}

/// Course as returned by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// === Assignments ===

/// Assignment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssignmentType {
    Homework,
    Project,
    Exam,
    Quiz,
    Lab,
}

impl AssignmentType {
    /// Every type, in the order the bulk test creates them
    pub const ALL: [AssignmentType; 5] = [
        AssignmentType::Homework,
        AssignmentType::Project,
        AssignmentType::Exam,
        AssignmentType::Quiz,
        AssignmentType::Lab,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentType::Homework => "HOMEWORK",
            AssignmentType::Project => "PROJECT",
            AssignmentType::Exam => "EXAM",
            AssignmentType::Quiz => "QUIZ",
            AssignmentType::Lab => "LAB",
        }
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// POST /assignments body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub title: String,
    pub content: String,
    pub max_marks: i32,
    pub course_id: i64,
    pub deadline: NaiveDateTime,
    pub late_submission_deadline: NaiveDateTime,
    pub instructions: String,
    pub assignment_type: AssignmentType,
}

/// PUT /assignments/{id} body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentUpdate {
    pub title: String,
    pub content: String,
    pub max_marks: i32,
    pub deadline: NaiveDateTime,
    pub late_submission_deadline: NaiveDateTime,
    pub instructions: String,
    pub assignment_type: AssignmentType,
}

/// Assignment as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub max_marks: Option<i32>,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDateTime>,
    #[serde(default)]
    pub late_submission_deadline: Option<NaiveDateTime>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub assignment_type: Option<AssignmentType>,
    #[serde(default)]
    pub created_by_id: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Assignment {
    /// Whether the late deadline, when both are present, falls after the deadline
    pub fn deadlines_ordered(&self) -> bool {
        match (self.deadline, self.late_submission_deadline) {
            (Some(deadline), Some(late)) => late > deadline,
            _ => true,
        }
    }

    pub fn marks_label(&self) -> String {
        self.max_marks
            .map(|m| m.to_string())
            .unwrap_or_else(|| "?".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_assignment_uses_camel_case() {
        let body = NewAssignment {
            title: "Programming Assignment 1".into(),
            content: "content".into(),
            max_marks: 100,
            course_id: 7,
            deadline: at(25, 9),
            late_submission_deadline: at(27, 9),
            instructions: "instructions".into(),
            assignment_type: AssignmentType::Homework,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["maxMarks"], 100);
        assert_eq!(value["courseId"], 7);
        assert_eq!(value["assignmentType"], "HOMEWORK");
        assert_eq!(value["deadline"], "2026-10-25T09:00:00");
        assert_eq!(value["lateSubmissionDeadline"], "2026-10-27T09:00:00");
    }

    #[test]
    fn test_assignment_response_tolerates_extra_and_missing_fields() {
        let value = json!({
            "id": 12,
            "title": "Test Assignment 2: PROJECT",
            "maxMarks": 60,
            "courseId": 3,
            "courseTitle": "Introduction to Computer Science",
            "deadline": "2026-10-26T10:15:30.123456",
            "lateSubmissionDeadline": "2026-10-28T10:15:30.123456",
            "assignmentType": "PROJECT",
            "isOverdue": false,
            "attachments": []
        });

        let assignment: Assignment = serde_json::from_value(value).unwrap();
        assert_eq!(assignment.id, Some(12));
        assert_eq!(assignment.max_marks, Some(60));
        assert_eq!(assignment.assignment_type, Some(AssignmentType::Project));
        assert!(assignment.instructions.is_none());
        assert!(assignment.deadlines_ordered());
    }

    #[test]
    fn test_deadlines_ordered_detects_inversion() {
        let assignment = Assignment {
            deadline: Some(at(27, 9)),
            late_submission_deadline: Some(at(25, 9)),
            ..Default::default()
        };
        assert!(!assignment.deadlines_ordered());

        let equal = Assignment {
            deadline: Some(at(25, 9)),
            late_submission_deadline: Some(at(25, 9)),
            ..Default::default()
        };
        assert!(!equal.deadlines_ordered());
    }

    #[test]
    fn test_unknown_role_maps_to_other() {
        let user: User = serde_json::from_value(json!({
            "id": 4,
            "name": "Registrar",
            "role": "REGISTRAR",
            "approved": true
        }))
        .unwrap();
        assert_eq!(user.role, Some(Role::Other));
        assert!(!user.is_teacher());
    }

    #[test]
    fn test_signup_role_serializes_uppercase() {
        let body = SignupRequest {
            name: "Dr. John Smith".into(),
            email: "john.smith@academy.com".into(),
            password: "teacher123".into(),
            role: Role::Teacher,
        };
        assert_eq!(serde_json::to_value(&body).unwrap()["role"], "TEACHER");
    }

    #[test]
    fn test_token_rejects_blank_and_redacts() {
        assert!(Token::new("").is_none());
        assert!(Token::new("   ").is_none());

        let token = Token::new("eyJhbGciOiJIUzI1NiJ9.payload.signature").unwrap();
        assert_eq!(token.preview(), "eyJhbGciOiJIUzI1NiJ9...");
        assert_eq!(format!("{:?}", token), "Token(<redacted>)");
    }

    #[test]
    fn test_assignment_types_are_distinct() {
        let names: std::collections::HashSet<_> =
            AssignmentType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names.len(), 5);
        assert_eq!(AssignmentType::ALL[0], AssignmentType::Homework);
        assert_eq!(AssignmentType::ALL[4], AssignmentType::Lab);
    }
}
