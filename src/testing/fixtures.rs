//! Request bodies used by the workflow
//!
//! All builders take `now` explicitly so deadlines are reproducible.

use chrono::{Duration, NaiveDateTime};

use crate::api::types::{
    Assignment, AssignmentType, AssignmentUpdate, LoginRequest, NewAssignment, NewCourse, Role,
    SignupRequest,
};
use crate::common::config::{AccountConfig, CourseConfig};
use crate::common::{Error, Result};

/// Days from `now` to the first deadline
pub const DEADLINE_DAYS: i64 = 7;
/// Days between the deadline and the late submission deadline
pub const LATE_GRACE_DAYS: i64 = 2;
/// Marks of the first bulk assignment; each later one adds [`MARKS_STEP`]
pub const BASE_MARKS: i32 = 50;
pub const MARKS_STEP: i32 = 10;

/// Deadline pair for an assignment due `extra_days` after the default deadline
pub fn deadlines(now: NaiveDateTime, extra_days: i64) -> (NaiveDateTime, NaiveDateTime) {
    let deadline = now + Duration::days(DEADLINE_DAYS + extra_days);
    (deadline, deadline + Duration::days(LATE_GRACE_DAYS))
}

pub fn signup(account: &AccountConfig, role: Role) -> SignupRequest {
    SignupRequest {
        name: account.name.clone(),
        email: account.email.clone(),
        password: account.password.clone(),
        role,
    }
}

pub fn login(account: &AccountConfig) -> LoginRequest {
    LoginRequest {
        email: account.email.clone(),
        password: account.password.clone(),
    }
}

pub fn course(config: &CourseConfig) -> NewCourse {
    NewCourse {
        title: config.title.clone(),
        course_code: config.code.clone(),
        description: config.description.clone(),
    }
}

/// The single assignment created before the CRUD test
pub fn programming_assignment(course_id: i64, now: NaiveDateTime) -> NewAssignment {
    let (deadline, late_submission_deadline) = deadlines(now, 0);
    NewAssignment {
        title: "Programming Assignment 1".to_string(),
        content: "Create a simple Java program that demonstrates object-oriented programming \
                  concepts including classes, objects, inheritance, and polymorphism."
            .to_string(),
        max_marks: 100,
        course_id,
        deadline,
        late_submission_deadline,
        instructions: "Submit your source code files along with a documentation file explaining \
                       your design choices. Use proper coding conventions and include comments."
            .to_string(),
        assignment_type: AssignmentType::Homework,
    }
}

/// One assignment per [`AssignmentType`], the i-th due i days later and worth 50+10i
pub fn bulk_assignments(course_id: i64, now: NaiveDateTime) -> Vec<NewAssignment> {
    AssignmentType::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let (deadline, late_submission_deadline) = deadlines(now, i as i64);
            let lower = kind.as_str().to_lowercase();
            NewAssignment {
                title: format!("Test Assignment {}: {}", i + 1, kind),
                content: format!(
                    "This is a test {} assignment to verify CRUD operations.",
                    lower
                ),
                max_marks: BASE_MARKS + MARKS_STEP * i as i32,
                course_id,
                deadline,
                late_submission_deadline,
                instructions: format!(
                    "Complete this {} assignment according to the guidelines.",
                    lower
                ),
                assignment_type: *kind,
            }
        })
        .collect()
}

/// Update body for a created assignment: "Updated: " title, +10 marks
///
/// Values the server echoed back take precedence; the submitted body fills
/// any the response left out. Marks the server reports near `i32::MAX` are an
/// error rather than a wrapped value.
pub fn update_for(created: &Assignment, submitted: &NewAssignment) -> Result<AssignmentUpdate> {
    let title = if created.title.is_empty() {
        &submitted.title
    } else {
        &created.title
    };

    let marks = created.max_marks.unwrap_or(submitted.max_marks);
    let max_marks = marks
        .checked_add(MARKS_STEP)
        .ok_or(Error::MarksOverflow {
            marks,
            step: MARKS_STEP,
        })?;

    Ok(AssignmentUpdate {
        title: format!("Updated: {}", title),
        content: "This assignment has been updated to test the edit functionality.".to_string(),
        max_marks,
        deadline: created.deadline.unwrap_or(submitted.deadline),
        late_submission_deadline: created
            .late_submission_deadline
            .unwrap_or(submitted.late_submission_deadline),
        instructions: "Updated instructions for this assignment.".to_string(),
        assignment_type: created.assignment_type.unwrap_or(submitted.assignment_type),
    })
}

/// Refuse to send a body whose late deadline isn't after its deadline
pub fn check_deadlines(deadline: NaiveDateTime, late: NaiveDateTime) -> Result<()> {
    if late > deadline {
        Ok(())
    } else {
        Err(Error::DeadlineOrder {
            deadline: deadline.to_string(),
            late: late.to_string(),
        })
    }
}

/// Differences between what an update asked for and what a re-fetch returned
pub fn update_mismatches(
    before: &Assignment,
    update: &AssignmentUpdate,
    after: &Assignment,
) -> Vec<String> {
    let mut mismatches = Vec::new();

    if after.max_marks != Some(update.max_marks) {
        mismatches.push(format!(
            "maxMarks is {}, expected {}",
            after.marks_label(),
            update.max_marks
        ));
    }
    if after.title != update.title {
        mismatches.push(format!("title is '{}', expected '{}'", after.title, update.title));
    }
    if after.assignment_type != Some(update.assignment_type) {
        mismatches.push(format!(
            "assignmentType changed to {:?}",
            after.assignment_type
        ));
    }
    if before.course_id.is_some() && after.course_id != before.course_id {
        mismatches.push(format!(
            "courseId changed from {:?} to {:?}",
            before.course_id, after.course_id
        ));
    }
    if after.deadline.is_some() && after.deadline != Some(update.deadline) {
        mismatches.push("deadline changed".to_string());
    }
    if after.late_submission_deadline.is_some()
        && after.late_submission_deadline != Some(update.late_submission_deadline)
    {
        mismatches.push("lateSubmissionDeadline changed".to_string());
    }

    mismatches
}
