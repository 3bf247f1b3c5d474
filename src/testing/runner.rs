//! Workflow runner
//!
//! Drives the backend through the full teacher/course/assignment scenario,
//! threading tokens and ids from one step to the next. Four steps are fatal
//! (health check, admin token, course, teacher token); every other failure
//! is recorded in the report and the run carries on with whatever state it
//! already has. Steps whose inputs are missing are skipped.

use chrono::NaiveDateTime;
use colored::Colorize;
use tracing::{debug, info, warn};

use crate::api::types::{Assignment, AssignmentUpdate, NewAssignment, Role, Token, User};
use crate::api::{ApiClient, Created};
use crate::common::{Config, Error, Result};

use super::fixtures;
use super::report::{Report, RunSummary};

/// Step names as they appear in the report
pub mod steps {
    pub const HEALTH: &str = "health check";
    pub const TEACHER_SIGNUP: &str = "teacher signup";
    pub const ADMIN_LOGIN: &str = "admin login";
    pub const TEACHER_LOOKUP: &str = "teacher lookup";
    pub const APPROVE_TEACHER: &str = "approve teacher";
    pub const CREATE_COURSE: &str = "create course";
    pub const ASSIGN_TEACHER: &str = "assign teacher";
    pub const TEACHER_LOGIN: &str = "teacher login";
    pub const CREATE_ASSIGNMENT: &str = "create assignment";
    pub const DEADLINE_ORDER: &str = "deadline order";
    pub const BULK_CREATE: &str = "bulk create";
    pub const LIST_ASSIGNMENTS: &str = "list assignments";
    pub const UPDATE_ASSIGNMENT: &str = "update assignment";
    pub const VERIFY_UPDATE: &str = "verify update";
    pub const DELETE_ASSIGNMENT: &str = "delete assignment";
    pub const VERIFY_COUNT: &str = "verify count";
    pub const COURSE_ASSIGNMENTS: &str = "course assignments";
}

use steps::*;

/// Runs the scenario against one backend
pub struct TestRunner {
    client: ApiClient,
    config: Config,
    now: NaiveDateTime,
    verbose: bool,
    report: Report,
}

impl TestRunner {
    pub fn new(config: Config, verbose: bool) -> Result<Self> {
        let client = ApiClient::new(&config.server.base_url, &config.http)?;
        Ok(Self {
            client,
            config,
            now: chrono::Local::now().naive_local(),
            verbose,
            report: Report::new(),
        })
    }

    /// Fix the clock deadlines are computed from
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Replace the report, e.g. with [`Report::quiet`]
    pub fn with_report(mut self, report: Report) -> Self {
        self.report = report;
        self
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Run every step in order
    ///
    /// Returns `Err(Error::Aborted)` when a fatal step fails.
    pub async fn run(mut self) -> Result<RunSummary> {
        info!(base_url = %self.client.base_url(), "starting assignment API check");
        println!(
            "\n{} {}",
            "Running:".blue().bold(),
            "Academy assignment API check".white().bold()
        );
        println!("  {}", self.client.base_url().dimmed());

        section("Accounts");
        self.health_check().await?;
        self.signup_teacher().await;
        let admin = self.admin_login().await?;
        let teacher_id = self.find_teacher(&admin).await;
        match teacher_id {
            Some(id) => self.approve_teacher(&admin, id).await,
            None => self.report.skip(APPROVE_TEACHER, "no teacher id"),
        }

        section("Course");
        let course_id = self.create_course(&admin).await?;
        match teacher_id {
            Some(id) => self.assign_teacher(&admin, course_id, id).await,
            None => self.report.skip(ASSIGN_TEACHER, "no teacher id"),
        }
        let teacher = self.teacher_login().await?;

        section("Assignments");
        let assignment_id = self.create_assignment(&teacher, course_id, teacher_id).await;

        section("CRUD");
        let crud_passed = self.crud_operations(&teacher, course_id, teacher_id).await;

        section("Listing");
        self.list_course_assignments(&teacher, course_id).await;

        Ok(RunSummary {
            report: self.report,
            teacher_id,
            course_id,
            assignment_id,
            crud_passed,
        })
    }

    /// GET /test must answer 200
    pub async fn health_check(&mut self) -> Result<()> {
        match self.client.health().await {
            Ok(body) if body.trim().is_empty() => {
                self.report.pass(HEALTH, "HTTP 200");
                Ok(())
            }
            Ok(body) => {
                self.report.pass(HEALTH, format!("HTTP 200 - {}", body.trim()));
                Ok(())
            }
            Err(e) => {
                self.report.fail(HEALTH, e.summary());
                Err(Error::aborted("a healthy API", e.summary()))
            }
        }
    }

    async fn signup_teacher(&mut self) {
        let body = fixtures::signup(&self.config.teacher, Role::Teacher);
        match self.client.signup(&body).await {
            Ok(response) => {
                self.report.pass(TEACHER_SIGNUP, body.email.clone());
                if let Some(message) = response.message {
                    self.detail(&message);
                }
            }
            // 400 on every run after the first: the account already exists.
            Err(e) if e.http_status() == Some(400) => self.report.pass(
                TEACHER_SIGNUP,
                format!("{} (account exists)", body.email),
            ),
            Err(e) => self.report.fail(TEACHER_SIGNUP, e.summary()),
        }
    }

    /// Log in as admin, creating the admin account once if login fails
    async fn admin_login(&mut self) -> Result<Token> {
        let login = fixtures::login(&self.config.admin);
        let first = match self.client.login(&login).await {
            Ok(token) => {
                self.report
                    .pass(ADMIN_LOGIN, format!("got token {}", token.preview()));
                return Ok(token);
            }
            Err(e) => e,
        };

        warn!(error = %first, "admin login failed, creating admin account");
        self.note(&format!(
            "login failed ({}), creating admin account",
            first.summary()
        ));

        let signup = fixtures::signup(&self.config.admin, Role::Admin);
        if let Err(e) = self.client.signup(&signup).await {
            let reason = format!("{}; admin signup: {}", first.summary(), e.summary());
            self.report.fail(ADMIN_LOGIN, reason.clone());
            return Err(Error::aborted("admin token", reason));
        }

        match self.client.login(&login).await {
            Ok(token) => {
                self.report.pass(
                    ADMIN_LOGIN,
                    format!("got token {} after admin signup", token.preview()),
                );
                Ok(token)
            }
            Err(e) => {
                self.report.fail(ADMIN_LOGIN, e.summary());
                Err(Error::aborted("admin token", e.summary()))
            }
        }
    }

    /// Look for the teacher among pending users, then among all users
    async fn find_teacher(&mut self, admin: &Token) -> Option<i64> {
        let email = self.config.teacher.email.clone();
        let mut problems = Vec::new();

        match self.client.pending_users(admin).await {
            Ok(users) => {
                debug!(count = users.len(), "pending users");
                if let Some((id, user)) = pick_teacher(&users, &email) {
                    self.report.pass(
                        TEACHER_LOOKUP,
                        format!("{} (ID: {}) pending approval", user.display_name(), id),
                    );
                    return Some(id);
                }
            }
            Err(e) => problems.push(format!("pending users: {}", e.summary())),
        }

        match self.client.all_users(admin).await {
            Ok(users) => {
                debug!(count = users.len(), "all users");
                if let Some((id, user)) = pick_teacher(&users, &email) {
                    self.report.pass(
                        TEACHER_LOOKUP,
                        format!("{} (ID: {}) among all users", user.display_name(), id),
                    );
                    return Some(id);
                }
            }
            Err(e) => problems.push(format!("all users: {}", e.summary())),
        }

        let mut reason = "no teacher found".to_string();
        if !problems.is_empty() {
            reason = format!("{} ({})", reason, problems.join("; "));
        }
        self.report.fail(TEACHER_LOOKUP, reason);
        None
    }

    async fn approve_teacher(&mut self, admin: &Token, teacher_id: i64) {
        match self.client.approve_user(admin, teacher_id).await {
            Ok(response) => {
                self.report
                    .pass(APPROVE_TEACHER, format!("teacher {} approved", teacher_id));
                if let Some(message) = response.message {
                    self.detail(&message);
                }
            }
            Err(e) => self.report.fail(APPROVE_TEACHER, e.summary()),
        }
    }

    async fn create_course(&mut self, admin: &Token) -> Result<i64> {
        let body = fixtures::course(&self.config.course);
        match self.client.create_course(admin, &body).await {
            Ok(Created { id, record }) => {
                let title = record.title.unwrap_or(body.title);
                self.report
                    .pass(CREATE_COURSE, format!("{} (ID: {})", title, id));
                Ok(id)
            }
            Err(e) => {
                self.report.fail(CREATE_COURSE, e.summary());
                Err(Error::aborted("course", e.summary()))
            }
        }
    }

    async fn assign_teacher(&mut self, admin: &Token, course_id: i64, teacher_id: i64) {
        match self.client.assign_teacher(admin, course_id, teacher_id).await {
            Ok(message) => {
                self.report.pass(
                    ASSIGN_TEACHER,
                    format!("teacher {} assigned to course {}", teacher_id, course_id),
                );
                self.detail(message.trim());
            }
            Err(e) => self.report.fail(ASSIGN_TEACHER, e.summary()),
        }
    }

    async fn teacher_login(&mut self) -> Result<Token> {
        let login = fixtures::login(&self.config.teacher);
        match self.client.login(&login).await {
            Ok(token) => {
                self.report
                    .pass(TEACHER_LOGIN, format!("got token {}", token.preview()));
                Ok(token)
            }
            Err(e) => {
                self.report.fail(TEACHER_LOGIN, e.summary());
                Err(Error::aborted("teacher token", e.summary()))
            }
        }
    }

    /// Create one assignment, falling back to the course-scoped endpoint
    async fn create_assignment(
        &mut self,
        teacher: &Token,
        course_id: i64,
        teacher_id: Option<i64>,
    ) -> Option<i64> {
        let body = fixtures::programming_assignment(course_id, self.now);
        if let Err(e) = fixtures::check_deadlines(body.deadline, body.late_submission_deadline) {
            self.report.fail(CREATE_ASSIGNMENT, e.to_string());
            return None;
        }

        let direct = match self.client.create_assignment(teacher, teacher_id, &body).await {
            Ok(created) => {
                self.accept_assignment(&created, "direct endpoint");
                return Some(created.id);
            }
            Err(e) => e,
        };

        self.note(&format!(
            "direct endpoint failed ({}), trying course endpoint",
            direct.summary()
        ));

        match self
            .client
            .create_course_assignment(teacher, course_id, teacher_id, &body)
            .await
        {
            Ok(created) => {
                self.accept_assignment(&created, "course endpoint");
                Some(created.id)
            }
            Err(e) => {
                self.report.fail(
                    CREATE_ASSIGNMENT,
                    format!(
                        "direct: {}; course endpoint: {}",
                        direct.summary(),
                        e.summary()
                    ),
                );
                None
            }
        }
    }

    fn accept_assignment(&mut self, created: &Created<Assignment>, via: &str) {
        let record = &created.record;
        self.report.pass(
            CREATE_ASSIGNMENT,
            format!("{} (ID: {}) via {}", record.title, created.id, via),
        );
        self.detail(&format!("max marks: {}", record.marks_label()));
        if let Some(deadline) = record.deadline {
            self.detail(&format!("deadline: {}", deadline));
        }
        if let Some(kind) = record.assignment_type {
            self.detail(&format!("type: {}", kind));
        }
        self.check_returned_deadlines(created);
    }

    /// Bulk create, list, update, delete and recount
    ///
    /// Returns false only when a listing fails; update/delete problems are
    /// recorded but don't fail the CRUD test.
    async fn crud_operations(
        &mut self,
        teacher: &Token,
        course_id: i64,
        teacher_id: Option<i64>,
    ) -> bool {
        let bodies = fixtures::bulk_assignments(course_id, self.now);
        let total = bodies.len();
        let mut created: Vec<(Created<Assignment>, NewAssignment)> = Vec::new();

        for body in bodies {
            let kind = body.assignment_type;
            if let Err(e) = fixtures::check_deadlines(body.deadline, body.late_submission_deadline)
            {
                self.report.fail(BULK_CREATE, format!("{}: {}", kind, e));
                continue;
            }

            match self.client.create_assignment(teacher, teacher_id, &body).await {
                Ok(item) => {
                    self.report.pass(
                        BULK_CREATE,
                        format!("{}: {} (ID: {})", kind, item.record.title, item.id),
                    );
                    self.check_returned_deadlines(&item);
                    created.push((item, body));
                }
                Err(e) => self
                    .report
                    .fail(BULK_CREATE, format!("{}: {}", kind, e.summary())),
            }
        }
        self.note(&format!("created {} of {} assignments", created.len(), total));

        let listed = match self.client.course_assignments(teacher, course_id).await {
            Ok(list) => {
                self.report.pass(
                    LIST_ASSIGNMENTS,
                    format!("{} assignments in course {}", list.len(), course_id),
                );
                list.len()
            }
            Err(e) => {
                self.report.fail(LIST_ASSIGNMENTS, e.summary());
                return false;
            }
        };

        match created.first() {
            Some((first, submitted)) => match fixtures::update_for(&first.record, submitted) {
                Ok(update) => match self
                    .client
                    .update_assignment(teacher, first.id, teacher_id, &update)
                    .await
                {
                    Ok(_) => {
                        self.report.pass(
                            UPDATE_ASSIGNMENT,
                            format!("assignment {} now '{}'", first.id, update.title),
                        );
                        self.verify_update(teacher, first, &update).await;
                    }
                    Err(e) => self.report.fail(UPDATE_ASSIGNMENT, e.summary()),
                },
                Err(e) => self.report.fail(UPDATE_ASSIGNMENT, e.to_string()),
            },
            None => self
                .report
                .skip(UPDATE_ASSIGNMENT, "no assignments were created"),
        }

        let mut deleted = 0;
        match created.last() {
            Some((last, _)) if created.len() > 1 => {
                match self
                    .client
                    .delete_assignment(teacher, last.id, teacher_id)
                    .await
                {
                    Ok(_) => {
                        deleted = 1;
                        self.report
                            .pass(DELETE_ASSIGNMENT, format!("assignment {}", last.id));
                    }
                    Err(e) => self.report.fail(DELETE_ASSIGNMENT, e.summary()),
                }
            }
            _ => self
                .report
                .skip(DELETE_ASSIGNMENT, "needs at least two created assignments"),
        }

        match self.client.course_assignments(teacher, course_id).await {
            Ok(list) => {
                let expected = listed.saturating_sub(deleted);
                if list.len() == expected {
                    self.report.pass(
                        VERIFY_COUNT,
                        format!("{} remaining (expected {})", list.len(), expected),
                    );
                } else {
                    self.report.warn(
                        VERIFY_COUNT,
                        format!("{} found, expected {}", list.len(), expected),
                    );
                }
                true
            }
            Err(e) => {
                self.report.fail(VERIFY_COUNT, e.summary());
                false
            }
        }
    }

    /// Re-fetch an updated assignment and compare it with the update body
    async fn verify_update(
        &mut self,
        teacher: &Token,
        before: &Created<Assignment>,
        update: &AssignmentUpdate,
    ) {
        match self.client.get_assignment(teacher, before.id).await {
            Ok(after) => {
                let mismatches = fixtures::update_mismatches(&before.record, update, &after);
                if mismatches.is_empty() {
                    self.report.pass(
                        VERIFY_UPDATE,
                        format!("maxMarks now {}", after.marks_label()),
                    );
                } else {
                    self.report.warn(VERIFY_UPDATE, mismatches.join("; "));
                }
            }
            Err(e) => self.report.warn(VERIFY_UPDATE, e.summary()),
        }
    }

    async fn list_course_assignments(&mut self, teacher: &Token, course_id: i64) {
        match self.client.course_assignments(teacher, course_id).await {
            Ok(list) => {
                self.report.pass(
                    COURSE_ASSIGNMENTS,
                    format!("found {} assignments", list.len()),
                );
                for assignment in &list {
                    println!(
                        "      • {} - {} marks",
                        assignment.title,
                        assignment.marks_label()
                    );
                }
            }
            Err(e) => self.report.fail(COURSE_ASSIGNMENTS, e.summary()),
        }
    }

    fn check_returned_deadlines(&mut self, created: &Created<Assignment>) {
        if !created.record.deadlines_ordered() {
            self.report.warn(
                DEADLINE_ORDER,
                format!(
                    "assignment {}: late submission deadline is not after the deadline",
                    created.id
                ),
            );
        }
    }

    /// Progress line printed regardless of verbosity
    fn note(&self, text: &str) {
        println!("    {}", text.dimmed());
    }

    /// Response detail printed only with --verbose
    fn detail(&self, text: &str) {
        if self.verbose && !text.is_empty() {
            println!("    {}", text.dimmed());
        }
    }
}

/// Pick the teacher to approve: the one with our email if listed, else the
/// first TEACHER record. Records without an id are ignored.
pub fn pick_teacher<'a>(users: &'a [User], email: &str) -> Option<(i64, &'a User)> {
    let teachers = || {
        users
            .iter()
            .filter(|u| u.is_teacher())
            .filter_map(|u| u.id.map(|id| (id, u)))
    };

    teachers()
        .find(|(_, u)| u.email.as_deref() == Some(email))
        .or_else(|| teachers().next())
}

fn section(title: &str) {
    println!("\n{}", format!("{}:", title).cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: Option<i64>, email: &str, role: Role) -> User {
        User {
            id,
            name: Some(email.split('@').next().unwrap_or_default().to_string()),
            email: Some(email.to_string()),
            role: Some(role),
            ..Default::default()
        }
    }

    #[test]
    fn test_pick_teacher_prefers_matching_email() {
        let users = vec![
            user(Some(1), "admin@academy.com", Role::Admin),
            user(Some(2), "other.teacher@academy.com", Role::Teacher),
            user(Some(3), "john.smith@academy.com", Role::Teacher),
        ];

        let (id, found) = pick_teacher(&users, "john.smith@academy.com").unwrap();
        assert_eq!(id, 3);
        assert_eq!(found.email.as_deref(), Some("john.smith@academy.com"));
    }

    #[test]
    fn test_pick_teacher_falls_back_to_first_teacher() {
        let users = vec![
            user(Some(5), "student@academy.com", Role::Student),
            user(Some(6), "first@academy.com", Role::Teacher),
            user(Some(7), "second@academy.com", Role::Teacher),
        ];

        assert_eq!(pick_teacher(&users, "nobody@academy.com").map(|(id, _)| id), Some(6));
    }

    #[test]
    fn test_pick_teacher_ignores_records_without_id() {
        let users = vec![
            user(None, "john.smith@academy.com", Role::Teacher),
            user(Some(8), "admin@academy.com", Role::Admin),
        ];

        assert!(pick_teacher(&users, "john.smith@academy.com").is_none());
        assert!(pick_teacher(&[], "john.smith@academy.com").is_none());
    }
}
