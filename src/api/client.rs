//! HTTP client for the academy backend
//!
//! One method per endpoint. Every call is awaited before the next one is
//! issued; the client never retries.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::common::config::HttpConfig;
use crate::common::{join_url, Error, Result};

use super::types::{
    Assignment, AssignmentUpdate, Course, LoginRequest, LoginResponse, MessageResponse,
    NewAssignment, NewCourse, SignupRequest, Token, User,
};

/// A record the backend created, with its server-assigned id
#[derive(Debug, Clone)]
pub struct Created<T> {
    pub id: i64,
    pub record: T,
}

/// Client for the academy REST API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url` (including the `/api` prefix)
    pub fn new(base_url: &str, config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // === Health & auth ===

    /// GET /test
    pub async fn health(&self) -> Result<String> {
        self.send(Method::GET, "/test", None, |req| req).await
    }

    /// POST /auth/signup
    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse> {
        self.send_json(Method::POST, "/auth/signup", None, |req| req.json(request))
            .await
    }

    /// POST /auth/login, returning the bearer token
    pub async fn login(&self, request: &LoginRequest) -> Result<Token> {
        let path = "/auth/login";
        let response: LoginResponse = self
            .send_json(Method::POST, path, None, |req| req.json(request))
            .await?;

        response
            .token
            .and_then(Token::new)
            .ok_or_else(|| Error::missing_field(path, "token"))
    }

    // === Admin ===

    /// GET /admin/pending
    pub async fn pending_users(&self, token: &Token) -> Result<Vec<User>> {
        self.send_json(Method::GET, "/admin/pending", Some(token), |req| req)
            .await
    }

    /// GET /admin/users
    pub async fn all_users(&self, token: &Token) -> Result<Vec<User>> {
        self.send_json(Method::GET, "/admin/users", Some(token), |req| req)
            .await
    }

    /// POST /admin/approve/{id}
    pub async fn approve_user(&self, token: &Token, user_id: i64) -> Result<MessageResponse> {
        let path = format!("/admin/approve/{}", user_id);
        self.send_json(Method::POST, &path, Some(token), |req| req)
            .await
    }

    // === Courses ===

    /// POST /courses
    pub async fn create_course(&self, token: &Token, course: &NewCourse) -> Result<Created<Course>> {
        let path = "/courses";
        let record: Course = self
            .send_json(Method::POST, path, Some(token), |req| req.json(course))
            .await?;

        let id = record.id.ok_or_else(|| Error::missing_field(path, "id"))?;
        Ok(Created { id, record })
    }

    /// POST /courses/assign?courseId=&teacherId=
    ///
    /// The backend answers with a plain-text message.
    pub async fn assign_teacher(
        &self,
        token: &Token,
        course_id: i64,
        teacher_id: i64,
    ) -> Result<String> {
        self.send(Method::POST, "/courses/assign", Some(token), |req| {
            req.query(&[("courseId", course_id), ("teacherId", teacher_id)])
        })
        .await
    }

    // === Assignments ===

    /// POST /assignments?teacherId=
    pub async fn create_assignment(
        &self,
        token: &Token,
        teacher_id: Option<i64>,
        assignment: &NewAssignment,
    ) -> Result<Created<Assignment>> {
        self.create_assignment_at("/assignments", token, teacher_id, assignment)
            .await
    }

    /// POST /courses/{courseId}/assignments?teacherId=
    pub async fn create_course_assignment(
        &self,
        token: &Token,
        course_id: i64,
        teacher_id: Option<i64>,
        assignment: &NewAssignment,
    ) -> Result<Created<Assignment>> {
        let path = format!("/courses/{}/assignments", course_id);
        self.create_assignment_at(&path, token, teacher_id, assignment)
            .await
    }

    async fn create_assignment_at(
        &self,
        path: &str,
        token: &Token,
        teacher_id: Option<i64>,
        assignment: &NewAssignment,
    ) -> Result<Created<Assignment>> {
        let record: Assignment = self
            .send_json(Method::POST, path, Some(token), |req| {
                with_teacher(req, teacher_id).json(assignment)
            })
            .await?;

        let id = record.id.ok_or_else(|| Error::missing_field(path, "id"))?;
        Ok(Created { id, record })
    }

    /// GET /assignments/course/{courseId}
    pub async fn course_assignments(&self, token: &Token, course_id: i64) -> Result<Vec<Assignment>> {
        let path = format!("/assignments/course/{}", course_id);
        self.send_json(Method::GET, &path, Some(token), |req| req)
            .await
    }

    /// GET /assignments/{id}
    pub async fn get_assignment(&self, token: &Token, assignment_id: i64) -> Result<Assignment> {
        let path = format!("/assignments/{}", assignment_id);
        self.send_json(Method::GET, &path, Some(token), |req| req)
            .await
    }

    /// PUT /assignments/{id}?teacherId=
    pub async fn update_assignment(
        &self,
        token: &Token,
        assignment_id: i64,
        teacher_id: Option<i64>,
        update: &AssignmentUpdate,
    ) -> Result<Assignment> {
        let path = format!("/assignments/{}", assignment_id);
        self.send_json(Method::PUT, &path, Some(token), |req| {
            with_teacher(req, teacher_id).json(update)
        })
        .await
    }

    /// DELETE /assignments/{id}?teacherId=
    pub async fn delete_assignment(
        &self,
        token: &Token,
        assignment_id: i64,
        teacher_id: Option<i64>,
    ) -> Result<MessageResponse> {
        let path = format!("/assignments/{}", assignment_id);
        self.send_json(Method::DELETE, &path, Some(token), |req| {
            with_teacher(req, teacher_id)
        })
        .await
    }

    // === Plumbing ===

    /// Issue a request and return the body of a 200 response
    async fn send<F>(
        &self,
        method: Method,
        path: &str,
        token: Option<&Token>,
        build: F,
    ) -> Result<String>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = join_url(&self.base_url, path);
        debug!(%method, %url, "request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = token {
            request = request.bearer_auth(token.as_str());
        }

        let response = build(request)
            .send()
            .await
            .map_err(|source| Error::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Transport {
            path: path.to_string(),
            source,
        })?;

        debug!(%method, path, status = status.as_u16(), "response");
        trace!(path, %body, "response body");

        if status != StatusCode::OK {
            return Err(Error::status(path, status.as_u16(), body));
        }
        Ok(body)
    }

    /// Issue a request and decode the JSON body of a 200 response
    async fn send_json<T, F>(
        &self,
        method: Method,
        path: &str,
        token: Option<&Token>,
        build: F,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let body = self.send(method, path, token, build).await?;
        serde_json::from_str(&body).map_err(|e| Error::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Attach `teacherId` when known
fn with_teacher(request: RequestBuilder, teacher_id: Option<i64>) -> RequestBuilder {
    match teacher_id {
        Some(id) => request.query(&[("teacherId", id)]),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/api/", &HttpConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 1 is reserved (tcpmux) and closed on any sane test host.
        let client = ApiClient::new("http://127.0.0.1:1/api", &HttpConfig::default()).unwrap();

        let err = client.health().await.unwrap_err();
        match err {
            Error::Transport { path, .. } => assert_eq!(path, "/test"),
            other => panic!("Expected Transport error, got {:?}", other),
        }
    }
}
