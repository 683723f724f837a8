//! In-memory backend that records every call

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::api::query::Filter;
use crate::api::{
    ApiError, AuthUser, Backend, NewUser, Query, StorageObject, public_object_url,
};

pub const TEST_ENDPOINT: &str = "https://test.supabase.co";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FindUser(String),
    CreateUser(NewUser),
    Select(Query),
    Update(Query, Value),
    Upsert {
        table: String,
        record: Value,
        on_conflict: String,
    },
    Upload(StorageObject),
}

#[derive(Debug)]
struct MockState {
    calls: Vec<Call>,
    users: Vec<AuthUser>,
    next_user: u32,
    /// Select attempt on which a staff row becomes visible; `None` = never
    staff_visible_on: Option<u32>,
    polls: HashMap<String, u32>,
    /// Operation name that always fails
    failing: Option<&'static str>,
}

#[derive(Debug)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    /// Staff rows show up on the first poll
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                calls: Vec::new(),
                users: Vec::new(),
                next_user: 1,
                staff_visible_on: Some(1),
                polls: HashMap::new(),
                failing: None,
            }),
        }
    }

    pub fn with_user(self, id: &str, email: &str) -> Self {
        self.state.lock().unwrap().users.push(AuthUser {
            id: id.to_string(),
            email: Some(email.to_string()),
        });
        self
    }

    pub fn staff_visible_on_attempt(self, attempt: u32) -> Self {
        self.state.lock().unwrap().staff_visible_on = Some(attempt);
        self
    }

    pub fn staff_never_visible(self) -> Self {
        self.state.lock().unwrap().staff_visible_on = None;
        self
    }

    /// Make every call of one operation (`"find_user"`, `"create_user"`,
    /// `"select"`, `"update"`, `"upsert"`, `"upload"`) fail with HTTP 500
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().failing = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn upserts(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upsert { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    /// Staff id the mock hands out for an account
    pub fn staff_id_for(account_id: &str) -> Value {
        json!(format!("staff-{}", account_id))
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing == Some(operation) {
            return Err(ApiError::Status {
                method: "TEST",
                path: operation.to_string(),
                status: 500,
                message: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        self.record("find_user", Call::FindUser(email.to_string()))?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<AuthUser> {
        self.record("create_user", Call::CreateUser(user.clone()))?;
        let mut state = self.state.lock().unwrap();
        let created = AuthUser {
            id: format!("user-{}", state.next_user),
            email: Some(user.email.clone()),
        };
        state.next_user += 1;
        state.users.push(created.clone());
        Ok(created)
    }

    async fn select(&self, query: &Query) -> Result<Vec<Value>> {
        self.record("select", Call::Select(query.clone()))?;
        let profile_id = query.filters.iter().find_map(|f| match f {
            Filter::Eq(column, value) if column == "profile_id" => Some(value.to_string()),
            _ => None,
        });
        let Some(profile_id) = profile_id else {
            return Ok(Vec::new());
        };

        let mut state = self.state.lock().unwrap();
        let visible_on = state.staff_visible_on;
        let polls = state.polls.entry(profile_id.clone()).or_insert(0);
        *polls += 1;
        match visible_on {
            Some(attempt) if *polls >= attempt => {
                Ok(vec![json!({"id": Self::staff_id_for(&profile_id)})])
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn update(&self, query: &Query, patch: &Value) -> Result<()> {
        self.record("update", Call::Update(query.clone(), patch.clone()))
    }

    async fn upsert(&self, table: &str, record: &Value, on_conflict: &str) -> Result<()> {
        self.record(
            "upsert",
            Call::Upsert {
                table: table.to_string(),
                record: record.clone(),
                on_conflict: on_conflict.to_string(),
            },
        )
    }

    async fn upload(&self, object: &StorageObject) -> Result<String> {
        self.record("upload", Call::Upload(object.clone()))?;
        Ok(public_object_url(TEST_ENDPOINT, &object.bucket, &object.path))
    }
}
