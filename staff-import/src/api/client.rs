//! HTTP client for the Supabase auth admin, PostgREST and Storage APIs

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::error_message;
use super::{ApiError, AuthUser, Backend, NewUser, Query, StorageObject, public_object_url};

const USERS_PATH: &str = "/auth/v1/admin/users";
/// Page size used when scanning accounts
const USERS_PER_PAGE: usize = 1000;

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<AuthUser>,
}

/// Supabase project client authenticated with the service-role key
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    auth: HeaderMap,
}

/// What one page of the account list says about an email lookup
#[derive(Debug, PartialEq)]
enum PageScan {
    Found(AuthUser),
    /// Page was full; the account may be on a later page
    NextPage,
    Exhausted,
}

impl SupabaseClient {
    /// Create a client for a project URL (e.g. `https://abc.supabase.co`)
    pub fn new(base_url: &str, service_key: &str) -> Result<Self> {
        let mut auth = HeaderMap::new();
        let mut key = HeaderValue::from_str(service_key)
            .context("Service role key contains characters not allowed in a header")?;
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", service_key))
            .context("Service role key contains characters not allowed in a header")?;
        key.set_sensitive(true);
        bearer.set_sensitive(true);
        auth.insert("apikey", key);
        auth.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Project URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .headers(self.auth.clone())
    }

    fn list_users_request(&self, email: &str, page: usize) -> RequestBuilder {
        self.request(Method::GET, USERS_PATH).query(&[
            ("filter", email.to_string()),
            ("page", page.to_string()),
            ("per_page", USERS_PER_PAGE.to_string()),
        ])
    }

    fn create_user_request(&self, user: &NewUser) -> RequestBuilder {
        self.request(Method::POST, USERS_PATH).json(user)
    }

    fn select_request(&self, query: &Query) -> RequestBuilder {
        self.request(Method::GET, &table_path(&query.table))
            .query(&query.to_select_params())
    }

    fn update_request(&self, query: &Query, patch: &Value) -> RequestBuilder {
        self.request(Method::PATCH, &table_path(&query.table))
            .query(&query.to_filter_params())
            .header("Prefer", "return=minimal")
            .json(patch)
    }

    fn upsert_request(&self, table: &str, record: &Value, on_conflict: &str) -> RequestBuilder {
        self.request(Method::POST, &table_path(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record)
    }

    fn upload_request(&self, object: &StorageObject) -> RequestBuilder {
        self.request(Method::POST, &object_path(object))
            .header(CONTENT_TYPE, object.content_type.as_str())
            .header("x-upsert", if object.upsert { "true" } else { "false" })
            .body(object.bytes.clone())
    }

    /// Send a request, mapping transport failures and non-success statuses
    async fn send(method: &'static str, path: &str, request: RequestBuilder) -> Result<Response> {
        debug!("{} {}", method, path);
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", path))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            method,
            path: path.to_string(),
            status: status.as_u16(),
            message: error_message(&body),
        }
        .into())
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        let value = response.json().await.map_err(|e| ApiError::UnexpectedResponse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(value)
    }
}

fn table_path(table: &str) -> String {
    format!("/rest/v1/{}", table)
}

fn object_path(object: &StorageObject) -> String {
    format!(
        "/storage/v1/object/{}/{}",
        object.bucket,
        encode_object_path(&object.path)
    )
}

/// Storage path with every segment percent-encoded
pub(crate) fn encode_object_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Look for `email` among one page of accounts.
///
/// The admin filter is a substring match, so only an exact (case-insensitive)
/// address counts.
fn scan_page(users: Vec<AuthUser>, email: &str) -> PageScan {
    let count = users.len();
    if let Some(user) = users.into_iter().find(|u| {
        u.email
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(email))
    }) {
        return PageScan::Found(user);
    }
    if count < USERS_PER_PAGE {
        PageScan::Exhausted
    } else {
        PageScan::NextPage
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        let mut page = 1usize;
        loop {
            let response =
                Self::send("GET", USERS_PATH, self.list_users_request(email, page)).await?;
            let list: UserList = Self::decode(USERS_PATH, response).await?;

            match scan_page(list.users, email) {
                PageScan::Found(user) => return Ok(Some(user)),
                PageScan::Exhausted => return Ok(None),
                PageScan::NextPage => page += 1,
            }
        }
    }

    async fn create_user(&self, user: &NewUser) -> Result<AuthUser> {
        let response = Self::send("POST", USERS_PATH, self.create_user_request(user)).await?;
        Self::decode(USERS_PATH, response).await
    }

    async fn select(&self, query: &Query) -> Result<Vec<Value>> {
        let path = table_path(&query.table);
        let response = Self::send("GET", &path, self.select_request(query)).await?;
        Self::decode(&path, response).await
    }

    async fn update(&self, query: &Query, patch: &Value) -> Result<()> {
        let path = table_path(&query.table);
        Self::send("PATCH", &path, self.update_request(query, patch)).await?;
        Ok(())
    }

    async fn upsert(&self, table: &str, record: &Value, on_conflict: &str) -> Result<()> {
        let path = table_path(table);
        Self::send("POST", &path, self.upsert_request(table, record, on_conflict)).await?;
        Ok(())
    }

    async fn upload(&self, object: &StorageObject) -> Result<String> {
        let path = object_path(object);
        debug!("Uploading {} bytes to {}", object.bytes.len(), path);
        Self::send("POST", &path, self.upload_request(object)).await?;
        Ok(public_object_url(&self.base_url, &object.bucket, &object.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> SupabaseClient {
        SupabaseClient::new("https://proj.supabase.co/", "service-key").unwrap()
    }

    fn header<'a>(request: &'a reqwest::Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn query_pairs(request: &reqwest::Request) -> Vec<(String, String)> {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn assert_authenticated(request: &reqwest::Request) {
        assert_eq!(header(request, "apikey"), Some("service-key"));
        assert_eq!(header(request, "authorization"), Some("Bearer service-key"));
    }

    #[test]
    fn test_base_url_is_normalised() {
        let client = client();
        assert_eq!(client.base_url(), "https://proj.supabase.co");
        assert_eq!(
            client.url("/rest/v1/staff"),
            "https://proj.supabase.co/rest/v1/staff"
        );
    }

    #[test]
    fn test_rejects_key_with_newline() {
        assert!(SupabaseClient::new("https://proj.supabase.co", "bad\nkey").is_err());
    }

    #[test]
    fn test_key_is_not_printed() {
        assert!(!format!("{:?}", client()).contains("service-key"));
    }

    #[test]
    fn test_encode_object_path_keeps_separators() {
        assert_eq!(encode_object_path("u1/profile.png"), "u1/profile.png");
        assert_eq!(encode_object_path("a b/p?.png"), "a%20b/p%3F.png");
    }

    #[test]
    fn test_list_users_request() {
        let request = client().list_users_request("a@x.com", 2).build().unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().path(), "/auth/v1/admin/users");
        assert_eq!(
            query_pairs(&request),
            vec![
                ("filter".to_string(), "a@x.com".to_string()),
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "1000".to_string()),
            ]
        );
        assert_authenticated(&request);
    }

    #[test]
    fn test_create_user_request() {
        let request = client()
            .create_user_request(&NewUser::confirmed("a@x.com", "A"))
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().path(), "/auth/v1/admin/users");
        assert_eq!(header(&request, "content-type"), Some("application/json"));
        let body: Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["email_confirm"], json!(true));
        assert_eq!(body["user_metadata"]["full_name"], json!("A"));
        assert_authenticated(&request);
    }

    #[test]
    fn test_select_request() {
        let query = Query::new("staff").select(&["id"]).eq("profile_id", "u1");
        let request = client().select_request(&query).build().unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/staff");
        assert_eq!(
            query_pairs(&request),
            vec![
                ("select".to_string(), "id".to_string()),
                ("profile_id".to_string(), "eq.u1".to_string()),
            ]
        );
        assert_authenticated(&request);
    }

    #[test]
    fn test_update_request_filters_with_eq() {
        let query = Query::new("staff").eq("id", 42i64);
        let request = client()
            .update_request(&query, &json!({"photo_url": "https://x/p.png"}))
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.url().path(), "/rest/v1/staff");
        assert_eq!(
            query_pairs(&request),
            vec![("id".to_string(), "eq.42".to_string())]
        );
        assert_eq!(header(&request, "prefer"), Some("return=minimal"));
        assert_authenticated(&request);
    }

    #[test]
    fn test_upsert_request_merges_on_conflict() {
        let request = client()
            .upsert_request("timetable", &json!({"staff_id": "s1"}), "staff_id")
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().path(), "/rest/v1/timetable");
        assert_eq!(
            query_pairs(&request),
            vec![("on_conflict".to_string(), "staff_id".to_string())]
        );
        assert_eq!(
            header(&request, "prefer"),
            Some("resolution=merge-duplicates,return=minimal")
        );
        assert_authenticated(&request);
    }

    #[test]
    fn test_upload_request_overwrites() {
        let object = StorageObject {
            bucket: "avatars".into(),
            path: "u1/profile.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
            upsert: true,
        };
        let request = client().upload_request(&object).build().unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://proj.supabase.co/storage/v1/object/avatars/u1/profile.png"
        );
        assert_eq!(header(&request, "x-upsert"), Some("true"));
        assert_eq!(header(&request, "content-type"), Some("image/png"));
        assert_eq!(request.body().unwrap().as_bytes(), Some(&[1u8, 2, 3][..]));
        assert_authenticated(&request);
    }

    fn user(id: &str, email: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            email: Some(email.to_string()),
        }
    }

    #[test]
    fn test_scan_page_matches_exact_email_only() {
        let users = vec![user("u1", "bob.a@x.com"), user("u2", "A@X.com")];
        assert_eq!(scan_page(users, "a@x.com"), PageScan::Found(user("u2", "A@X.com")));

        let users = vec![user("u1", "bob.a@x.com")];
        assert_eq!(scan_page(users, "a@x.com"), PageScan::Exhausted);
    }

    #[test]
    fn test_scan_page_continues_after_full_page() {
        let full: Vec<AuthUser> = (0..USERS_PER_PAGE)
            .map(|i| user(&format!("u{}", i), &format!("other{}@x.com", i)))
            .collect();
        assert_eq!(scan_page(full, "a@x.com"), PageScan::NextPage);
        assert_eq!(scan_page(Vec::new(), "a@x.com"), PageScan::Exhausted);
    }

    #[test]
    fn test_user_list_decoding() {
        let list: UserList = serde_json::from_str(
            r#"{"users":[{"id":"u1","email":"a@x.com","aud":"authenticated"}],"aud":"authenticated"}"#,
        )
        .unwrap();
        assert_eq!(list.users.len(), 1);
        assert_eq!(list.users[0].id, "u1");
    }
}
