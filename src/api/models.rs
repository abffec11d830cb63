use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub woreda: Option<String>,
}

/// One row of the customer listing. Everything but `id` is optional because the
/// API sends nulls freely; `user` keeps its keys in the order they arrived.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CustomerRecord {
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub picture_path: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub residence_status: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub is_verified: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub user: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub to: Option<u64>,
    pub total: u64,
    pub last_page: u32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CustomerPage {
    pub data: Vec<CustomerRecord>,
    pub meta: PageInfo,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Query parameters for one listing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub paginate: u32,
    pub phone_number_search: Option<String>,
    pub name_search: Option<String>,
}

impl ListQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("page", self.page.to_string()),
            ("paginate", self.paginate.to_string()),
        ];
        if let Some(phone) = self.phone_number_search.as_deref().filter(|s| !s.is_empty()) {
            out.push(("phone_number_search", phone.to_string()));
        }
        if let Some(name) = self.name_search.as_deref().filter(|s| !s.is_empty()) {
            out.push(("name_search", name.to_string()));
        }
        out
    }
}
