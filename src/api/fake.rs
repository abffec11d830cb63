use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ApiError, CustomerApi, CustomerPage, CustomerRecord, Credentials, ListQuery, PageInfo};

pub(crate) enum Scripted {
    Page(CustomerPage),
    Status(u16),
    Garbage,
}

/// In-memory `CustomerApi` that records every call and replays scripted answers.
/// When the script runs dry it answers with `default_page`.
pub(crate) struct FakeApi {
    pub(crate) calls: Mutex<Vec<(String, ListQuery)>>,
    pub(crate) logins: Mutex<Vec<Credentials>>,
    script: Mutex<VecDeque<Scripted>>,
    login_answer: Mutex<Result<String, String>>,
    delay: Duration,
    default_page: CustomerPage,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            logins: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            login_answer: Mutex::new(Ok("abc".to_string())),
            delay: Duration::ZERO,
            default_page: page_of(&[1], 1),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn push(&self, answer: Scripted) {
        self.script.lock().unwrap().push_back(answer);
    }

    pub(crate) fn reject_logins(&self, message: &str) {
        *self.login_answer.lock().unwrap() = Err(message.to_string());
    }

    pub(crate) fn queries(&self) -> Vec<ListQuery> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, q)| q.clone())
            .collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

pub(crate) fn record(id: u64) -> CustomerRecord {
    CustomerRecord {
        id,
        name: Some(format!("Customer {id}")),
        phone_number: Some(format!("09110000{id:02}")),
        ..Default::default()
    }
}

pub(crate) fn page_of(ids: &[u64], last_page: u32) -> CustomerPage {
    let total = ids.len() as u64;
    CustomerPage {
        data: ids.iter().copied().map(record).collect(),
        meta: PageInfo {
            from: if ids.is_empty() { None } else { Some(1) },
            to: if ids.is_empty() { None } else { Some(total) },
            total,
            last_page,
        },
    }
}

#[async_trait]
impl CustomerApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        self.logins.lock().unwrap().push(credentials.clone());
        let answer = self.login_answer.lock().unwrap().clone();
        answer.map_err(|message| ApiError::LoginRejected { message })
    }

    async fn list_customers(
        &self,
        token: &str,
        query: &ListQuery,
    ) -> Result<CustomerPage, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((token.to_string(), query.clone()));
        let answer = self.script.lock().unwrap().pop_front();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match answer {
            None => Ok(self.default_page.clone()),
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Status(status)) if status == 401 || status == 403 => {
                Err(ApiError::AuthRejected { status })
            }
            Some(Scripted::Status(status)) => Err(ApiError::RequestFailed {
                status,
                body: "upstream error".to_string(),
            }),
            Some(Scripted::Garbage) => match serde_json::from_str::<CustomerPage>("not json") {
                Ok(page) => Ok(page),
                Err(source) => Err(ApiError::Parse { source }),
            },
        }
    }
}
