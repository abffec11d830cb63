use std::sync::Arc;
use std::time::Duration;

use futures::future::OptionFuture;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::api::{ApiError, Credentials, CustomerApi, CustomerPage};
use crate::listing::{FetchOutcome, FetchTicket, Filter, ListController, PageSize, DEFAULT_DEBOUNCE};
use crate::session::{SessionGate, TokenStore, View};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SetPhone(String),
    SetName(String),
    Submit,
    Clear,
    PageSize(PageSize),
    GoToPage(u32),
    NextPage,
    PrevPage,
    Toggle(u64),
    Refresh,
    Login(Credentials),
    Logout,
    Quit,
}

#[derive(Clone, Debug)]
pub struct Options {
    pub debounce: Duration,
    pub filter: Filter,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            filter: Filter::default(),
        }
    }
}

impl Options {
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.filter.page_size = page_size;
        self
    }
}

/// What the render callback sees after each state change.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub view: View,
    pub list: &'a ListController,
    pub notice: Option<&'a str>,
}

#[derive(Debug)]
struct Completion {
    epoch: u64,
    generation: u64,
    result: Result<CustomerPage, ApiError>,
}

/// The event loop tying the session gate to the customer list. Fetches run on
/// spawned tasks and report back over a channel; everything else happens on
/// the loop itself.
pub struct Dashboard<A: CustomerApi + 'static, S: TokenStore> {
    api: Arc<A>,
    gate: SessionGate<S>,
    list: ListController,
    notice: Option<String>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<A: CustomerApi + 'static, S: TokenStore> Dashboard<A, S> {
    pub fn new(api: Arc<A>, store: S, options: Options) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            api,
            gate: SessionGate::new(store),
            list: ListController::with_filter(options.debounce, options.filter),
            notice: None,
            done_tx,
            done_rx,
        }
    }

    pub fn view(&self) -> View {
        self.gate.view()
    }

    pub fn list(&self) -> &ListController {
        &self.list
    }

    pub fn gate(&self) -> &SessionGate<S> {
        &self.gate
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            view: self.gate.view(),
            list: &self.list,
            notice: self.notice.as_deref(),
        }
    }

    /// Enters the main view and loads the current page when a session exists.
    pub fn start(&mut self) {
        if self.gate.require_session().is_ok() {
            let ticket = self.list.fetch_page();
            self.dispatch(ticket);
        }
    }

    /// Processes one command. Returns false once the dashboard should stop.
    pub async fn handle(&mut self, command: Command) -> bool {
        self.notice = None;
        match command {
            Command::Quit => return false,
            Command::Login(credentials) => self.login(credentials).await,
            Command::Logout => self.logout(),
            _ if self.gate.view() == View::Login => {
                self.notice = Some("Login required".to_string());
            }
            Command::SetPhone(value) => self.list.set_phone_substring(value, Instant::now()),
            Command::SetName(value) => self.list.set_name_substring(value, Instant::now()),
            Command::Submit => {
                let ticket = self.list.submit_search();
                self.dispatch(ticket);
            }
            Command::Clear => {
                let ticket = self.list.clear_search();
                self.dispatch(ticket);
            }
            Command::PageSize(size) => {
                if let Some(ticket) = self.list.set_page_size(size) {
                    self.dispatch(ticket);
                }
            }
            Command::GoToPage(page) => match self.list.go_to_page(page) {
                Ok(Some(ticket)) => self.dispatch(ticket),
                Ok(None) => {}
                Err(e) => self.notice = Some(e.to_string()),
            },
            Command::NextPage => {
                if let Some(ticket) = self.list.next_page() {
                    self.dispatch(ticket);
                }
            }
            Command::PrevPage => {
                if let Some(ticket) = self.list.prev_page() {
                    self.dispatch(ticket);
                }
            }
            Command::Toggle(id) => {
                self.list.toggle_expanded(id);
            }
            Command::Refresh => {
                let ticket = self.list.fetch_page();
                self.dispatch(ticket);
            }
        }
        true
    }

    /// Runs until `Quit` or until the command channel closes, rendering a frame
    /// after every event. Hands the dashboard back for inspection.
    pub async fn run<R>(mut self, mut commands: mpsc::Receiver<Command>, mut render: R) -> Self
    where
        R: FnMut(&Frame<'_>),
    {
        self.start();
        render(&self.frame());
        loop {
            let debounce: OptionFuture<_> = self.list.debounce_deadline().map(sleep_until).into();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.handle(command).await {
                            break;
                        }
                    }
                    None => break,
                },
                Some(done) = self.done_rx.recv() => self.on_completion(done),
                Some(()) = debounce => self.on_debounce(Instant::now()),
            }
            render(&self.frame());
        }
        self
    }

    /// Waits until the latest fetch has been applied or has failed.
    pub async fn settle(&mut self) {
        while self.list.is_loading() {
            match self.done_rx.recv().await {
                Some(done) => self.on_completion(done),
                None => break,
            }
        }
    }

    async fn login(&mut self, credentials: Credentials) {
        match self.gate.login(self.api.as_ref(), &credentials).await {
            Ok(_) => {
                self.list.reset();
                let ticket = self.list.fetch_page();
                self.dispatch(ticket);
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn logout(&mut self) {
        if let Err(e) = self.gate.logout() {
            warn!("logout could not clear the stored token: {e}");
        }
        self.list.reset();
    }

    fn on_debounce(&mut self, now: Instant) {
        if self.gate.view() == View::Login {
            self.list.cancel_debounce();
            return;
        }
        if let Some(ticket) = self.list.poll_debounce(now) {
            self.dispatch(ticket);
        }
    }

    fn dispatch(&mut self, ticket: FetchTicket) {
        let token = match self.gate.require_session() {
            Ok(token) => token,
            Err(e) => {
                info!("fetch aborted: {e}");
                self.list.abandon(&ticket);
                return;
            }
        };
        let epoch = self.gate.epoch();
        let api = Arc::clone(&self.api);
        let done_tx = self.done_tx.clone();
        debug!(
            "fetching page {} (generation {})",
            ticket.query.page, ticket.generation
        );
        tokio::spawn(async move {
            let result = api.list_customers(&token, &ticket.query).await;
            let _ = done_tx.send(Completion {
                epoch,
                generation: ticket.generation,
                result,
            });
        });
    }

    fn on_completion(&mut self, done: Completion) {
        if done.epoch != self.gate.epoch() {
            debug!("dropping response issued under an ended session");
            return;
        }
        match self.list.complete(done.generation, done.result) {
            FetchOutcome::Applied => debug!("applied generation {}", done.generation),
            FetchOutcome::Stale => debug!("dropping stale generation {}", done.generation),
            FetchOutcome::Failed(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: ApiError) {
        self.list.cancel_debounce();
        match &error {
            ApiError::AuthRejected { status } => {
                warn!("Unauthorized access - redirecting to login (status {status})");
                if let Err(e) = self.gate.invalidate() {
                    warn!("could not clear rejected token: {e}");
                }
            }
            ApiError::RequestFailed { status, body } => {
                warn!("Fayda customers fetch failed: {status} {body}");
                self.gate.redirect_to_login();
            }
            other => {
                warn!("Fayda customers fetch failed: {other}");
                self.gate.redirect_to_login();
            }
        }
    }
}
