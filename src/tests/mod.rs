use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::api::fake::{page_of, FakeApi, Scripted};
use crate::api::{Credentials, ListQuery};
use crate::listing::PageSize;
use crate::runner::{Command, Dashboard, Options};
use crate::session::{MemoryTokenStore, TokenStore, View};

fn dashboard(api: &Arc<FakeApi>, store: MemoryTokenStore) -> Dashboard<FakeApi, MemoryTokenStore> {
    Dashboard::new(Arc::clone(api), store, Options::default())
}

fn logged_in(api: &Arc<FakeApi>) -> Dashboard<FakeApi, MemoryTokenStore> {
    dashboard(api, MemoryTokenStore::with_token("abc"))
}

fn stored_token(board: &Dashboard<FakeApi, MemoryTokenStore>) -> Option<String> {
    board.gate().store().load().unwrap()
}

#[tokio::test]
async fn no_token_means_login_view_and_no_requests() {
    let api = Arc::new(FakeApi::new());
    let mut board = dashboard(&api, MemoryTokenStore::new());

    board.start();
    board.settle().await;

    assert_eq!(board.view(), View::Login);
    assert_eq!(api.call_count(), 0);
    assert!(board.list().records().is_empty());
}

#[tokio::test]
async fn malformed_token_is_treated_as_missing() {
    let api = Arc::new(FakeApi::new());
    let mut board = dashboard(&api, MemoryTokenStore::with_token("not a token"));

    board.start();

    assert_eq!(board.view(), View::Login);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn first_load_requests_page_one_with_default_size() {
    let api = Arc::new(FakeApi::new());
    api.push(Scripted::Page(page_of(&[1, 2, 3], 4)));
    let mut board = logged_in(&api);

    board.start();
    assert!(board.list().is_loading());
    board.settle().await;

    assert_eq!(board.view(), View::Main);
    assert_eq!(
        api.queries(),
        vec![ListQuery {
            page: 1,
            paginate: 10,
            phone_number_search: None,
            name_search: None,
        }]
    );
    assert_eq!(api.calls.lock().unwrap()[0].0, "abc");
    assert_eq!(board.list().records().len(), 3);
    assert_eq!(board.list().page_numbers(), 1..=4);
}

#[tokio::test(start_paused = true)]
async fn typing_burst_sends_one_search_after_the_pause() {
    let api = Arc::new(FakeApi::new());
    let board = logged_in(&api);
    let (tx, rx) = mpsc::channel(16);

    let counter = Arc::clone(&api);
    let driver = async move {
        sleep(Duration::from_millis(10)).await;
        for typed in ["0", "09", "091", "0911", "09112", "091122"] {
            tx.send(Command::SetPhone(typed.to_string())).await.unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_millis(300)).await;
        // only the initial load so far
        assert_eq!(counter.call_count(), 1);
        sleep(Duration::from_secs(2)).await;
        tx.send(Command::Quit).await.unwrap();
    };

    let (board, ()) = tokio::join!(board.run(rx, |_| {}), driver);

    let queries = api.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].phone_number_search.as_deref(), Some("091122"));
    assert_eq!(queries[1].page, 1);
    assert!(!board.list().is_loading());
}

#[tokio::test(start_paused = true)]
async fn explicit_search_cancels_the_pending_pause() {
    let api = Arc::new(FakeApi::new());
    let board = logged_in(&api);
    let (tx, rx) = mpsc::channel(16);

    let driver = async move {
        sleep(Duration::from_millis(10)).await;
        tx.send(Command::SetName("Hana".to_string())).await.unwrap();
        tx.send(Command::Submit).await.unwrap();
        sleep(Duration::from_secs(2)).await;
        tx.send(Command::Quit).await.unwrap();
    };

    let (board, ()) = tokio::join!(board.run(rx, |_| {}), driver);

    let queries = api.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].name_search.as_deref(), Some("Hana"));
    assert!(board.list().debounce_deadline().is_none());
}

#[tokio::test]
async fn page_size_change_goes_back_to_page_one() {
    let api = Arc::new(FakeApi::new());
    api.push(Scripted::Page(page_of(&[1, 2, 3], 5)));
    api.push(Scripted::Page(page_of(&[7, 8, 9], 5)));
    let mut board = logged_in(&api);
    board.start();
    board.settle().await;

    board.handle(Command::GoToPage(3)).await;
    board.settle().await;
    assert_eq!(board.list().filter().page(), 3);

    board.handle(Command::PageSize(PageSize::Twenty)).await;
    board.settle().await;

    let last = api.queries().pop().unwrap();
    assert_eq!(last.page, 1);
    assert_eq!(last.paginate, 20);
    assert_eq!(api.call_count(), 3);
}

#[tokio::test]
async fn same_page_and_same_size_do_not_refetch() {
    let api = Arc::new(FakeApi::new());
    api.push(Scripted::Page(page_of(&[1, 2], 3)));
    let mut board = logged_in(&api);
    board.start();
    board.settle().await;

    board.handle(Command::GoToPage(1)).await;
    board.handle(Command::PageSize(PageSize::Ten)).await;
    board.handle(Command::PrevPage).await;

    assert_eq!(api.call_count(), 1);
    assert!(!board.list().is_loading());
}

#[tokio::test]
async fn out_of_range_page_is_reported_not_requested() {
    let api = Arc::new(FakeApi::new());
    api.push(Scripted::Page(page_of(&[1, 2], 2)));
    let mut board = logged_in(&api);
    board.start();
    board.settle().await;

    board.handle(Command::GoToPage(9)).await;

    assert_eq!(api.call_count(), 1);
    assert!(board.notice().is_some_and(|n| n.contains('9')));
    assert_eq!(board.list().filter().page(), 1);
}

#[tokio::test]
async fn rejected_token_returns_to_login_and_is_forgotten() {
    for status in [401, 403] {
        let api = Arc::new(FakeApi::new());
        api.push(Scripted::Page(page_of(&[1, 2], 1)));
        api.push(Scripted::Status(status));
        let mut board = logged_in(&api);
        board.start();
        board.settle().await;

        board.handle(Command::Refresh).await;
        board.settle().await;

        assert_eq!(board.view(), View::Login);
        assert_eq!(stored_token(&board), None);
        assert_eq!(board.list().records().len(), 2);
        assert!(!board.list().is_loading());
    }
}

#[tokio::test]
async fn server_error_returns_to_login_but_keeps_token() {
    let api = Arc::new(FakeApi::new());
    api.push(Scripted::Status(500));
    let mut board = logged_in(&api);

    board.start();
    board.settle().await;

    assert_eq!(board.view(), View::Login);
    assert_eq!(stored_token(&board).as_deref(), Some("abc"));
    assert!(board.list().records().is_empty());

    board.handle(Command::Refresh).await;
    board.handle(Command::NextPage).await;
    board.settle().await;

    assert_eq!(board.view(), View::Login);
    assert_eq!(board.notice(), Some("Login required"));
    assert_eq!(api.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_drops_the_pending_typed_search() {
    let api = Arc::new(FakeApi::new());
    api.push(Scripted::Page(page_of(&[1, 2], 1)));
    api.push(Scripted::Status(500));
    let board = logged_in(&api);
    let (tx, rx) = mpsc::channel(16);

    let views = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&views);
    let driver = async move {
        sleep(Duration::from_millis(10)).await;
        tx.send(Command::SetPhone("09".to_string())).await.unwrap();
        tx.send(Command::Refresh).await.unwrap();
        sleep(Duration::from_secs(2)).await;
        tx.send(Command::Refresh).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        tx.send(Command::Quit).await.unwrap();
    };

    let (board, ()) = tokio::join!(
        board.run(rx, move |frame| seen.lock().unwrap().push(frame.view)),
        driver
    );

    assert_eq!(board.view(), View::Login);
    assert_eq!(api.call_count(), 2);
    assert_eq!(stored_token(&board).as_deref(), Some("abc"));
    assert!(board.list().debounce_deadline().is_none());

    let views = views.lock().unwrap();
    let redirected_at = views.iter().position(|v| *v == View::Login).unwrap();
    assert!(views[redirected_at..].iter().all(|v| *v == View::Login));
}

#[tokio::test]
async fn unreadable_body_returns_to_login() {
    let api = Arc::new(FakeApi::new());
    api.push(Scripted::Garbage);
    let mut board = logged_in(&api);

    board.start();
    board.settle().await;

    assert_eq!(board.view(), View::Login);
    assert_eq!(stored_token(&board).as_deref(), Some("abc"));
}

#[tokio::test(start_paused = true)]
async fn logout_during_fetch_discards_the_late_response() {
    let api = Arc::new(FakeApi::new().with_delay(Duration::from_secs(1)));
    let board = logged_in(&api);
    let (tx, rx) = mpsc::channel(16);

    let frames = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&frames);
    let driver = async move {
        sleep(Duration::from_millis(100)).await;
        tx.send(Command::Logout).await.unwrap();
        sleep(Duration::from_secs(3)).await;
        tx.send(Command::Quit).await.unwrap();
    };

    let (board, ()) = tokio::join!(
        board.run(rx, move |frame| {
            seen.lock()
                .unwrap()
                .push((frame.view, frame.list.records().len()));
        }),
        driver
    );

    assert_eq!(api.call_count(), 1);
    assert_eq!(board.view(), View::Login);
    assert!(board.list().records().is_empty());
    assert_eq!(stored_token(&board), None);

    let frames = frames.lock().unwrap();
    let logout_at = frames
        .iter()
        .position(|(view, _)| *view == View::Login)
        .unwrap();
    assert!(frames[logout_at..]
        .iter()
        .all(|(view, records)| *view == View::Login && *records == 0));
}

#[tokio::test]
async fn login_stores_token_and_loads_the_list() {
    let api = Arc::new(FakeApi::new());
    let mut board = dashboard(&api, MemoryTokenStore::new());
    board.start();
    assert_eq!(board.view(), View::Login);

    board
        .handle(Command::Login(Credentials::new("admin@example.com", "secret")))
        .await;
    board.settle().await;

    assert_eq!(board.view(), View::Main);
    assert_eq!(stored_token(&board).as_deref(), Some("abc"));
    assert_eq!(api.logins.lock().unwrap()[0].email, "admin@example.com");
    assert_eq!(api.call_count(), 1);
    assert_eq!(board.list().records().len(), 1);
}

#[tokio::test]
async fn rejected_login_shows_the_server_message() {
    let api = Arc::new(FakeApi::new());
    api.reject_logins("Invalid credentials");
    let mut board = dashboard(&api, MemoryTokenStore::new());

    board
        .handle(Command::Login(Credentials::new("admin@example.com", "wrong")))
        .await;

    assert_eq!(board.view(), View::Login);
    assert_eq!(board.notice(), Some("Invalid credentials"));
    assert_eq!(stored_token(&board), None);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn list_commands_need_a_session() {
    let api = Arc::new(FakeApi::new());
    let mut board = dashboard(&api, MemoryTokenStore::new());
    board.start();

    board.handle(Command::Refresh).await;
    assert_eq!(board.notice(), Some("Login required"));
    board.handle(Command::SetPhone("0911".to_string())).await;

    assert_eq!(api.call_count(), 0);
    assert!(board.list().debounce_deadline().is_none());
}

#[tokio::test]
async fn expanded_rows_survive_until_logout() {
    let api = Arc::new(FakeApi::new());
    let mut board = logged_in(&api);
    board.start();
    board.settle().await;

    board.handle(Command::Toggle(1)).await;
    assert!(board.list().is_expanded(1));

    board.handle(Command::Logout).await;
    assert!(!board.list().is_expanded(1));
    assert_eq!(board.view(), View::Login);
}

#[tokio::test]
async fn quit_stops_the_dashboard() {
    let api = Arc::new(FakeApi::new());
    let mut board = logged_in(&api);
    assert!(!board.handle(Command::Quit).await);
    assert!(board.handle(Command::Clear).await);
}
