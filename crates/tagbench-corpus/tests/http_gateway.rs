//! HTTP gateway against a local warp backend that mimics the corpus service.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tagbench_corpus::{
    CorpusGateway, GatewayError, HttpCorpusGateway, QueueSettings, QueueUpdate, SentenceBatch,
    SentenceQueue, DEFAULT_SENTENCES_PATH,
};
use warp::http::StatusCode;
use warp::Filter;

#[derive(Debug, Default)]
struct Backend {
    corpus: Vec<String>,
    queries: Vec<(usize, usize)>,
    inserted: Vec<Vec<String>>,
}

fn backend_with(n: usize) -> Arc<Mutex<Backend>> {
    Arc::new(Mutex::new(Backend {
        corpus: (0..n).map(|i| format!("वाक्य {i}")).collect(),
        ..Backend::default()
    }))
}

fn spawn_backend(state: Arc<Mutex<Backend>>) -> SocketAddr {
    let list_state = Arc::clone(&state);
    let list = warp::path!("manual" / "sentences")
        .and(warp::get())
        .and(warp::query::<HashMap<String, usize>>())
        .map(move |query: HashMap<String, usize>| {
            let limit = query.get("limit").copied().unwrap_or(25);
            let offset = query.get("offset").copied().unwrap_or(0);
            let mut backend = list_state.lock().unwrap();
            backend.queries.push((limit, offset));
            let page = backend.corpus.iter().skip(offset).take(limit).cloned().collect();
            warp::reply::json(&SentenceBatch::new(page))
        });

    let insert_state = Arc::clone(&state);
    let insert = warp::path!("manual" / "sentences")
        .and(warp::post())
        .and(warp::body::json())
        .map(move |batch: SentenceBatch| {
            let mut backend = insert_state.lock().unwrap();
            backend.corpus.extend(batch.sentences.iter().cloned());
            backend.inserted.push(batch.sentences);
            warp::reply::json(&serde_json::json!({ "inserted": 1 }))
        });

    let broken = warp::path!("broken" / "sentences")
        .map(|| warp::reply::with_status("unavailable", StatusCode::SERVICE_UNAVAILABLE));

    let (addr, server) = warp::serve(list.or(insert).or(broken)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn base(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

#[tokio::test]
async fn fetch_page_sends_limit_and_offset() {
    let state = backend_with(40);
    let addr = spawn_backend(Arc::clone(&state));
    let gateway = HttpCorpusGateway::new(&base(addr), DEFAULT_SENTENCES_PATH).unwrap();

    let page = gateway.fetch_page(30, 25).await.unwrap();

    assert_eq!(page.len(), 10);
    assert_eq!(page[0], "वाक्य 30");
    assert_eq!(state.lock().unwrap().queries, vec![(25, 30)]);
}

#[tokio::test]
async fn insert_posts_sentence_batch() {
    let state = backend_with(0);
    let addr = spawn_backend(Arc::clone(&state));
    let gateway = HttpCorpusGateway::new(&base(addr), DEFAULT_SENTENCES_PATH).unwrap();

    gateway
        .insert_sentences(vec!["मेरा घर".to_string()])
        .await
        .unwrap();

    assert_eq!(state.lock().unwrap().inserted, vec![vec!["मेरा घर".to_string()]]);
}

#[tokio::test]
async fn error_status_is_reported() {
    let addr = spawn_backend(backend_with(0));
    let gateway = HttpCorpusGateway::new(&base(addr), "/broken/sentences").unwrap();

    let err = gateway.fetch_page(0, 25).await.unwrap_err();
    assert_eq!(err, GatewayError::Status { status: 503 });

    let err = gateway.insert_sentences(vec!["x".into()]).await.unwrap_err();
    assert_eq!(err, GatewayError::Status { status: 503 });
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let gateway = HttpCorpusGateway::new("http://127.0.0.1:1", DEFAULT_SENTENCES_PATH).unwrap();
    let err = gateway.fetch_page(0, 25).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn queue_prefetches_over_http() {
    let state = backend_with(60);
    let addr = spawn_backend(Arc::clone(&state));
    let gateway = HttpCorpusGateway::new(&base(addr), DEFAULT_SENTENCES_PATH).unwrap();
    let mut queue = SentenceQueue::new(Arc::new(gateway), QueueSettings::default());

    queue.load_now(0, false).await.unwrap();
    for _ in 0..22 {
        queue.advance();
    }
    let updates = queue.settle().await;

    assert!(matches!(
        updates.as_slice(),
        [QueueUpdate::PageApplied { received: 25, .. }]
    ));
    assert_eq!(queue.window().len(), 50);
    assert_eq!(queue.window().cursor(), 22);
    assert_eq!(state.lock().unwrap().queries, vec![(25, 0), (25, 25)]);
}
