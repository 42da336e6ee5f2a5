#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

/// One canned response. The last reply queued for a path repeats forever.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self::status(200, value)
    }

    pub fn status(status: u16, value: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
        }
    }

    pub fn bytes(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "application/zip",
            body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct State {
    replies: HashMap<String, VecDeque<Reply>>,
    requests: Vec<Recorded>,
}

/// Stand-in for the authoring backend on an ephemeral port.
pub struct BackendStub {
    pub base_url: String,
    state: Arc<Mutex<State>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl BackendStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start backend stub server");
        let base_url = format!("http://{}", server.server_addr());
        let state = Arc::new(Mutex::new(State::default()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let shared = Arc::clone(&state);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_owned();
                let (path, query) = match url.split_once('?') {
                    Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
                    None => (url, None),
                };
                let mut raw = String::new();
                let _ = request.as_reader().read_to_string(&mut raw);
                let body = serde_json::from_str(&raw).unwrap_or(Value::Null);

                let reply = {
                    let mut state = shared.lock().expect("stub state");
                    state.requests.push(Recorded {
                        method: request.method().to_string(),
                        path: path.clone(),
                        query,
                        body,
                    });
                    match state.replies.get_mut(&path) {
                        Some(queue) if queue.len() > 1 => queue.pop_front(),
                        Some(queue) => queue.front().cloned(),
                        None => None,
                    }
                };
                let reply = reply.unwrap_or_else(|| {
                    Reply::status(
                        404,
                        serde_json::json!({ "detail": format!("no stub for {path}") }),
                    )
                });

                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    reply.content_type.as_bytes(),
                )
                .expect("build header");
                let response = tiny_http::Response::from_data(reply.body)
                    .with_status_code(reply.status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn reply(&self, path: &str, reply: Reply) -> &Self {
        self.state
            .lock()
            .expect("stub state")
            .replies
            .entry(path.to_owned())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self, path: &str) -> Vec<Recorded> {
        self.state
            .lock()
            .expect("stub state")
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests(path).len()
    }

    pub fn total_hits(&self) -> usize {
        self.state.lock().expect("stub state").requests.len()
    }
}

impl Drop for BackendStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn outline_json() -> Value {
    serde_json::json!({
        "book": {
            "title": "Async Rust in Practice",
            "description": "Futures, executors and the patterns around them.",
            "author": "Ferris",
            "target_audience": "intermediate"
        },
        "chapters": [
            {
                "chapter_number": 1,
                "title": "Futures",
                "description": "What a future is.",
                "learning_objectives": ["poll", "wakers"],
                "estimated_words": 2000
            },
            {
                "chapter_number": 2,
                "title": "Executors",
                "description": "Running futures.",
                "learning_objectives": ["spawn"],
                "estimated_words": 2500
            }
        ],
        "recommended_features": ["admonitions", "code_blocks", "not_a_feature"],
        "structure_explanation": "Bottom-up."
    })
}

pub fn avatar_json() -> Value {
    serde_json::json!({
        "name": "Stuck Sam",
        "tagline": "Knows something is wrong, not what to do",
        "stage": "problem_aware",
        "demographics": {
            "age_range": "30-40",
            "occupation": "Analyst",
            "income": "$80k",
            "life_stage": "Mid-career"
        }
    })
}
