//! HTTP front-end: every request replays a sequence of moves from the
//! starting position and answers with the evaluation of the result.
//!
//! `GET /about` describes the engine, `GET /{moves}` evaluates a concatenation
//! of 4-character coordinate moves (`/e2e4e7e5`). Anything else is a 404, and
//! other methods on known routes are a 405.

use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::chess::game::{self, Game};
use crate::evaluation;

/// Body of the `/about` page.
pub const ABOUT: &str = "stronkchess by Joseph Huang";

/// Status and `text/plain` body.
pub type Response = (StatusCode, String);

/// Routes of the engine.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/about", get(about))
        .route("/", get(starting_position))
        .route("/{moves}", get(replay))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}

async fn about() -> &'static str {
    ABOUT
}

async fn starting_position() -> Response {
    evaluate("")
}

async fn replay(Path(moves): Path<String>) -> Response {
    evaluate(&moves)
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found".to_string())
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        "only GET is supported".to_string(),
    )
}

/// Replays the moves from the starting position and evaluates the result.
/// A threefold repetition within the sequence is a draw.
#[must_use]
pub fn evaluate(moves: &str) -> Response {
    if !is_move_sequence(moves) {
        return (StatusCode::NOT_FOUND, "not found".to_string());
    }
    let mut game = Game::new();
    if let Err(e) = game.replay(moves) {
        tracing::warn!(moves, "rejected moves: {e:#}");
        return (StatusCode::BAD_REQUEST, format!("{e:#}"));
    }
    let score = if game.is_threefold_repetition() {
        0
    } else {
        evaluation::mobility(game.position())
    };
    tracing::debug!(moves, score, "evaluated");
    (StatusCode::OK, score.to_string())
}

// ([a-h][1-8][a-h][1-8])*
fn is_move_sequence(moves: &str) -> bool {
    moves.len() % game::TOKEN_LENGTH == 0
        && moves.as_bytes().chunks(2).all(|square| {
            matches!(square, [file, rank] if (b'a'..=b'h').contains(file) && (b'1'..=b'8').contains(rank))
        })
}

/// Binds to the address and serves until the process is terminated.
///
/// # Errors
///
/// Fails if the address can not be bound.
pub async fn serve(address: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);
    run(listener).await
}

/// Serves the engine routes on an already bound listener.
///
/// # Errors
///
/// Fails if the listener stops accepting connections.
pub async fn run(listener: TcpListener) -> anyhow::Result<()> {
    axum::serve(listener, router())
        .await
        .context("serving HTTP")
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tower::ServiceExt;

    use super::*;

    async fn request(method: Method, uri: &str) -> Response {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get(uri: &str) -> Response {
        request(Method::GET, uri).await
    }

    #[tokio::test]
    async fn about() {
        assert_eq!(get("/about").await, (StatusCode::OK, ABOUT.to_string()));
    }

    #[tokio::test]
    async fn evaluation() {
        assert_eq!(get("/").await, (StatusCode::OK, "20".to_string()));
        assert_eq!(get("/e2e4").await, (StatusCode::OK, "20".to_string()));
        assert_eq!(get("/e2e4e7e5").await, (StatusCode::OK, "29".to_string()));
        // Fool's mate.
        assert_eq!(
            get("/f2f3e7e5g2g4d8h4").await,
            (StatusCode::OK, "-10000".to_string())
        );
    }

    #[tokio::test]
    async fn promotion_without_suffix() {
        // 5. bxa8 queens with black to move.
        let (status, _) = get("/a2a4b7b5a4b5a7a6b5a6c8b7a6b7b8c6b7a8").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn threefold_repetition_is_a_draw() {
        assert_eq!(
            get("/g1f3g8f6f3g1f6g8g1f3g8f6f3g1f6g8").await,
            (StatusCode::OK, "0".to_string())
        );
    }

    #[tokio::test]
    async fn errors() {
        assert_eq!(get("/e2e5").await.0, StatusCode::BAD_REQUEST);
        assert_eq!(get("/e2e4e7").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get("/e2e9").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get("/index.html").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get("/e2e4/e7e5").await.0, StatusCode::NOT_FOUND);
        assert_eq!(
            request(Method::POST, "/about").await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            request(Method::PUT, "/e2e4").await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn move_sequences() {
        assert!(is_move_sequence(""));
        assert!(is_move_sequence("e2e4e7e5"));
        assert!(!is_move_sequence("e2e4e7"));
        assert!(!is_move_sequence("e2e4q"));
        assert!(!is_move_sequence("i2e4"));
        assert!(!is_move_sequence("about"));
    }

    #[tokio::test]
    async fn socket_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(run(listener));

        let mut stream = TcpStream::connect(address).await.unwrap();
        stream
            .write_all(b"GET /e2e4e7e5 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        let _ = stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("\r\n\r\n29"));

        server.abort();
    }

    #[tokio::test]
    async fn unterminated_request_line_is_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(run(listener));

        let stream = TcpStream::connect(address).await.unwrap();
        let (mut reader, mut writer) = stream.into_split();
        // The writer is never told the line ends: no newline, socket stays open.
        let writer = tokio::spawn(async move {
            let mut head = b"GET /".to_vec();
            head.resize(512 * 1024, b'a');
            let _ = writer.write_all(&head).await;
            writer
        });
        let mut response = Vec::new();
        let finished =
            tokio::time::timeout(Duration::from_secs(10), reader.read_to_end(&mut response)).await;
        assert!(finished.is_ok(), "connection with an endless head is kept");
        assert!(!response.starts_with(b"HTTP/1.1 200"));

        writer.abort();
        server.abort();
    }
}
