use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use kad_kings::{fetch_credential, JoinError};
use kings_shared::{RelayClientMsg, RelayServerMsg};
use native_kings::server::{build_router, RelayState};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

type Ws = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Start the relay on an OS-assigned port.
async fn spawn_relay() -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = build_router(RelayState::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok((addr, handle))
}

async fn join(addr: SocketAddr, room: &str, name: &str) -> Result<Ws> {
    let cred = fetch_credential(&format!("http://{addr}"), room, name).await?;
    let (ws, _) = tokio_tungstenite::connect_async(cred.session_url()).await?;
    Ok(ws)
}

async fn next_frame(ws: &mut Ws) -> Result<RelayServerMsg> {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(3), ws.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("socket closed"))??;
        if let Message::Text(txt) = msg {
            return Ok(serde_json::from_str(&txt)?);
        }
    }
}

#[tokio::test]
async fn relay_welcomes_announces_and_forwards() -> Result<()> {
    let (addr, server) = spawn_relay().await?;

    let mut ann = join(addr, "den", "ann").await?;
    match next_frame(&mut ann).await? {
        RelayServerMsg::Welcome { you, room, peers } => {
            assert_eq!(you.as_str(), "ann");
            assert_eq!(room, "den");
            assert!(peers.is_empty());
        }
        other => panic!("expected welcome, got {other:?}"),
    }

    let mut bo = join(addr, "den", "bo").await?;
    match next_frame(&mut bo).await? {
        RelayServerMsg::Welcome { peers, .. } => assert_eq!(peers, vec!["ann".into()]),
        other => panic!("expected welcome, got {other:?}"),
    }
    assert_eq!(
        next_frame(&mut ann).await?,
        RelayServerMsg::PeerJoined("bo".into())
    );

    let publish = RelayClientMsg::Publish {
        payload: hex::encode(b"hello"),
    };
    bo.send(Message::Text(serde_json::to_string(&publish)?))
        .await?;
    assert_eq!(
        next_frame(&mut ann).await?,
        RelayServerMsg::Data {
            from: "bo".into(),
            payload: hex::encode(b"hello"),
        }
    );

    bo.close(None).await?;
    assert_eq!(
        next_frame(&mut ann).await?,
        RelayServerMsg::PeerLeft("bo".into())
    );

    server.abort();
    Ok(())
}

#[tokio::test]
async fn token_endpoint_refuses_duplicates_and_blanks() -> Result<()> {
    let (addr, server) = spawn_relay().await?;
    let base = format!("http://{addr}");

    let mut ann = join(addr, "den", "ann").await?;
    next_frame(&mut ann).await?;

    match fetch_credential(&base, "den", "ann").await {
        Err(JoinError::Refused { status, message }) => {
            assert_eq!(status, 409);
            assert!(message.contains("already"));
        }
        other => panic!("expected a refusal, got {other:?}"),
    }
    assert!(matches!(
        fetch_credential(&base, "", "ann").await,
        Err(JoinError::MissingParameter(_))
    ));

    let resp = reqwest::get(format!("{base}/token?room=den")).await?;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    // Same name elsewhere is fine.
    assert!(fetch_credential(&base, "attic", "ann").await.is_ok());

    server.abort();
    Ok(())
}

#[tokio::test]
async fn tokens_cannot_be_reused_or_forged() -> Result<()> {
    let (addr, server) = spawn_relay().await?;
    let cred = fetch_credential(&format!("http://{addr}"), "den", "ann").await?;

    let (mut first, _) = tokio_tungstenite::connect_async(cred.session_url()).await?;
    assert!(matches!(
        next_frame(&mut first).await?,
        RelayServerMsg::Welcome { .. }
    ));
    for url in [cred.session_url(), format!("ws://{addr}/ws?token=deadbeef")] {
        match tokio_tungstenite::connect_async(url).await {
            Err(WsError::Http(resp)) => assert_eq!(resp.status(), 401),
            other => panic!("expected 401, got {:?}", other.map(|_| ())),
        }
    }

    server.abort();
    Ok(())
}
