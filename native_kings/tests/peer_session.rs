use anyhow::Result;
use kad_kings::{Dispatch, TableRules};
use kings_shared::{Action, Identity};
use native_kings::server::{build_router, RelayState};
use native_kings::session::{run_session, Command, SessionOptions, View};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

struct Player {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<View>,
    task: JoinHandle<Result<()>>,
}

impl Player {
    fn start(relay: &str, name: &str) -> Self {
        let opts = SessionOptions {
            relay: relay.to_string(),
            room: "den".into(),
            name: name.into(),
            rules: TableRules::default(),
            tick: Duration::from_millis(50),
        };
        let (commands, rx) = mpsc::channel(8);
        let (tx, view) = watch::channel(View::default());
        let task = tokio::spawn(run_session(opts, rx, tx));
        Player {
            commands,
            view,
            task,
        }
    }

    async fn act(&self, action: Action) -> Result<Dispatch> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Act(action, tx)).await?;
        Ok(rx.await?)
    }

    /// Wait until the published view satisfies `pred`.
    async fn until(&mut self, pred: impl Fn(&View) -> bool) -> Result<View> {
        let view = tokio::time::timeout(Duration::from_secs(5), self.view.wait_for(|v| pred(v)))
            .await??
            .clone();
        Ok(view)
    }
}

#[tokio::test]
async fn two_native_peers_share_one_table() -> Result<()> {
    let app = build_router(RelayState::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let relay = format!("http://{}", listener.local_addr()?);
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let mut ann = Player::start(&relay, "ann");
    ann.until(|v| v.is_host).await?;

    let mut bo = Player::start(&relay, "bo");
    let seen = bo
        .until(|v| v.state.is_present(&Identity::from("bo")))
        .await?;
    assert!(!seen.is_host);
    assert_eq!(seen.state.host, Some(Identity::from("ann")));

    // A guest edit travels to the host and comes back as a snapshot.
    let patch = Action::PatchPlayer {
        target: "bo".into(),
        drinks: Some(3),
    };
    assert_eq!(bo.act(patch).await?, Dispatch::Requested);
    let host_view = ann
        .until(|v| v.state.players.get(&Identity::from("bo")).map(|p| p.drinks) == Some(3))
        .await?;
    let guest_view = bo
        .until(|v| v.state.revision == host_view.state.revision)
        .await?;
    assert_eq!(guest_view.state, host_view.state);

    // The host leaves; the survivor takes the table over.
    ann.commands.send(Command::Quit).await?;
    ann.task.await??;
    let took_over = bo.until(|v| v.is_host).await?;
    assert!(!took_over.state.is_present(&Identity::from("ann")));
    assert_eq!(took_over.state.deck, guest_view.state.deck);
    assert_eq!(took_over.state.players[&Identity::from("bo")].drinks, 3);
    assert_eq!(took_over.state.turn, Some(Identity::from("bo")));

    bo.commands.send(Command::Quit).await?;
    bo.task.await??;
    server.abort();
    Ok(())
}

#[tokio::test]
async fn joining_without_a_relay_fails_cleanly() {
    let player = Player::start("http://127.0.0.1:9", "ann");
    let err = player.task.await.unwrap().unwrap_err();
    assert!(format!("{err:#}").contains("joining room 'den' as 'ann'"));
    assert_eq!(*player.view.borrow(), View::default());
}
