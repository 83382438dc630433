mod cli;

use std::io::IsTerminal;

use anyhow::{anyhow, Context};
use clap::Parser;
use cli::{parse_line, Cli, Line, HELP};
use kad_kings::utils::now_millis;
use kings_shared::Identity;
use native_kings::config::Config;
use native_kings::pretty;
use native_kings::session::{run_session, Command, SessionOptions, View};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot, watch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    native_kings::cli::init_tracing(args.debug);

    let mut cfg = Config::load_or_create(&args.config)
        .with_context(|| format!("loading or creating config '{}'", args.config.display()))?;
    if let Some(name) = args.name {
        cfg.peer.name = Some(name);
    }
    if let Some(room) = args.room {
        cfg.peer.room = room;
    }
    if let Some(relay) = args.relay {
        cfg.peer.relay = relay;
    }
    if args.persist {
        cfg.save(&args.config)
            .with_context(|| format!("saving updated config '{}'", args.config.display()))?;
    }

    let name = cfg
        .peer
        .name
        .clone()
        .ok_or_else(|| anyhow!("no name given; pass --name or set [peer] name in the config"))?;
    let me = Identity::from_display_name(&name);
    let color = !args.no_color && std::io::stdout().is_terminal();

    let opts = SessionOptions::from_config(&cfg.peer, name, cfg.table.clone());
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (view_tx, mut view_rx) = watch::channel(View::default());
    let mut session = tokio::spawn(run_session(opts, cmd_rx, view_tx));

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            biased;

            res = &mut session => {
                return res.map_err(|e| anyhow!("session task failed: {e}"))?;
            }
            changed = view_rx.changed() => {
                if changed.is_ok() {
                    let view = view_rx.borrow_and_update().clone();
                    println!("{}", pretty::format_table(&view.state, &me, now_millis(), color));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match parse_line(&line, &me) {
                    Ok(None) => {}
                    Ok(Some(Line::Help)) => println!("{HELP}"),
                    Ok(Some(Line::Show)) => {
                        let view = view_rx.borrow().clone();
                        println!("{}", pretty::format_table(&view.state, &me, now_millis(), color));
                    }
                    Ok(Some(Line::Quit)) => break,
                    Ok(Some(Line::Act(action))) => {
                        let (tx, rx) = oneshot::channel();
                        if cmd_tx.send(Command::Act(action, tx)).await.is_err() {
                            continue;
                        }
                        if let Ok(outcome) = rx.await {
                            println!("{}", pretty::format_dispatch(&outcome, color));
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }

    let _ = cmd_tx.send(Command::Quit).await;
    session
        .await
        .map_err(|e| anyhow!("session task failed: {e}"))?
}
