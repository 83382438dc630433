use kings_shared::{Action, Identity, PowerKind};

pub const HELP: &str = "\
commands:
  draw                    draw the next card
  drinks [name] <n>       set a drink counter (yours unless a name is given)
  start <heaven|thumb>    start the round your badge allows
  tap <heaven|thumb>      tap in the running round
  clear                   discard the current round
  waterfall               start your pending Waterfall
  tag <name>              Question Master catches someone
  rule <text>             King adds a rule
  unrule <id>             remove a King's rule
  state                   show the table
  quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Act(Action),
    Show,
    Help,
    Quit,
}

fn kind(word: Option<&str>) -> Result<PowerKind, String> {
    match word.map(str::to_ascii_lowercase).as_deref() {
        Some("heaven" | "7") => Ok(PowerKind::Heaven),
        Some("thumb" | "thumbmaster" | "j") => Ok(PowerKind::Thumbmaster),
        Some(other) => Err(format!("unknown round '{other}', use heaven or thumb")),
        None => Err("which round? heaven or thumb".into()),
    }
}

fn count(word: &str) -> Result<u32, String> {
    word.parse()
        .map_err(|_| format!("'{word}' is not a drink count"))
}

/// Parse a command line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str, me: &Identity) -> Result<Option<Line>, String> {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let parsed = match cmd.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "draw" | "d" => Line::Act(Action::Draw),
        "drinks" => {
            let (target, n) = match args.as_slice() {
                [n] => (me.clone(), count(n)?),
                [name, n] => (Identity::from(*name), count(n)?),
                _ => return Err("usage: drinks [name] <n>".into()),
            };
            Line::Act(Action::PatchPlayer {
                target,
                drinks: Some(n),
            })
        }
        "start" => Line::Act(Action::StartPowerRound(kind(args.first().copied())?)),
        "tap" | "t" => Line::Act(Action::TapPowerRound(kind(args.first().copied())?)),
        "clear" => Line::Act(Action::ClearPowerRound),
        "waterfall" | "w" => Line::Act(Action::StartWaterfall),
        "tag" => match args.as_slice() {
            [name] => Line::Act(Action::TagQuestion {
                target: Identity::from(*name),
            }),
            _ => return Err("usage: tag <name>".into()),
        },
        "rule" if !rest.is_empty() => Line::Act(Action::AddKingRule {
            text: rest.to_string(),
        }),
        "rule" => return Err("usage: rule <text>".into()),
        "unrule" => match args.as_slice() {
            [id] => Line::Act(Action::RemoveKingRule {
                rule_id: id.parse().map_err(|_| format!("'{id}' is not a rule id"))?,
            }),
            _ => return Err("usage: unrule <id>".into()),
        },
        "state" | "s" => Line::Show,
        "help" | "?" => Line::Help,
        "quit" | "exit" | "q" => Line::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(parsed))
}
