//! Line protocol for the console front-end.
//!
//! Each line is one interaction performed by a named user:
//!
//! ```text
//! <user> odds <target> <max> <prompt...>
//! <user> click <custom-id>
//! <user> submit <custom-id> <pick>
//! help
//! quit
//! ```

use anyhow::{bail, Context, Result};

pub const USAGE: &str = "\
commands:
  <user> odds <target> <max> <prompt...>   challenge <target> (names ending in 'bot' are bots)
  <user> click <custom-id>                 press a button (accept / decline / enter)
  <user> submit <custom-id> <pick>         submit a pick
  help                                     show this message
  quit                                     exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Odds {
        user: String,
        target: String,
        max: i64,
        prompt: String,
    },
    Click {
        user: String,
        custom_id: String,
    },
    Submit {
        user: String,
        custom_id: String,
        raw_pick: String,
    },
    Help,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let first = words.next().unwrap_or_default();
    match first {
        "quit" | "exit" => return Ok(Some(ConsoleCommand::Quit)),
        "help" => return Ok(Some(ConsoleCommand::Help)),
        _ => {}
    }

    let user = first.to_string();
    let Some(verb) = words.next() else {
        bail!("missing command after user '{user}'");
    };

    let command = match verb {
        "odds" => {
            let target = words.next().context("usage: <user> odds <target> <max> <prompt...>")?;
            let max_raw = words.next().context("usage: <user> odds <target> <max> <prompt...>")?;
            let max = max_raw
                .parse::<i64>()
                .with_context(|| format!("max must be an integer, got '{max_raw}'"))?;
            ConsoleCommand::Odds {
                user,
                target: target.to_string(),
                max,
                prompt: words.collect::<Vec<_>>().join(" "),
            }
        }
        "click" => {
            let custom_id = words.next().context("usage: <user> click <custom-id>")?;
            ConsoleCommand::Click {
                user,
                custom_id: custom_id.to_string(),
            }
        }
        "submit" => {
            let custom_id = words.next().context("usage: <user> submit <custom-id> <pick>")?;
            let raw_pick = words.collect::<Vec<_>>().join(" ");
            ConsoleCommand::Submit {
                user,
                custom_id: custom_id.to_string(),
                raw_pick,
            }
        }
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_odds() {
        let cmd = parse_line("alice odds bob 10 sing   a song").unwrap().unwrap();
        assert_eq!(
            cmd,
            ConsoleCommand::Odds {
                user: "alice".into(),
                target: "bob".into(),
                max: 10,
                prompt: "sing a song".into(),
            }
        );
    }

    #[test]
    fn parse_click_and_submit() {
        let click = parse_line("bob click odds:accept:abc").unwrap().unwrap();
        assert_eq!(
            click,
            ConsoleCommand::Click {
                user: "bob".into(),
                custom_id: "odds:accept:abc".into(),
            }
        );

        let submit = parse_line("bob submit odds:submit:abc 4").unwrap().unwrap();
        assert_eq!(
            submit,
            ConsoleCommand::Submit {
                user: "bob".into(),
                custom_id: "odds:submit:abc".into(),
                raw_pick: "4".into(),
            }
        );
    }

    #[test]
    fn parse_keywords_and_blank_lines() {
        assert_eq!(parse_line("quit").unwrap(), Some(ConsoleCommand::Quit));
        assert_eq!(parse_line("  help ").unwrap(), Some(ConsoleCommand::Help));
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("# comment").unwrap(), None);
    }

    #[test]
    fn parse_errors() {
        assert!(parse_line("alice").is_err());
        assert!(parse_line("alice dance").is_err());
        assert!(parse_line("alice odds bob").is_err());
        assert!(parse_line("alice odds bob ten prompt").is_err());
        assert!(parse_line("alice click").is_err());
    }
}
