use chrono::{Duration, NaiveDate};
use std::path::PathBuf;

pub const HELP: &str = "\
Commands (sections and tasks are numbered as listed):
  ls                                   show all sections
  new <title>                          create a section
  select <n>                           make section n current
  expand <n>                           expand or collapse section n
  rm <n>                               delete section n and its tasks
  add [n] <url> <due> [title]          add a task (title defaults to the page title)
  bulk [n] <due> <url> [url...]        add several urls with one due date
  done <n> <m>                         toggle task m of section n
  del <n> <m>                          delete task m of section n
  attach [n] <file.pdf>                attach a summary PDF
  cancel [n]                           drop pending title lookups
  help                                 show this help
  quit                                 wait for pending lookups and exit
Due dates: YYYY-MM-DD, today, tomorrow, or +N (days from today).
Without [n], the current section is used.";

/// Which section a command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Current,
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New(String),
    Select(usize),
    Expand(usize),
    Remove(usize),
    Add {
        section: Target,
        url: String,
        due_date: Option<NaiveDate>,
        title: Option<String>,
    },
    Bulk {
        section: Target,
        due_date: Option<NaiveDate>,
        urls: Vec<String>,
    },
    Done {
        section: usize,
        task: usize,
    },
    Delete {
        section: usize,
        task: usize,
    },
    Attach {
        section: Target,
        path: PathBuf,
    },
    Cancel(Target),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    List,
    Help,
    Quit,
    Command(Command),
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn position(word: &str) -> Result<usize, String> {
    match word.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a position (1, 2, ...), got {:?}", word)),
    }
}

/// Split off a leading position if there is one.
fn target(rest: &str) -> (Target, &str) {
    let (word, after) = split_word(rest);
    match position(word) {
        Ok(n) => (Target::Position(n), after),
        Err(_) => (Target::Current, rest),
    }
}

pub fn parse_date(word: &str, today: NaiveDate) -> Option<NaiveDate> {
    match word {
        "today" => Some(today),
        "tomorrow" => today.succ_opt(),
        _ => {
            if let Some(days) = word.strip_prefix('+') {
                let days: i64 = days.parse().ok()?;
                today.checked_add_signed(Duration::try_days(days)?)
            } else {
                NaiveDate::parse_from_str(word, "%Y-%m-%d").ok()
            }
        }
    }
}

fn due(word: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    parse_date(word, today).ok_or_else(|| format!("expected a due date (YYYY-MM-DD), got {:?}", word))
}

fn two_positions(rest: &str) -> Result<(usize, usize), String> {
    let (a, rest) = split_word(rest);
    let (b, _) = split_word(rest);
    Ok((position(a)?, position(b)?))
}

pub fn parse(line: &str, today: NaiveDate) -> Result<Input, String> {
    let (verb, rest) = split_word(line.trim());
    let command = match verb {
        "" => return Ok(Input::Empty),
        "ls" | "list" => return Ok(Input::List),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" | "q" => return Ok(Input::Quit),
        "new" => {
            if rest.is_empty() {
                return Err("usage: new <title>".into());
            }
            Command::New(rest.to_string())
        }
        "select" => Command::Select(position(split_word(rest).0)?),
        "expand" | "collapse" => Command::Expand(position(split_word(rest).0)?),
        "rm" => Command::Remove(position(split_word(rest).0)?),
        "add" => {
            let (section, rest) = target(rest);
            let (url, rest) = split_word(rest);
            if url.is_empty() {
                return Err("usage: add [n] <url> <due> [title]".into());
            }
            let (date, rest) = split_word(rest);
            let due_date = if date.is_empty() { None } else { Some(due(date, today)?) };
            let title = Some(rest.trim()).filter(|t| !t.is_empty()).map(str::to_string);
            Command::Add {
                section,
                url: url.to_string(),
                due_date,
                title,
            }
        }
        "bulk" => {
            let (section, rest) = target(rest);
            let (date, rest) = split_word(rest);
            if date.is_empty() {
                return Err("usage: bulk [n] <due> <url> [url...]".into());
            }
            let due_date = Some(due(date, today)?);
            let urls: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
            if urls.is_empty() {
                return Err("usage: bulk [n] <due> <url> [url...]".into());
            }
            Command::Bulk {
                section,
                due_date,
                urls,
            }
        }
        "done" => {
            let (section, task) = two_positions(rest)?;
            Command::Done { section, task }
        }
        "del" => {
            let (section, task) = two_positions(rest)?;
            Command::Delete { section, task }
        }
        "attach" => {
            let (section, rest) = target(rest);
            if rest.is_empty() {
                return Err("usage: attach [n] <file.pdf>".into());
            }
            Command::Attach {
                section,
                path: PathBuf::from(rest),
            }
        }
        "cancel" => Command::Cancel(target(rest).0),
        other => return Err(format!("unknown command {:?} (try help)", other)),
    };
    Ok(Input::Command(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn cmd(line: &str) -> Command {
        match parse(line, today()).unwrap() {
            Input::Command(c) => c,
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn control_inputs() {
        assert_eq!(parse("   ", today()).unwrap(), Input::Empty);
        assert_eq!(parse("ls", today()).unwrap(), Input::List);
        assert_eq!(parse("help", today()).unwrap(), Input::Help);
        assert_eq!(parse("quit", today()).unwrap(), Input::Quit);
    }

    #[test]
    fn new_keeps_spaces() {
        assert_eq!(cmd("new  Reading list "), Command::New("Reading list".into()));
        assert!(parse("new", today()).is_err());
    }

    #[test]
    fn add_with_position_date_and_title() {
        assert_eq!(
            cmd("add 2 https://a.example/ 2024-01-01 Example  A"),
            Command::Add {
                section: Target::Position(2),
                url: "https://a.example/".into(),
                due_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                title: Some("Example  A".into()),
            }
        );
    }

    #[test]
    fn add_defaults_to_current_section_and_no_date() {
        assert_eq!(
            cmd("add https://a.example/"),
            Command::Add {
                section: Target::Current,
                url: "https://a.example/".into(),
                due_date: None,
                title: None,
            }
        );
        assert!(parse("add 1 https://a.example/ someday", today()).is_err());
    }

    #[test]
    fn relative_dates() {
        assert_eq!(parse_date("today", today()), Some(today()));
        assert_eq!(parse_date("tomorrow", today()), NaiveDate::from_ymd_opt(2024, 1, 11));
        assert_eq!(parse_date("+30", today()), NaiveDate::from_ymd_opt(2024, 2, 9));
        assert_eq!(parse_date("+x", today()), None);
    }

    #[test]
    fn bulk_collects_urls() {
        assert_eq!(
            cmd("bulk 1 +1 https://a.example/ https://b.example/"),
            Command::Bulk {
                section: Target::Position(1),
                due_date: NaiveDate::from_ymd_opt(2024, 1, 11),
                urls: vec!["https://a.example/".into(), "https://b.example/".into()],
            }
        );
        assert!(parse("bulk 1 today", today()).is_err());
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(cmd("done 1 3"), Command::Done { section: 1, task: 3 });
        assert_eq!(cmd("del 2 1"), Command::Delete { section: 2, task: 1 });
        assert!(parse("done 0 1", today()).is_err());
        assert!(parse("rm x", today()).is_err());
    }

    #[test]
    fn attach_path_may_contain_spaces() {
        assert_eq!(
            cmd("attach 1 My Docs/summary.pdf"),
            Command::Attach {
                section: Target::Position(1),
                path: PathBuf::from("My Docs/summary.pdf"),
            }
        );
        assert_eq!(
            cmd("attach summary.pdf"),
            Command::Attach {
                section: Target::Current,
                path: PathBuf::from("summary.pdf"),
            }
        );
    }

    #[test]
    fn unknown_verb() {
        assert!(parse("frobnicate", today()).is_err());
    }
}
