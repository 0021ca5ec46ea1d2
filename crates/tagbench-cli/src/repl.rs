//! Interactive annotation loop
//!
//! Reads one command per line from stdin while background page loads and
//! custom-sentence inserts report back in between.

use std::fmt::Write as _;
use std::path::PathBuf;
use tagbench_core::{AnnotationSession, SessionError, SessionNotice};
use tokio::io::{AsyncBufReadExt, BufReader};

pub(crate) const HELP: &str = "\
commands:
  show                       redisplay the active sentence
  select N                   select token N
  category NAME              choose a category (no NAME clears it)
  type CODE                  choose a tag type within the category
  assign                     tag the selected token with the chosen type
  tag N CATEGORY CODE        select, choose and assign in one step
  save                       record the sentence and move to the next one
  skip                       move to the next sentence without saving
  add TEXT                   append a custom sentence and store it remotely
  reload                     reload the corpus from the start
  ledger                     list saved sentences
  export [PATH]              write saved sentences to PATH
  help                       show this text
  quit                       leave the workbench";

/// One parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Show,
    Select(usize),
    Category(String),
    ClearCategory,
    Type(String),
    Assign,
    Tag {
        index: usize,
        category: String,
        code: String,
    },
    Save,
    Skip,
    Add(String),
    Reload,
    Ledger,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a token index")]
    InvalidIndex(String),

    #[error("'{0}' takes no further arguments")]
    TrailingArguments(&'static str),
}

fn index(raw: &str) -> Result<usize, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidIndex(raw.to_string()))
}

fn no_more(command: &'static str, rest: &[&str], parsed: ReplCommand) -> Result<ReplCommand, ParseError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(ParseError::TrailingArguments(command))
    }
}

/// Parse one input line
pub(crate) fn parse_command(line: &str) -> Result<ReplCommand, ParseError> {
    let line = line.trim();
    let (head, tail) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let tail = tail.trim();
    let args: Vec<&str> = tail.split_whitespace().collect();

    match head {
        "" => Err(ParseError::Empty),
        "show" => no_more("show", &args, ReplCommand::Show),
        "select" => match args.as_slice() {
            [n] => Ok(ReplCommand::Select(index(n)?)),
            [] => Err(ParseError::MissingArgument {
                command: "select",
                argument: "a token index",
            }),
            _ => Err(ParseError::TrailingArguments("select")),
        },
        "category" => match args.as_slice() {
            [] => Ok(ReplCommand::ClearCategory),
            [name] => Ok(ReplCommand::Category((*name).to_string())),
            _ => Err(ParseError::TrailingArguments("category")),
        },
        "type" => match args.as_slice() {
            [code] => Ok(ReplCommand::Type((*code).to_string())),
            [] => Err(ParseError::MissingArgument {
                command: "type",
                argument: "a tag code",
            }),
            _ => Err(ParseError::TrailingArguments("type")),
        },
        "assign" => no_more("assign", &args, ReplCommand::Assign),
        "tag" => match args.as_slice() {
            [n, category, code] => Ok(ReplCommand::Tag {
                index: index(n)?,
                category: (*category).to_string(),
                code: (*code).to_string(),
            }),
            [_, _, _, ..] => Err(ParseError::TrailingArguments("tag")),
            _ => Err(ParseError::MissingArgument {
                command: "tag",
                argument: "N CATEGORY CODE",
            }),
        },
        "save" => no_more("save", &args, ReplCommand::Save),
        "skip" => no_more("skip", &args, ReplCommand::Skip),
        "add" if tail.is_empty() => Err(ParseError::MissingArgument {
            command: "add",
            argument: "sentence text",
        }),
        "add" => Ok(ReplCommand::Add(tail.to_string())),
        "reload" => no_more("reload", &args, ReplCommand::Reload),
        "ledger" => no_more("ledger", &args, ReplCommand::Ledger),
        "export" if tail.is_empty() => Ok(ReplCommand::Export(None)),
        "export" => Ok(ReplCommand::Export(Some(PathBuf::from(tail)))),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// Active sentence with progress, token indices, tags and the current choice
pub(crate) fn render(session: &AnnotationSession) -> String {
    let annotator = session.annotator();
    let mut out = session.progress().to_string();

    if session.active_sentence().is_none() {
        out.push('\n');
        out.push_str(if session.is_loading() {
            "loading sentences..."
        } else {
            "no more sentences; use 'reload' or 'add TEXT'"
        });
        return out;
    }

    let tokens: Vec<String> = annotator
        .tokens()
        .iter()
        .zip(annotator.tags())
        .enumerate()
        .map(|(i, (token, tag))| {
            let cell = match tag {
                Some(tag) => format!("{i}:{token}/{tag}"),
                None => format!("{i}:{token}"),
            };
            if annotator.selected() == Some(i) {
                format!("[{cell}]")
            } else {
                cell
            }
        })
        .collect();
    let _ = write!(out, "\n{}", tokens.join(" "));

    match annotator.category() {
        None => {
            let categories: Vec<&str> = annotator.taxonomy().categories().collect();
            let _ = write!(out, "\ncategories: {}", categories.join(" "));
        }
        Some(category) => {
            let types: Vec<&str> = annotator.available_types().iter().map(|t| t.as_str()).collect();
            let chosen = annotator.tag_type().map_or("-", |t| t.as_str());
            let _ = write!(out, "\n{category}: {} | type: {chosen}", types.join(" "));
        }
    }
    out
}

fn render_ledger(session: &AnnotationSession) -> String {
    if session.ledger().is_empty() {
        return "no sentences saved yet".to_string();
    }
    session
        .ledger()
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}", i + 1, entry.tagged()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run one command against the session and describe the result
///
/// `Quit` is handled by the caller.
pub(crate) fn execute(session: &mut AnnotationSession, command: ReplCommand) -> Result<String, SessionError> {
    let message = match command {
        ReplCommand::Show | ReplCommand::Quit => render(session),
        ReplCommand::Select(index) => {
            session.select_token(index)?;
            render(session)
        }
        ReplCommand::Category(name) => {
            session.choose_category(&name)?;
            render(session)
        }
        ReplCommand::ClearCategory => {
            session.clear_category();
            render(session)
        }
        ReplCommand::Type(code) => {
            session.choose_type(&code)?;
            render(session)
        }
        ReplCommand::Assign => {
            session.assign()?;
            render(session)
        }
        ReplCommand::Tag { index, category, code } => {
            session.tag(index, &category, &code)?;
            render(session)
        }
        ReplCommand::Save => {
            let saved = session.save()?;
            format!("saved: {}\n{}", saved.tagged(), render(session))
        }
        ReplCommand::Skip => {
            session.skip()?;
            render(session)
        }
        ReplCommand::Add(text) => {
            let index = session.add_custom(&text)?;
            format!("added as sentence {}", index + 1)
        }
        ReplCommand::Reload => {
            session.reload();
            "reloading corpus...".to_string()
        }
        ReplCommand::Ledger => render_ledger(session),
        ReplCommand::Export(path) => {
            let path = path.unwrap_or_else(|| session.config().export_file.clone());
            match session.write_export(&path)? {
                Some(count) => format!("wrote {count} sentences to {}", path.display()),
                None => "nothing to export yet".to_string(),
            }
        }
        ReplCommand::Help => HELP.to_string(),
    };
    Ok(message)
}

fn show_notice(session: &AnnotationSession, notice: &SessionNotice) {
    println!("* {notice}");
    if matches!(notice, SessionNotice::PageLoaded { append: false, .. }) {
        println!("{}", render(session));
    }
}

/// Drive the session from stdin until `quit` or end of input
///
/// # Errors
/// Reading stdin failed, or the session hit an unrecoverable error.
pub(crate) async fn run(mut session: AnnotationSession) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", render(&session));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(ReplCommand::Quit) => break,
                    Ok(command) => match execute(&mut session, command) {
                        Ok(message) => println!("{message}"),
                        Err(err) if err.is_recoverable() => println!("error: {err}"),
                        Err(err) => return Err(err.into()),
                    },
                    Err(ParseError::Empty) => {}
                    Err(err) => println!("error: {err}"),
                }
            }
            Some(notice) = session.next_notice() => show_notice(&session, &notice),
        }
    }

    for notice in session.settle().await {
        show_notice(&session, &notice);
    }
    if !session.ledger().is_empty() {
        tracing::info!(saved = session.ledger().len(), "session ended");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagbench_core::TagbenchConfig;
    use tagbench_test_utils::{InMemoryCorpus, EXAMPLE_PLAN, EXAMPLE_SENTENCE};

    #[test]
    fn parses_every_command() {
        let cases = [
            ("show", ReplCommand::Show),
            ("  select 2 ", ReplCommand::Select(2)),
            ("category Noun", ReplCommand::Category("Noun".into())),
            ("category", ReplCommand::ClearCategory),
            ("type N_NP", ReplCommand::Type("N_NP".into())),
            ("assign", ReplCommand::Assign),
            (
                "tag 1 Verb V_VM",
                ReplCommand::Tag {
                    index: 1,
                    category: "Verb".into(),
                    code: "V_VM".into(),
                },
            ),
            ("save", ReplCommand::Save),
            ("skip", ReplCommand::Skip),
            ("add मेरा  घर।", ReplCommand::Add("मेरा  घर।".into())),
            ("reload", ReplCommand::Reload),
            ("ledger", ReplCommand::Ledger),
            ("export", ReplCommand::Export(None)),
            ("export out/tags.txt", ReplCommand::Export(Some(PathBuf::from("out/tags.txt")))),
            ("help", ReplCommand::Help),
            ("quit", ReplCommand::Quit),
        ];
        for (line, expected) in cases {
            assert_eq!(parse_command(line), Ok(expected), "{line}");
        }
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
        assert_eq!(parse_command("frobnicate"), Err(ParseError::Unknown("frobnicate".into())));
        assert_eq!(parse_command("select x"), Err(ParseError::InvalidIndex("x".into())));
        assert_eq!(parse_command("save now"), Err(ParseError::TrailingArguments("save")));
        assert!(matches!(
            parse_command("tag 1 Verb"),
            Err(ParseError::MissingArgument { command: "tag", .. })
        ));
        assert!(matches!(
            parse_command("add   "),
            Err(ParseError::MissingArgument { command: "add", .. })
        ));
    }

    async fn session_with(sentences: Vec<String>) -> AnnotationSession {
        let gateway = InMemoryCorpus::new(sentences);
        let mut session = AnnotationSession::new(TagbenchConfig::default(), gateway).unwrap();
        session.start().await.unwrap();
        session
    }

    #[tokio::test]
    async fn render_marks_selection_and_tags() {
        let mut session = session_with(vec![EXAMPLE_SENTENCE.to_string()]).await;
        execute(&mut session, ReplCommand::Tag {
            index: 0,
            category: "Noun".into(),
            code: "N_NP".into(),
        })
        .unwrap();
        execute(&mut session, ReplCommand::Select(1)).unwrap();
        let shown = execute(&mut session, ReplCommand::Category("Postposition".into())).unwrap();

        assert_eq!(
            shown,
            "Sentence 1 / 1 | Words: 1/4 | Saved: 0\n\
             0:राम/N_NP [1:घर] 2:गया 3:।\n\
             Postposition: PP_PP | type: -"
        );
    }

    #[tokio::test]
    async fn save_reports_tagged_line_and_ledger_lists_it() {
        let mut session = session_with(vec![EXAMPLE_SENTENCE.to_string()]).await;
        for (index, (category, code)) in EXAMPLE_PLAN.iter().enumerate() {
            execute(&mut session, ReplCommand::Tag {
                index,
                category: (*category).to_string(),
                code: (*code).to_string(),
            })
            .unwrap();
        }

        let saved = execute(&mut session, ReplCommand::Save).unwrap();
        assert!(saved.starts_with("saved: राम/N_NP घर/PP_PP गया/V_VM ।/PU_PU\n"), "{saved}");
        assert_eq!(
            execute(&mut session, ReplCommand::Ledger).unwrap(),
            "1. राम/N_NP घर/PP_PP गया/V_VM ।/PU_PU"
        );
        session.settle().await;
    }

    #[tokio::test]
    async fn rejected_command_is_recoverable() {
        let mut session = session_with(vec![EXAMPLE_SENTENCE.to_string()]).await;
        let err = execute(&mut session, ReplCommand::Type("N_NP".into())).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(
            execute(&mut session, ReplCommand::Export(None)).unwrap(),
            "nothing to export yet"
        );
    }
}
