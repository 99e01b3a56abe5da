//! Line-oriented commands typed during an interactive session.

use sdkforge_core::{CreateRequest, EndpointPatch, ExportFormat, Msg};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(Msg),
    /// Print the current endpoint set.
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown field `{0}`; expected method, path, summary or tags")]
    UnknownField(String),
    #[error("unknown export format `{0}`; expected json or yaml")]
    UnknownFormat(String),
}

pub const HELP: &[&str] = &[
    "new <name> <url> [--use-case <text>] [--force-refresh]",
    "                            process a documentation site",
    "open <job-id>               reopen a job from the history",
    "history                     refresh history and quota",
    "list                        show the current endpoints",
    "edit <id> | cancel          enter or leave edit mode",
    "set <id> <field> <value>    change method, path, summary or tags",
    "rm <id>                     remove an endpoint",
    "reset                       discard all edits",
    "preview [lang]              preview generated code",
    "generate [lang]             download the SDK archive",
    "export json|yaml            download the OpenAPI spec",
    "quit",
];

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str, default_language: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let Some((verb, rest)) = split_word(line) else {
        return Ok(None);
    };

    let command = match verb {
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        "list" | "ls" => Command::List,
        "history" | "refresh" => Command::Send(Msg::RefreshRequested),
        "reset" => Command::Send(Msg::EditsReset),
        "cancel" => Command::Send(Msg::EditCancelled),
        "new" => parse_new(rest)?,
        "open" => Command::Send(Msg::HistorySelected {
            job_id: single_arg(rest, "open <job-id>")?,
        }),
        "edit" => Command::Send(Msg::EditStarted {
            endpoint_id: single_arg(rest, "edit <endpoint-id>")?,
        }),
        "rm" | "remove" => Command::Send(Msg::EndpointRemoved {
            endpoint_id: single_arg(rest, "rm <endpoint-id>")?,
        }),
        "set" => parse_set(rest)?,
        "preview" => Command::Send(Msg::PreviewRequested {
            language: language_or(rest, default_language),
        }),
        "generate" | "gen" => Command::Send(Msg::GenerateRequested {
            language: language_or(rest, default_language),
        }),
        "export" => {
            let raw = single_arg(rest, "export json|yaml")?;
            let format = raw
                .parse::<ExportFormat>()
                .map_err(|_| CommandError::UnknownFormat(raw.clone()))?;
            Command::Send(Msg::ExportRequested { format })
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_new(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "new <name> <url> [--use-case <text>] [--force-refresh]";
    let mut words = rest.split_whitespace();
    let (Some(name), Some(url)) = (words.next(), words.next()) else {
        return Err(CommandError::Usage(USAGE));
    };
    let mut request = CreateRequest {
        name: name.to_string(),
        url: url.to_string(),
        ..CreateRequest::default()
    };

    let mut use_case: Option<Vec<&str>> = None;
    for word in words {
        match word {
            "--force-refresh" => {
                request.force_refresh = true;
                if use_case.as_ref().is_some_and(Vec::is_empty) {
                    return Err(CommandError::Usage(USAGE));
                }
            }
            "--use-case" => use_case = Some(Vec::new()),
            _ => match use_case.as_mut() {
                Some(text) => text.push(word),
                None => return Err(CommandError::Usage(USAGE)),
            },
        }
    }
    match use_case {
        Some(text) if text.is_empty() => return Err(CommandError::Usage(USAGE)),
        Some(text) => request.use_case = Some(text.join(" ")),
        None => {}
    }
    Ok(Command::Send(Msg::SubmitRequested(request)))
}

fn parse_set(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "set <endpoint-id> <method|path|summary|tags> <value>";
    let (endpoint_id, rest) = split_word(rest).ok_or(CommandError::Usage(USAGE))?;
    let (field, value) = split_word(rest).ok_or(CommandError::Usage(USAGE))?;
    let value = value.trim();

    let mut patch = EndpointPatch::default();
    match field {
        "method" if !value.is_empty() => patch.method = Some(value.to_ascii_uppercase()),
        "path" if !value.is_empty() => patch.path = Some(value.to_string()),
        "summary" => patch.summary = Some(value.to_string()),
        "tags" => {
            patch.tags = Some(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(ToOwned::to_owned)
                    .collect(),
            )
        }
        "method" | "path" => return Err(CommandError::Usage(USAGE)),
        other => return Err(CommandError::UnknownField(other.to_string())),
    }
    Ok(Command::Send(Msg::EndpointEdited {
        endpoint_id: endpoint_id.to_string(),
        patch,
    }))
}

fn split_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    Some(match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (input, ""),
    })
}

fn single_arg(rest: &str, usage: &'static str) -> Result<String, CommandError> {
    match split_word(rest) {
        Some((word, tail)) if tail.trim().is_empty() => Ok(word.to_string()),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn language_or(rest: &str, default_language: &str) -> String {
    split_word(rest)
        .map(|(word, _)| word.to_ascii_lowercase())
        .unwrap_or_else(|| default_language.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sdkforge_core::{EndpointPatch, ExportFormat, Msg};

    use super::{parse, Command, CommandError};

    fn send(line: &str) -> Msg {
        match parse(line, "python") {
            Ok(Some(Command::Send(msg))) => msg,
            other => panic!("`{line}` parsed to {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse("   ", "python"), Ok(None));
    }

    #[test]
    fn set_summary_keeps_the_whole_value() {
        assert_eq!(
            send("set list_pets summary List every pet in the store"),
            Msg::EndpointEdited {
                endpoint_id: "list_pets".into(),
                patch: EndpointPatch::summary("List every pet in the store"),
            }
        );
    }

    #[test]
    fn set_method_is_uppercased_and_tags_split() {
        match send("set e1 method post") {
            Msg::EndpointEdited { patch, .. } => assert_eq!(patch.method.as_deref(), Some("POST")),
            other => panic!("unexpected {other:?}"),
        }
        match send("set e1 tags pets, store,,") {
            Msg::EndpointEdited { patch, .. } => {
                assert_eq!(patch.tags, Some(vec!["pets".to_string(), "store".to_string()]))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn set_rejects_unknown_fields_and_empty_paths() {
        assert_eq!(
            parse("set e1 colour blue", "python"),
            Err(CommandError::UnknownField("colour".into()))
        );
        assert!(matches!(
            parse("set e1 path", "python"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn language_defaults_from_config() {
        assert_eq!(
            send("generate"),
            Msg::GenerateRequested {
                language: "python".into()
            }
        );
        assert_eq!(
            send("preview TypeScript"),
            Msg::PreviewRequested {
                language: "typescript".into()
            }
        );
    }

    #[test]
    fn export_formats() {
        assert_eq!(
            send("export yml"),
            Msg::ExportRequested {
                format: ExportFormat::Yaml
            }
        );
        assert_eq!(
            parse("export xml", "python"),
            Err(CommandError::UnknownFormat("xml".into()))
        );
    }

    #[test]
    fn new_requires_name_and_url() {
        match send("new Petstore https://petstore.example.com/docs") {
            Msg::SubmitRequested(request) => {
                assert_eq!(request.name, "Petstore");
                assert_eq!(request.url, "https://petstore.example.com/docs");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse("new Petstore", "python"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn new_accepts_use_case_and_force_refresh() {
        match send("new Petstore https://petstore.example.com/docs --use-case sync pet inventory --force-refresh") {
            Msg::SubmitRequested(request) => {
                assert_eq!(request.use_case.as_deref(), Some("sync pet inventory"));
                assert!(request.force_refresh);
            }
            other => panic!("unexpected {other:?}"),
        }
        match send("new Petstore https://petstore.example.com/docs") {
            Msg::SubmitRequested(request) => {
                assert_eq!(request.use_case, None);
                assert!(!request.force_refresh);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse("new Petstore https://x.example --use-case", "python"),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            parse("new Petstore https://x.example stray", "python"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn local_commands_and_unknown_verbs() {
        assert_eq!(parse("quit", "python"), Ok(Some(Command::Quit)));
        assert_eq!(parse("list", "python"), Ok(Some(Command::List)));
        assert_eq!(
            parse("frobnicate", "python"),
            Err(CommandError::Unknown("frobnicate".into()))
        );
        assert!(matches!(parse("rm a b", "python"), Err(CommandError::Usage(_))));
    }
}
