use std::str::FromStr;

use chrono::NaiveDate;
use chumsky::{error::SimpleReason, prelude::*, text::whitespace};
use itertools::Itertools as _;
use snafu::Snafu;

use super::{Action, Toggle};
use crate::model::{Category, Priority, Theme};
use crate::validate::SimulationHours;

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Snafu)]
#[snafu(display("cannot parse '{input}': {}, type 'help' for a list of commands", self.combine_errors("; ")))]
pub struct ParseError {
    input: String,
    errors: Vec<Simple<char>>,
}

impl ParseError {
    fn combine_errors(&self, separator: &str) -> String {
        self.errors
            .iter()
            .map(|err| match err.reason() {
                SimpleReason::Custom(msg) => msg.clone(),
                SimpleReason::Unexpected => format!("{} (column {})", err, err.span().start + 1),
                SimpleReason::Unclosed { span, delimiter } => {
                    format!("unclosed delimiter {} at column {}", delimiter, span.start + 1)
                }
            })
            .join(separator)
    }
}

pub fn parse(input: &str) -> Result<Action, ParseError> {
    let input = input.trim();
    let action = program().parse(input).map_err(|errors| ParseError {
        input: input.to_string(),
        errors,
    })?;

    Ok(action)
}

fn program() -> impl Parser<char, Action, Error = Simple<char>> {
    choice((
        end().to(Action::None),
        action_simulate(),
        action_generate(),
        action_listing(),
        action_add_task(),
        action_tasks(),
        action_mark_task(),
        action_settings(),
        action_theme(),
        action_simple(),
    ))
    .then_ignore(end())
}

fn action_simple() -> impl Parser<char, Action, Error = Simple<char>> {
    choice((
        just("register").to(Action::Register),
        just("login").to(Action::Login),
        just("logout").to(Action::Logout),
        just("stats").to(Action::Stats),
        just("quick").to(Action::Quick),
        just("tips").to(Action::Tips),
        just("help").to(Action::Help),
        just("exit").to(Action::Exit),
        just("quit").to(Action::Exit),
    ))
}

fn action_simulate() -> impl Parser<char, Action, Error = Simple<char>> {
    just("simulate")
        .ignore_then(separator())
        .ignore_then(hours())
        .map(|hours| Action::Simulate { hours })
}

fn action_generate() -> impl Parser<char, Action, Error = Simple<char>> {
    just("generate")
        .ignore_then(separator())
        .ignore_then(word())
        .then(separator().ignore_then(rest()).or_not())
        .map(|(category, keyword)| Action::Generate {
            category: Category::parse(&category),
            keyword: keyword
                .map(|keyword| keyword.trim().to_string())
                .filter(|keyword| !keyword.is_empty()),
        })
}

fn action_listing() -> impl Parser<char, Action, Error = Simple<char>> {
    let history = just("history")
        .ignore_then(limit())
        .map(|limit| Action::History { limit });
    let content = just("content")
        .ignore_then(limit())
        .map(|limit| Action::Content { limit });

    history.or(content)
}

fn action_add_task() -> impl Parser<char, Action, Error = Simple<char>> {
    just("task")
        .ignore_then(separator())
        .ignore_then(just("add"))
        .ignore_then(separator())
        .ignore_then(due_date())
        .then_ignore(separator())
        .then(priority())
        .then_ignore(separator())
        .then(task_text())
        .map(|((due_date, priority), (title, description))| Action::AddTask {
            title,
            description,
            due_date,
            priority,
        })
}

fn action_tasks() -> impl Parser<char, Action, Error = Simple<char>> {
    just("tasks")
        .ignore_then(separator().ignore_then(just("all")).or_not())
        .map(|all| Action::Tasks { all: all.is_some() })
}

fn action_mark_task() -> impl Parser<char, Action, Error = Simple<char>> {
    choice((just("done").to(true), just("undo").to(false)))
        .then_ignore(separator())
        .then(number::<usize>())
        .map(|(completed, index)| {
            if completed {
                Action::Done { index }
            } else {
                Action::Undo { index }
            }
        })
}

fn action_settings() -> impl Parser<char, Action, Error = Simple<char>> {
    just("settings")
        .ignore_then(
            separator()
                .ignore_then(toggle())
                .then_ignore(separator())
                .then(switch())
                .or_not(),
        )
        .map(|change| match change {
            Some((toggle, enabled)) => Action::Toggle { toggle, enabled },
            None => Action::Settings,
        })
}

fn action_theme() -> impl Parser<char, Action, Error = Simple<char>> {
    just("theme")
        .ignore_then(separator())
        .ignore_then(theme())
        .map(|theme| Action::Theme { theme })
}

fn separator() -> impl Parser<char, (), Error = Simple<char>> {
    whitespace().at_least(1).ignored()
}

/// A run of non-whitespace characters.
fn word() -> impl Parser<char, String, Error = Simple<char>> {
    filter(|c: &char| !c.is_whitespace())
        .repeated()
        .at_least(1)
        .collect::<String>()
}

/// Everything up to the end of the line.
fn rest() -> impl Parser<char, String, Error = Simple<char>> {
    take_until(end()).map(|(chars, _)| chars.into_iter().collect::<String>())
}

fn number<T: FromStr>() -> impl Parser<char, T, Error = Simple<char>> {
    word().try_map(|word, span| {
        word.parse()
            .map_err(|_| Simple::custom(span, format!("'{word}' is not a whole number")))
    })
}

fn hours() -> impl Parser<char, SimulationHours, Error = Simple<char>> {
    word().try_map(|word, span| {
        let hours = word
            .parse()
            .map_err(|_| Simple::custom(span.clone(), format!("'{word}' is not a whole number")))?;
        SimulationHours::new(hours).map_err(|source| Simple::custom(span, source))
    })
}

fn theme() -> impl Parser<char, Theme, Error = Simple<char>> {
    word().try_map(|word, span| word.parse().map_err(|msg: String| Simple::custom(span, msg)))
}

fn limit() -> impl Parser<char, usize, Error = Simple<char>> {
    separator()
        .ignore_then(number())
        .or_not()
        .map(|limit| limit.unwrap_or(DEFAULT_LIMIT))
}

fn due_date() -> impl Parser<char, NaiveDate, Error = Simple<char>> {
    word().try_map(|word, span| {
        NaiveDate::parse_from_str(&word, "%Y-%m-%d")
            .map_err(|_| Simple::custom(span, format!("'{word}' is not a date, expected YYYY-MM-DD")))
    })
}

fn priority() -> impl Parser<char, Priority, Error = Simple<char>> {
    word().try_map(|word, span| {
        let priority = match word.to_ascii_lowercase().as_str() {
            "high" | "h" => Some(Priority::High),
            "medium" | "m" => Some(Priority::Medium),
            "low" | "l" => Some(Priority::Low),
            other => other.parse().ok().and_then(Priority::from_ordinal),
        };
        priority.ok_or_else(|| {
            Simple::custom(span, format!("'{word}' is not a priority, expected high, medium or low"))
        })
    })
}

/// `title [| description]`; the description is dropped when blank.
fn task_text() -> impl Parser<char, (String, Option<String>), Error = Simple<char>> {
    rest().try_map(|text, span| {
        let (title, description) = match text.split_once('|') {
            Some((title, description)) => (title.trim(), Some(description.trim())),
            None => (text.trim(), None),
        };
        if title.is_empty() {
            return Err(Simple::custom(span, "a task needs a title"));
        }

        let description = description
            .filter(|description| !description.is_empty())
            .map(str::to_string);
        Ok((title.to_string(), description))
    })
}

fn toggle() -> impl Parser<char, Toggle, Error = Simple<char>> {
    word().try_map(|word, span| match word.to_ascii_lowercase().as_str() {
        "remember" => Ok(Toggle::RememberLogin),
        "fullscreen" => Ok(Toggle::AutoFullscreen),
        "autosave" => Ok(Toggle::AutoSave),
        _ => Err(Simple::custom(
            span,
            format!("'{word}' is not a setting, expected remember, fullscreen or autosave"),
        )),
    })
}

fn switch() -> impl Parser<char, bool, Error = Simple<char>> {
    word().try_map(|word, span| match word.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        _ => Err(Simple::custom(span, format!("'{word}' is not on or off"))),
    })
}
