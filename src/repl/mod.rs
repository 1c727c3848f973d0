use chrono::NaiveDate;
use rustyline::error::ReadlineError;
use rustyline::{history::MemHistory, Editor};
use snafu::{OptionExt as _, ResultExt as _, Snafu};

use crate::auth::{Accounts, AuthError, RememberedLogin};
use crate::config::Config;
use crate::model::{Category, ChannelStats, Priority, Task, Theme};
use crate::runner::{RunnerError, SimulationTask, StagedOutcome};
use crate::session::{GrowthReport, Session, SessionError};
use crate::validate::{Registration, SimulationHours};

mod parse;

pub use parse::{parse, ParseError};

const HELP: &str = "\
commands:
  register                      create an account and log in
  login                         log in to an existing account
  logout                        end the current session
  stats                         show the channel statistics
  quick                         simulate one hour of growth
  simulate <hours>              staged simulation of 1 to 72 hours (Ctrl-C cancels)
  generate <category> [keyword] generate a video title, description and hashtags
  history [count]               recent simulations
  content [count]               recently generated content
  task add <YYYY-MM-DD> <high|medium|low> <title> [| description]
  tasks [all]                   list open (or all) tasks
  done <n> / undo <n>           mark task n from the last listing as done or open
  settings [name on|off]        show or change remember, fullscreen, autosave
  theme <dark|light>            change the theme
  tips                          growth recommendations
  exit                          leave";

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Action {
    Register,
    Login,
    Logout,
    Stats,
    Quick,
    Simulate {
        hours: SimulationHours,
    },
    Generate {
        category: Category,
        keyword: Option<String>,
    },
    History {
        limit: usize,
    },
    Content {
        limit: usize,
    },
    AddTask {
        title: String,
        description: Option<String>,
        due_date: NaiveDate,
        priority: Priority,
    },
    Tasks {
        all: bool,
    },
    Done {
        index: usize,
    },
    Undo {
        index: usize,
    },
    Settings,
    Toggle {
        toggle: Toggle,
        enabled: bool,
    },
    Theme {
        theme: Theme,
    },
    Tips,
    Help,
    Exit,
    None,
}

/// Boolean settings that can be switched from the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    RememberLogin,
    AutoFullscreen,
    AutoSave,
}

#[derive(Debug, Snafu)]
pub enum ReplError {
    #[snafu(display("failed to read from the terminal: {}", source))]
    Rustyline { source: ReadlineError },

    #[snafu(transparent)]
    Parse { source: ParseError },

    #[snafu(transparent)]
    Auth { source: AuthError },

    #[snafu(transparent)]
    Session { source: SessionError },

    #[snafu(transparent)]
    Runner { source: RunnerError },

    #[snafu(display("the simulation stopped unexpectedly and the session was closed, log in again: {source}"))]
    SessionLost { source: RunnerError },

    #[snafu(display("you are not logged in, use 'login' or 'register' first"))]
    NotLoggedIn,

    #[snafu(display("already logged in as '{login}', use 'logout' first"))]
    AlreadyLoggedIn { login: String },

    #[snafu(display("there is no task number {index}, list them with 'tasks all'"))]
    NoSuchTask { index: usize },
}

enum Flow {
    Continue,
    Exit,
}

/// Line-oriented terminal front end.
pub struct Shell {
    config: Config,
    accounts: Accounts,
    session: Option<Session>,
    editor: Editor<(), MemHistory>,
    listed_tasks: Vec<Task>,
}

impl Shell {
    pub fn new(config: Config, accounts: Accounts) -> Result<Self, ReplError> {
        let editor = Editor::with_history(rustyline::Config::default(), MemHistory::new())
            .context(RustylineSnafu)?;

        let shell = Self {
            config,
            accounts,
            session: None,
            editor,
            listed_tasks: Vec::new(),
        };
        Ok(shell)
    }

    pub async fn run(&mut self) -> Result<(), ReplError> {
        tracing::info!("starting shell");
        println!("channel-growth: type 'help' for a list of commands");

        loop {
            let prompt = match &self.session {
                Some(session) => format!("{}> ", session.account().login),
                None => "channel-growth> ".to_string(),
            };

            let Some(line) = self.read_line(&prompt)? else {
                self.handle(Action::Exit).await?;
                break;
            };
            self.editor.add_history_entry(line.as_str()).ok();

            let outcome = match parse(&line) {
                Ok(action) => self.handle(action).await,
                Err(error) => Err(error.into()),
            };

            match outcome {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => {}
                Err(error @ ReplError::Rustyline { .. }) => return Err(error),
                Err(error) => {
                    tracing::debug!(%error, "command failed");
                    println!("error: {error}");
                }
            }
        }

        Ok(())
    }

    /// Reads one line. End of input and Ctrl-C at the prompt both read as `None`.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ReplError> {
        let line = tokio::task::block_in_place(|| self.editor.readline(prompt));
        match line {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(source) => Err(source).context(RustylineSnafu),
        }
    }

    /// Prompts for a form field. These answers stay out of the history.
    fn ask(&mut self, prompt: &str) -> Result<String, ReplError> {
        let line = self.read_line(prompt)?.unwrap_or_default();
        Ok(line.trim().to_string())
    }

    fn session(&mut self) -> Result<&mut Session, ReplError> {
        self.session.as_mut().context(NotLoggedInSnafu)
    }

    fn ensure_logged_out(&self) -> Result<(), ReplError> {
        match &self.session {
            Some(session) => AlreadyLoggedInSnafu {
                login: session.account().login.clone(),
            }
            .fail(),
            None => Ok(()),
        }
    }

    async fn handle(&mut self, action: Action) -> Result<Flow, ReplError> {
        match action {
            Action::None => {}
            Action::Help => println!("{HELP}"),
            Action::Exit => {
                if let Some(session) = self.session.take() {
                    self.accounts.logout(session)?;
                }
                println!("bye");
                return Ok(Flow::Exit);
            }

            Action::Register => self.register().await?,
            Action::Login => self.login().await?,
            Action::Logout => {
                let session = self.session.take().context(NotLoggedInSnafu)?;
                self.listed_tasks.clear();
                self.accounts.logout(session)?;
                println!("logged out");
            }

            Action::Stats => {
                let session = self.session()?;
                print_stats(session.stats());
            }
            Action::Quick => {
                let report = self.session()?.quick_simulation().await?;
                print_report(&report);
            }
            Action::Simulate { hours } => self.simulate(hours).await?,
            Action::Generate { category, keyword } => {
                let bundle = self
                    .session()?
                    .generate_content(&category, keyword.as_deref())
                    .await?;
                println!("{}", bundle.full_description);
            }

            Action::History { limit } => {
                let history = self.session()?.simulation_history(limit).await?;
                if history.is_empty() {
                    println!("no simulations yet");
                }
                for record in history {
                    println!(
                        "{}  {:>6.2}h  +{} subscribers  +{} views  +{} likes  +{} comments  +{} shares",
                        record.created_at,
                        record.hours,
                        record.delta.subscribers,
                        record.delta.views,
                        record.delta.likes,
                        record.delta.comments,
                        record.delta.shares
                    );
                }
            }
            Action::Content { limit } => {
                let content = self.session()?.content_history(limit).await?;
                if content.is_empty() {
                    println!("no content yet");
                }
                for record in content {
                    println!(
                        "{}  [{}] {} (keyword: {})",
                        record.created_at, record.category, record.title, record.keyword
                    );
                }
            }

            Action::AddTask {
                title,
                description,
                due_date,
                priority,
            } => {
                let task = self
                    .session()?
                    .create_task(&title, description.as_deref(), due_date, priority)
                    .await?;
                println!("added '{}' due {} ({} priority)", task.title, task.due_date, task.priority);
            }
            Action::Tasks { all } => {
                let tasks = self.session()?.list_tasks(all).await?;
                if tasks.is_empty() {
                    println!("no tasks");
                }
                for (index, task) in tasks.iter().enumerate() {
                    let mark = if task.completed { "x" } else { " " };
                    println!(
                        "{:>3}. [{mark}] {}  due {}  {} priority{}",
                        index + 1,
                        task.title,
                        task.due_date,
                        task.priority,
                        task.description
                            .as_deref()
                            .map(|description| format!("  ({description})"))
                            .unwrap_or_default()
                    );
                }
                self.listed_tasks = tasks;
            }
            Action::Done { index } => self.set_completed(index, true).await?,
            Action::Undo { index } => self.set_completed(index, false).await?,

            Action::Settings => {
                let settings = self.session()?.settings();
                println!("remember login   {}", on_off(settings.remember_login));
                println!("auto fullscreen  {}", on_off(settings.auto_fullscreen));
                println!("auto save        {}", on_off(settings.auto_save));
                println!("theme            {}", settings.theme);
            }
            Action::Toggle { toggle, enabled } => {
                let session = self.session()?;
                let mut settings = session.settings().clone();
                match toggle {
                    Toggle::RememberLogin => settings.remember_login = enabled,
                    Toggle::AutoFullscreen => settings.auto_fullscreen = enabled,
                    Toggle::AutoSave => settings.auto_save = enabled,
                }
                session.update_settings(settings).await?;

                if toggle == Toggle::RememberLogin {
                    self.remember();
                }
                println!("saved");
            }
            Action::Theme { theme } => {
                let session = self.session()?;
                let mut settings = session.settings().clone();
                settings.theme = theme;
                session.update_settings(settings).await?;
                println!("theme set to {theme}");
            }
            Action::Tips => {
                for tip in self.session()?.recommendations() {
                    println!("- {tip}");
                }
            }
        }

        Ok(Flow::Continue)
    }

    async fn register(&mut self) -> Result<(), ReplError> {
        self.ensure_logged_out()?;

        let registration = Registration {
            login: self.ask("login: ")?,
            password: self.ask("password: ")?,
            confirm_password: self.ask("confirm password: ")?,
        };

        let session = self.accounts.register(&registration).await?;
        println!("welcome, {}!", session.account().login);
        self.session = Some(session);
        self.remember();
        Ok(())
    }

    async fn login(&mut self) -> Result<(), ReplError> {
        self.ensure_logged_out()?;

        let remembered = match RememberedLogin::load(&self.config.remember_file) {
            Ok(remembered) => remembered.map(|remembered| remembered.login),
            Err(error) => {
                tracing::warn!(%error, "ignoring the remembered login");
                None
            }
        };

        let prompt = match &remembered {
            Some(login) => format!("login [{login}]: "),
            None => "login: ".to_string(),
        };
        let mut login = self.ask(&prompt)?;
        if login.is_empty() {
            login = remembered.unwrap_or_default();
        }
        let password = self.ask("password: ")?;

        let session = self.accounts.login(&login, &password).await?;
        println!(
            "welcome back, {} (session #{})",
            session.account().login,
            session.account().total_sessions
        );
        self.session = Some(session);
        self.remember();
        Ok(())
    }

    /// Failing to write the remembered login does not affect the session.
    fn remember(&self) {
        let Some(session) = &self.session else {
            return;
        };

        if let Err(error) = self.accounts.remember(&self.config.remember_file, session) {
            tracing::warn!(%error, "cannot update the remembered login");
        }
    }

    async fn simulate(&mut self, hours: SimulationHours) -> Result<(), ReplError> {
        let session = self.session.take().context(NotLoggedInSnafu)?;
        let mut task = SimulationTask::spawn(session, hours, self.config.stage_delay);
        let cancel = task.canceller();

        println!("simulating {hours} of growth, press Ctrl-C to stop");
        loop {
            tokio::select! {
                progress = task.progress.recv() => match progress {
                    Some(progress) => println!(
                        "[{}/{}] {}... {} subscribers, {} views",
                        progress.current,
                        progress.total,
                        progress.stage,
                        progress.stats.subscribers,
                        progress.stats.total_views
                    ),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    cancel.cancel();
                    println!("stopping after the current stage");
                }
            }
        }

        let outcome = take_back(&mut self.session, task.join().await)?;

        if outcome.cancelled {
            println!("cancelled after {} of 8 stages", outcome.stages_run);
        }
        if outcome.first_run {
            println!("congratulations on your first simulation!");
        }
        println!(
            "+{} subscribers  +{} views  +{} likes  +{} comments  +{} shares",
            outcome.delta.subscribers,
            outcome.delta.views,
            outcome.delta.likes,
            outcome.delta.comments,
            outcome.delta.shares
        );
        print_stats(&outcome.stats);
        Ok(())
    }

    async fn set_completed(&mut self, index: usize, completed: bool) -> Result<(), ReplError> {
        if self.listed_tasks.is_empty() {
            self.listed_tasks = self.session()?.list_tasks(true).await?;
        }

        let task = index
            .checked_sub(1)
            .and_then(|position| self.listed_tasks.get(position))
            .map(|task| task.id.clone())
            .context(NoSuchTaskSnafu { index })?;

        let updated = self.session()?.set_task_completed(&task, completed).await?;
        match updated {
            Some(task) => {
                let state = if task.completed { "done" } else { "open" };
                println!("'{}' is {state}", task.title);
                if let Some(listed) = self.listed_tasks.iter_mut().find(|listed| listed.id == task.id) {
                    *listed = task;
                }
            }
            None => return NoSuchTaskSnafu { index }.fail(),
        }
        Ok(())
    }
}

/// Puts the session handed back by a finished simulation task into `slot`.
///
/// A task that panicked or was aborted takes its session with it, so the shell is left logged out.
fn take_back(
    slot: &mut Option<Session>,
    joined: Result<(Session, Result<StagedOutcome, RunnerError>), RunnerError>,
) -> Result<StagedOutcome, ReplError> {
    match joined {
        Ok((session, outcome)) => {
            *slot = Some(session);
            Ok(outcome?)
        }
        Err(source) => {
            tracing::error!(error = %source, "simulation task lost its session");
            *slot = None;
            Err(ReplError::SessionLost { source })
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn print_report(report: &GrowthReport) {
    if report.first_run {
        println!("congratulations on your first simulation!");
    }
    println!(
        "+{} subscribers  +{} views  +{} likes  +{} comments  +{} shares",
        report.delta.subscribers,
        report.delta.views,
        report.delta.likes,
        report.delta.comments,
        report.delta.shares
    );
    print_stats(&report.stats);
}

fn print_stats(stats: &ChannelStats) {
    println!("subscribers       {}", stats.subscribers);
    println!("total views       {}", stats.total_views);
    println!("total likes       {}", stats.total_likes);
    println!("total comments    {}", stats.total_comments);
    println!("videos uploaded   {}", stats.videos_uploaded);
    println!("engagement        {:.2}%", stats.engagement_rate);
    println!("watch time        {:.1}h", stats.watch_time_hours);
    println!("est. earnings     ${:.2}", stats.estimated_earnings);
}
