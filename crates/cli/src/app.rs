//! The interactive interview loop.

use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval_at, Instant, Interval};
use tracing::debug;

use acemock_core::events::StageEvent;
use acemock_core::feedback::StageFeedback;
use acemock_core::profile::{self, ProfileKind, SelectionProfile};
use acemock_core::stage::Stage;
use acemock_interview::{
    AptitudeStage, CodingStage, HRStage, InterviewController, StageError, StageSignal,
    TechnicalQAStage,
};

use crate::terminal::{InputLines, Terminal};

/// How a step of the loop ended.
enum Flow<T> {
    Next(T),
    Restart,
    Quit,
}

/// Propagate `Restart` / `Quit` out of the enclosing function.
macro_rules! step {
    ($e:expr) => {
        match $e {
            Flow::Next(v) => v,
            Flow::Restart => return Ok(Flow::Restart),
            Flow::Quit => return Ok(Flow::Quit),
        }
    };
}

/// Load a stage through the controller, offering a retry on failure.
macro_rules! load_stage {
    ($app:ident, $message:expr, $loader:ident) => {
        loop {
            let spinner = $app.term.start_spinner($message)?;
            let result = $app.ctl.$loader().await;
            spinner.stop();
            match result {
                Ok(stage) => break stage,
                Err(e) => step!($app.offer_retry(&e).await?),
            }
        }
    };
}

enum Input {
    Line(String),
    Tick,
}

pub struct AppOptions {
    pub timed: bool,
    pub json: bool,
    pub selection: Option<String>,
}

pub struct App {
    ctl: InterviewController,
    term: Terminal,
    input: InputLines,
    options: AppOptions,
}

/// Whether a countdown value is worth announcing.
fn announce(remaining: u32) -> bool {
    remaining > 0 && (remaining % 60 == 0 || remaining == 30 || remaining == 10)
}

/// Typed lines accumulate into one answer, one line each.
fn append_line(existing: &str, line: &str) -> String {
    if existing.is_empty() {
        line.to_string()
    } else {
        format!("{existing}\n{line}")
    }
}

/// What a timer tick puts on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickNotice {
    /// Nothing; the line being typed is left alone.
    Quiet,
    /// A remaining-time line, after which the prompt is shown again.
    Remaining,
    /// Time ran out and the stage moved on.
    Expired,
}

fn tick_notice(moved_on: bool, remaining: u32) -> TickNotice {
    if moved_on {
        TickNotice::Expired
    } else if announce(remaining) {
        TickNotice::Remaining
    } else {
        TickNotice::Quiet
    }
}

fn ticker() -> Interval {
    let period = Duration::from_secs(1);
    interval_at(Instant::now() + period, period)
}

/// Selection groups in display order; numbering in the picker follows it.
fn selection_groups(query: &str) -> Vec<(ProfileKind, Vec<&'static SelectionProfile>)> {
    ProfileKind::ALL
        .iter()
        .map(|kind| (*kind, profile::filter_options(query, Some(*kind))))
        .collect()
}

/// Resolve picker input: a number from the current listing or an exact name.
fn pick(input: &str, listed: &[&'static SelectionProfile]) -> Option<&'static str> {
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| listed.get(i)).map(|p| p.name);
    }
    profile::options()
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(input))
        .map(|p| p.name)
}

impl App {
    pub fn new(ctl: InterviewController, term: Terminal, input: InputLines, options: AppOptions) -> Self {
        Self {
            ctl,
            term,
            input,
            options,
        }
    }

    /// Run interviews until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.interview().await? {
                Flow::Next(()) | Flow::Restart => {
                    self.ctl.reset();
                    debug!(session = %self.ctl.session().id(), "New interview session");
                }
                Flow::Quit => {
                    self.term.print_info("Goodbye.")?;
                    return Ok(());
                }
            }
        }
    }

    /// Wait for a line (and, with a ticker, for timer ticks). Prints
    /// nothing; callers show the prompt when a new one is due.
    /// `:quit` / end of input and `:restart` are handled here for every stage.
    async fn read(&mut self, ticker: Option<&mut Interval>) -> Result<Flow<Input>> {
        let next = match ticker {
            Some(t) => tokio::select! {
                line = self.input.next() => line.map(Input::Line),
                _ = t.tick() => Some(Input::Tick),
            },
            None => self.input.next().await.map(Input::Line),
        };
        Ok(match next {
            None => Flow::Quit,
            Some(Input::Line(line)) => match line.trim() {
                ":quit" | ":q" | ":exit" => Flow::Quit,
                ":restart" => Flow::Restart,
                _ => Flow::Next(Input::Line(line)),
            },
            Some(Input::Tick) => Flow::Next(Input::Tick),
        })
    }

    async fn read_line(&mut self, label: &str) -> Result<Flow<String>> {
        self.term.prompt(label)?;
        match self.read(None).await? {
            Flow::Next(Input::Line(line)) => Ok(Flow::Next(line)),
            Flow::Next(Input::Tick) => Ok(Flow::Next(String::new())),
            Flow::Restart => Ok(Flow::Restart),
            Flow::Quit => Ok(Flow::Quit),
        }
    }

    /// Show a failed remote call and ask whether to try again.
    async fn offer_retry(&mut self, err: &StageError) -> Result<Flow<()>> {
        self.term.print_error(&err.to_string())?;
        self.term.print_info("Press Enter to retry, :restart to start over, or :quit.")?;
        Ok(match self.read_line("retry").await? {
            Flow::Next(_) => Flow::Next(()),
            Flow::Restart => Flow::Restart,
            Flow::Quit => Flow::Quit,
        })
    }

    async fn interview(&mut self) -> Result<Flow<()>> {
        // Welcome
        self.term.print_stage_header(Stage::Welcome)?;
        self.term.print_info(
            "You will go through a self-introduction, an aptitude test, technical questions, \
             a coding challenge and an HR round.",
        )?;
        self.term.print_info("Press Enter to begin.")?;
        step!(self.read_line("start").await?);
        self.ctl.start()?;

        // Selection
        self.term.print_stage_header(Stage::LanguageSelection)?;
        let selection = match self.options.selection.clone() {
            Some(s) => s,
            None => step!(self.pick_selection().await?),
        };
        self.ctl.select(&selection)?;
        self.term.print_info(&format!("Interviewing for {selection}."))?;

        while !self.ctl.is_finished() {
            let stage = self.ctl.stage();
            self.term.print_stage_header(stage)?;
            let feedback = match stage {
                Stage::SelfIntroduction => step!(self.self_introduction().await?),
                Stage::Aptitude => step!(self.aptitude().await?),
                Stage::TechnicalQA => step!(self.technical().await?),
                Stage::Coding => step!(self.coding().await?),
                Stage::HR => step!(self.hr().await?),
                Stage::Welcome | Stage::LanguageSelection | Stage::Feedback => break,
            };
            self.term.print_stage_feedback(&feedback)?;
            self.ctl.complete(feedback)?;
        }

        // Report
        self.term.print_stage_header(Stage::Feedback)?;
        if self.options.json {
            println!("{}", serde_json::to_string_pretty(self.ctl.results())?);
        } else {
            self.term.print_report(self.ctl.results())?;
        }
        self.term.print_info("Press Enter to start a new interview, or :quit.")?;
        step!(self.read_line("again").await?);
        Ok(Flow::Next(()))
    }

    async fn pick_selection(&mut self) -> Result<Flow<String>> {
        let mut query = String::new();
        loop {
            let groups = selection_groups(&query);
            let listed: Vec<&'static SelectionProfile> =
                groups.iter().flat_map(|(_, ps)| ps.iter().copied()).collect();
            self.term.print_selections(&groups)?;
            self.term
                .print_info("Enter a number or name to choose, other text to filter, empty to clear.")?;

            let line = step!(self.read_line("select").await?);
            let line = line.trim();
            if let Some(name) = pick(line, &listed) {
                return Ok(Flow::Next(name.to_string()));
            }
            query = line.to_string();
        }
    }

    async fn self_introduction(&mut self) -> Result<Flow<StageFeedback>> {
        let mut stage = self.ctl.self_introduction();
        self.term.print_info(
            "Introduce yourself: background, skills, goals. Type as many lines as you like, \
             then :submit. :clear starts over.",
        )?;
        loop {
            let line = step!(self.read_line("intro").await?);
            match line.trim() {
                ":submit" => {
                    let spinner = self.term.start_spinner("Evaluating your introduction...")?;
                    let result = stage.submit(self.ctl.gateway()).await;
                    spinner.stop();
                    match result {
                        Ok(feedback) => return Ok(Flow::Next(feedback)),
                        Err(e) => {
                            self.term.print_error(&e.to_string())?;
                            if e.is_retryable() {
                                self.term.print_info("Your text is kept. :submit to try again.")?;
                            }
                        }
                    }
                }
                ":clear" => stage.set_introduction(""),
                _ => {
                    let text = append_line(stage.introduction(), &line);
                    stage.set_introduction(text);
                }
            }
        }
    }

    async fn aptitude(&mut self) -> Result<Flow<StageFeedback>> {
        let mut stage: AptitudeStage = load_stage!(self, "Preparing aptitude questions...", load_aptitude);
        if !self.options.timed {
            stage = stage.untimed();
        }
        let mut ticker = ticker();
        self.term.print_info(&format!(
            "{} questions, {} for the whole test. Answer with 1-4; :back to go back, :submit to finish early.",
            stage.questions().len(),
            stage.countdown().format()
        ))?;

        let mut show = true;
        let mut prompt = true;
        loop {
            if show {
                if let Some(q) = stage.current_question() {
                    self.term.print_question(
                        stage.current_index() + 1,
                        stage.questions().len(),
                        &q.question,
                        None,
                    )?;
                    self.term.print_options(&q.options, stage.current_answer())?;
                }
                show = false;
                prompt = true;
            }
            if prompt {
                self.term.prompt("answer")?;
                prompt = false;
            }

            let ticking = self.options.timed.then_some(&mut ticker);
            let signal = match step!(self.read(ticking).await?) {
                Input::Tick => {
                    let signal = stage.on_event(StageEvent::TimerTick);
                    let remaining = stage.countdown().remaining_secs();
                    match tick_notice(signal == StageSignal::Submit, remaining) {
                        TickNotice::Quiet => {}
                        TickNotice::Remaining => {
                            self.term.print_timer("Aptitude test", &stage.countdown().format())?;
                            prompt = true;
                        }
                        TickNotice::Expired => {
                            self.term.print_info("\nTime is up. Submitting your answers.")?;
                        }
                    }
                    signal
                }
                Input::Line(line) => {
                    prompt = true;
                    match line.trim() {
                        ":submit" => StageSignal::Submit,
                        ":back" => {
                            stage.previous();
                            show = true;
                            StageSignal::Continue
                        }
                        choice => match choice.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                            Some(index) => match stage.select(index) {
                                Ok(()) => {
                                    show = true;
                                    stage.next()
                                }
                                Err(e) => {
                                    self.term.print_error(&e.to_string())?;
                                    StageSignal::Continue
                                }
                            },
                            None => {
                                self.term.print_info("Choose an option by number.")?;
                                StageSignal::Continue
                            }
                        },
                    }
                }
            };

            if signal == StageSignal::Submit {
                break;
            }
        }

        loop {
            let spinner = self.term.start_spinner("Grading...")?;
            let result = stage.submit(self.ctl.gateway()).await;
            spinner.stop();
            match result {
                Ok(feedback) => return Ok(Flow::Next(feedback)),
                Err(e) => step!(self.offer_retry(&e).await?),
            }
        }
    }

    async fn technical(&mut self) -> Result<Flow<StageFeedback>> {
        let mut stage: TechnicalQAStage = load_stage!(self, "Preparing technical questions...", load_technical);
        self.term.print_info(
            "Type your answer (several lines are fine). An empty line or :next moves on.",
        )?;

        let mut show = true;
        loop {
            if show {
                if let Some(q) = stage.current_question() {
                    self.term
                        .print_question(stage.current_index() + 1, stage.questions().len(), q, None)?;
                }
                show = false;
            }
            let line = step!(self.read_line("answer").await?);
            match line.trim() {
                "" | ":next" => match stage.next() {
                    Ok(StageSignal::Submit) => break,
                    Ok(StageSignal::Continue) => show = true,
                    Err(_) => self.term.print_info("Please answer before moving on.")?,
                },
                _ => {
                    let text = append_line(stage.current_answer(), &line);
                    stage.set_answer(text);
                }
            }
        }

        loop {
            let spinner = self.term.start_spinner("Evaluating your answers...")?;
            let result = stage.submit(self.ctl.gateway()).await;
            spinner.stop();
            match result {
                Ok(feedback) => return Ok(Flow::Next(feedback)),
                Err(e) => step!(self.offer_retry(&e).await?),
            }
        }
    }

    async fn coding(&mut self) -> Result<Flow<StageFeedback>> {
        let mut stage: CodingStage = load_stage!(self, "Preparing a coding challenge...", load_coding);
        let challenge = stage.challenge().clone();
        self.term.print_panel(&challenge.title, &challenge.description)?;
        self.term.print_panel("Starter code", stage.code())?;
        self.term.print_info(
            "Type or paste code; it replaces the editor when you :run or :submit.\n\
             Commands: :run [input]  :submit  :reset (starter code)  :show  :load <file>  :clear",
        )?;

        let mut draft: Vec<String> = Vec::new();
        loop {
            let line = step!(self.read_line("code").await?);
            let (command, arg) = match line.trim_start().split_once(' ') {
                Some((c, rest)) if c.starts_with(':') => (c, rest.trim()),
                _ => (line.trim(), ""),
            };
            match command {
                ":run" => {
                    if !draft.is_empty() {
                        stage.set_code(draft.join("\n"));
                        draft.clear();
                    }
                    let spinner = self.term.start_spinner("Running...")?;
                    let output = stage.run(self.ctl.runner(), arg).await.to_string();
                    spinner.stop();
                    self.term.print_panel("Output", &output)?;
                }
                ":submit" => {
                    if !draft.is_empty() {
                        stage.set_code(draft.join("\n"));
                        draft.clear();
                    }
                    let spinner = self.term.start_spinner("Reviewing your code...")?;
                    let result = stage.submit(self.ctl.gateway()).await;
                    spinner.stop();
                    match result {
                        Ok(feedback) => return Ok(Flow::Next(feedback)),
                        Err(e) => {
                            self.term.print_error(&e.to_string())?;
                            if e.is_retryable() {
                                self.term.print_info("Your code is kept. :submit to try again.")?;
                            }
                        }
                    }
                }
                ":reset" => {
                    stage.set_code(challenge.default_code.clone());
                    draft.clear();
                    self.term.print_panel("Starter code", stage.code())?;
                }
                ":show" => self.term.print_panel("Current code", stage.code())?,
                ":clear" => draft.clear(),
                ":load" => match std::fs::read_to_string(arg) {
                    Ok(code) => {
                        stage.set_code(code);
                        draft.clear();
                        self.term.print_panel("Current code", stage.code())?;
                    }
                    Err(e) => self.term.print_error(&format!("cannot read {arg}: {e}"))?,
                },
                _ => draft.push(line),
            }
        }
    }

    async fn hr(&mut self) -> Result<Flow<StageFeedback>> {
        let mut stage: HRStage = load_stage!(self, "Preparing HR questions...", load_hr);
        if !self.options.timed {
            stage = stage.untimed();
        }
        let mut ticker = ticker();
        self.term.print_info(&format!(
            "{} per question. Type your response; an empty line or :next moves on.",
            stage.countdown().format()
        ))?;

        let mut shown = usize::MAX;
        let mut prompt = true;
        loop {
            if shown != stage.current_index() {
                shown = stage.current_index();
                if let Some(q) = stage.current_question() {
                    let tag = q.category.to_string();
                    self.term
                        .print_question(shown + 1, stage.questions().len(), &q.question, Some(&tag))?;
                }
                prompt = true;
            }
            if prompt {
                self.term.prompt("response")?;
                prompt = false;
            }

            let ticking = self.options.timed.then_some(&mut ticker);
            let signal = match step!(self.read(ticking).await?) {
                Input::Tick => {
                    let before = stage.current_index();
                    let signal = stage.on_event(StageEvent::TimerTick);
                    let moved_on = stage.current_index() != before || signal == StageSignal::Submit;
                    match tick_notice(moved_on, stage.countdown().remaining_secs()) {
                        TickNotice::Quiet => {}
                        TickNotice::Remaining => {
                            self.term.print_timer("Question", &stage.countdown().format())?;
                            prompt = true;
                        }
                        TickNotice::Expired => {
                            self.term.print_info("\nTime is up for this question.")?;
                        }
                    }
                    signal
                }
                Input::Line(line) => {
                    prompt = true;
                    match line.trim() {
                        "" | ":next" => stage.next(),
                        _ => {
                            let text = append_line(stage.draft(), &line);
                            stage.set_draft(text);
                            StageSignal::Continue
                        }
                    }
                }
            };
            if signal == StageSignal::Submit {
                break;
            }
        }

        let spinner = self.term.start_spinner("Evaluating your responses...")?;
        let feedback = stage.submit(self.ctl.gateway()).await;
        spinner.stop();
        Ok(Flow::Next(feedback))
    }
}
