use anyhow::Result;
use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use acemock_core::feedback::{Feedback, StageFeedback};
use acemock_core::profile::{ProfileKind, SelectionProfile};
use acemock_core::results::ResultsAggregate;
use acemock_core::stage::Stage;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const QUESTION: Color = Color::Cyan;
    const TIMER: Color = Color::Yellow;
    const GOOD: Color = Color::DarkGreen;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// Lines typed by the user, read on a dedicated thread so stage timers keep
/// ticking while the prompt waits.
pub struct InputLines {
    rx: mpsc::UnboundedReceiver<String>,
}

impl InputLines {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }

    /// Next line, `None` on end of input.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Manages terminal output for the interview.
#[derive(Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, provider: &str, model: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("AceMock"),
            ResetColor,
            Print(" - Mock Technical Interviews\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Provider: {} | Model: {}\n", provider, model)),
            Print("Type :quit to leave at any time, :restart to start over.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the prompt marker.
    pub fn prompt(&self, label: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::USER_PROMPT),
            Print(format!("{label}> ")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_stage_header(&self, stage: Stage) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            SetAttribute(Attribute::Bold),
            Print(format!("== {} ({}/{}) ==\n", stage, stage.index(), Stage::ALL.len() - 1)),
            SetAttribute(Attribute::Reset),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print a numbered question with an optional tag (category, timer).
    pub fn print_question(&self, number: usize, total: usize, text: &str, tag: Option<&str>) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Question {number} of {total}")),
            Print(tag.map(|t| format!(" [{t}]")).unwrap_or_default()),
            Print("\n"),
            SetForegroundColor(Colors::QUESTION),
            Print(format!("{text}\n")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_options(&self, options: &[String], selected: Option<&str>) -> Result<()> {
        let mut stdout = io::stdout();
        for (i, option) in options.iter().enumerate() {
            let marker = if selected == Some(option.as_str()) { "*" } else { " " };
            execute!(stdout, Print(format!(" {marker} {}. {option}\n", i + 1)))?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_timer(&self, label: &str, remaining: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::TIMER),
            Print(format!("\n[{label}: {remaining} left]\n")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print a block of text in a framed panel (challenge text, code, run output).
    pub fn print_panel(&self, title: &str, body: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("--- {title} ---\n")),
            ResetColor,
            Print(format!("{}\n", body.trim_end())),
            SetForegroundColor(Colors::DIM),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_selections(&self, groups: &[(ProfileKind, Vec<&SelectionProfile>)]) -> Result<()> {
        let mut stdout = io::stdout();
        let mut n = 0;
        for (kind, profiles) in groups {
            if profiles.is_empty() {
                continue;
            }
            execute!(
                stdout,
                SetForegroundColor(Colors::HEADER),
                Print(format!("{kind}s\n")),
                ResetColor,
            )?;
            for p in profiles {
                n += 1;
                execute!(
                    stdout,
                    Print(format!("  {n:>2}. {:<24}", p.name)),
                    SetForegroundColor(Colors::DIM),
                    Print(format!("{}\n", p.description)),
                    ResetColor,
                )?;
            }
        }
        if n == 0 {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No matches.\n"),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_runtimes(&self, languages: &[String], fallback: bool) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("Available runtimes"),
            ResetColor,
            SetForegroundColor(Colors::DIM),
            Print(if fallback { " (built-in list, service unreachable)\n" } else { "\n" }),
            ResetColor,
        )?;
        for lang in languages {
            execute!(stdout, Print(format!("  {lang}\n")))?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn print_list(&self, title: &str, color: Color, items: &[String]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut stdout = io::stdout();
        execute!(stdout, SetForegroundColor(color), Print(format!("  {title}:\n")), ResetColor)?;
        for item in items {
            execute!(stdout, Print(format!("    - {item}\n")))?;
        }
        Ok(())
    }

    fn print_base(&self, base: &Feedback) -> Result<()> {
        self.print_list("Strengths", Colors::GOOD, &base.strengths)?;
        self.print_list("Weaknesses", Colors::ERROR, &base.weaknesses)?;
        self.print_list("Suggestions", Colors::QUESTION, &base.suggestions)
    }

    /// Print feedback for one stage as soon as it completes.
    pub fn print_stage_feedback(&self, feedback: &StageFeedback) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetAttribute(Attribute::Bold),
            Print(format!("{}: {}/10\n", feedback.key(), feedback.score())),
            SetAttribute(Attribute::Reset),
        )?;
        self.print_base(feedback.base())?;

        match feedback {
            StageFeedback::SelfIntroduction(_) => {}
            StageFeedback::Aptitude(a) => {
                execute!(
                    stdout,
                    Print(format!("  Correct: {}/{}\n", a.correct_count, a.total_questions))
                )?;
                for r in &a.detailed_results {
                    let (mark, color) = if r.is_correct {
                        ("+", Colors::GOOD)
                    } else {
                        ("x", Colors::ERROR)
                    };
                    let answer = if r.user_answer.is_empty() { "(no answer)" } else { r.user_answer.as_str() };
                    execute!(
                        stdout,
                        SetForegroundColor(color),
                        Print(format!("    [{mark}] ")),
                        ResetColor,
                        Print(format!("{} - you: {answer}, key: {}\n", r.question, r.correct_answer)),
                    )?;
                }
            }
            StageFeedback::TechnicalQA(t) => {
                for (i, r) in t.detailed_results.iter().enumerate() {
                    execute!(
                        stdout,
                        Print(format!("    Q{} ({}/10) {}\n", i + 1, r.score, r.question)),
                        SetForegroundColor(Colors::DIM),
                        Print(format!("       {}\n", r.evaluation)),
                        ResetColor,
                    )?;
                }
            }
            StageFeedback::Coding(c) => {
                execute!(
                    stdout,
                    Print(format!("  Logic: {}\n", c.logic)),
                    Print(format!("  Syntax: {}\n", c.syntax)),
                    Print(format!("  Efficiency: {}\n", c.efficiency)),
                )?;
            }
            StageFeedback::HrRound(h) => {
                execute!(
                    stdout,
                    Print(format!(
                        "  Communication {} | Problem solving {} | Cultural fit {} | Leadership {}\n",
                        h.communication, h.problem_solving, h.cultural_fit, h.leadership
                    )),
                )?;
                for (i, r) in h.detailed_results.iter().enumerate() {
                    execute!(
                        stdout,
                        Print(format!("    Q{} ({}/10) {}\n", i + 1, r.score, r.question)),
                        SetForegroundColor(Colors::DIM),
                        Print(format!("       {}\n", r.evaluation)),
                        ResetColor,
                    )?;
                }
            }
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print the final report: every completed stage, then the overall score.
    pub fn print_report(&self, results: &ResultsAggregate) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            SetAttribute(Attribute::Bold),
            Print("Interview Report\n"),
            SetAttribute(Attribute::Reset),
            ResetColor,
        )?;
        for feedback in results.iter() {
            self.print_stage_feedback(&feedback)?;
        }
        execute!(
            stdout,
            Print("\n"),
            SetAttribute(Attribute::Bold),
            Print(format!(
                "Overall: {:.1}/10 across {} stage(s)\n",
                results.overall_score(),
                results.populated()
            )),
            SetAttribute(Attribute::Reset),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Show a spinner/waiting indicator. Returns a handle to stop it.
    pub fn start_spinner(&self, message: &str) -> Result<SpinnerHandle> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{} ", message)),
            ResetColor,
        )?;
        stdout.flush()?;

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = std::thread::spawn(move || {
            let frames = ['|', '/', '-', '\\'];
            let mut i = 0;
            while running_clone.load(Ordering::SeqCst) {
                let mut stdout = io::stdout();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("\r{} ", frames[i % frames.len()])),
                    ResetColor,
                )
                .ok();
                stdout.flush().ok();
                i += 1;
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            let mut stdout = io::stdout();
            execute!(stdout, Print("\r  \r\n")).ok();
            stdout.flush().ok();
        });

        Ok(SpinnerHandle {
            running,
            thread: Some(handle),
        })
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Handle to a running spinner. Drop or call stop() to terminate it.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SpinnerHandle {
    /// Stop the spinner and wait for it to clear its line.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_stops_on_drop() {
        let term = Terminal::new();
        let spinner = term.start_spinner("waiting").unwrap();
        let running = spinner.running.clone();
        drop(spinner);
        assert!(!running.load(Ordering::SeqCst));
    }
}
