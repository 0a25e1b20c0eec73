use std::io::{self, BufRead, Write};

use quiz_core::model::{ContentData, LeaderboardEntry, User};
use quiz_core::sampler::RandomSource;
use services::{SessionEngine, SessionOutcome, SessionView, StudySession};

const LETTERS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// How an interactive run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Finished,
    Quit,
}

enum Input {
    Answer(usize),
    Next,
    Previous,
    Finish,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" | "n" | "next" => return Input::Next,
        "p" | "prev" | "previous" => return Input::Previous,
        "f" | "finish" => return Input::Finish,
        "q" | "quit" => return Input::Quit,
        _ => {}
    }
    if let Ok(n) = line.parse::<usize>() {
        if n > 0 {
            return Input::Answer(n - 1);
        }
    }
    let mut chars = line.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(i) = LETTERS.iter().position(|l| l.eq_ignore_ascii_case(&c)) {
            return Input::Answer(i);
        }
    }
    Input::Unknown
}

fn render_question(view: &SessionView<'_>, out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "[{}] Question {}/{}  score {}  {:.0}%",
        view.session_name,
        view.current_question_index + 1,
        view.total_questions,
        view.score,
        view.progress * 100.0
    )?;
    writeln!(out, "{}", view.question_text)?;
    for (i, option) in view.displayed_options.iter().enumerate() {
        let letter = LETTERS.get(i).copied().unwrap_or('?');
        let mut marker = "  ";
        if view.revealed {
            if view.correct_display_index == Some(i) {
                marker = "✓ ";
            } else if view.current_answer() == Some(i) {
                marker = "✗ ";
            }
        }
        writeln!(out, "  {marker}{letter}) {option}")?;
    }
    if view.displayed_options.is_empty() {
        let hint = if view.can_go_next {
            "press Enter to skip"
        } else {
            "f = finish"
        };
        writeln!(out, "  (this question has no options; {hint})")?;
    }
    Ok(())
}

/// Drive a started session from `input` until it is complete or the user quits.
///
/// End of input counts as finishing.
pub fn run_session<R: RandomSource>(
    engine: &mut SessionEngine<R>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<RunEnd> {
    let mut line = String::new();
    loop {
        let Some(view) = engine.view() else {
            return Ok(RunEnd::Quit);
        };
        render_question(&view, out)?;
        if view.is_complete {
            writeln!(out, "All questions answered.")?;
            return Ok(RunEnd::Finished);
        }
        let option_count = view.displayed_options.len();
        let at_last = !view.can_go_next;
        let prompt = if view.answered {
            "Enter = next, p = previous, f = finish, q = quit"
        } else {
            "Answer with a letter or number (p = previous, f = finish, q = quit)"
        };
        write!(out, "{prompt}: ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(RunEnd::Finished);
        }
        match parse_input(&line) {
            Input::Answer(i) if i < option_count => engine.select_answer(i),
            // An unplayable last question can never complete the run.
            Input::Next if at_last && option_count == 0 => return Ok(RunEnd::Finished),
            Input::Next => engine.go_to_next(),
            Input::Previous => engine.go_to_previous(),
            Input::Finish => return Ok(RunEnd::Finished),
            Input::Quit => return Ok(RunEnd::Quit),
            Input::Answer(_) | Input::Unknown => writeln!(out, "Unrecognised input.")?,
        }
    }
}

pub fn print_outcome(outcome: &SessionOutcome, seconds: u64, out: &mut impl Write) -> io::Result<()> {
    let record = &outcome.record;
    writeln!(out)?;
    writeln!(
        out,
        "{}: {}/{} ({}%) in {}m {:02}s",
        record.session_name,
        record.score,
        record.total_questions,
        record.percentage,
        seconds / 60,
        seconds % 60
    )?;
    for (n, result) in outcome.results.iter().enumerate() {
        let mark = if result.is_correct { "✓" } else { "✗" };
        writeln!(out, "{mark} {}. {}", n + 1, result.question.text)?;
        if !result.is_correct {
            let given = result
                .user_answer
                .and_then(|i| result.displayed_options.get(i))
                .map_or("(no answer)", String::as_str);
            let expected = result
                .correct_display_index
                .and_then(|i| result.displayed_options.get(i))
                .map_or("(none)", String::as_str);
            writeln!(out, "     your answer: {given}")?;
            writeln!(out, "     correct:     {expected}")?;
        }
        if let Some(explanation) = &result.question.explanation {
            writeln!(out, "     {explanation}")?;
        }
    }
    if !outcome.saved {
        writeln!(out, "Score could not be saved; results above are still valid.")?;
    }
    Ok(())
}

pub fn run_study(
    study: &mut StudySession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    let mut line = String::new();
    loop {
        let Some(note) = study.current_note() else {
            writeln!(out, "This topic has no notes.")?;
            return Ok(());
        };
        writeln!(out)?;
        writeln!(
            out,
            "Note {}/{} ({:.0}%): {}",
            study.current_note_index() + 1,
            study.total_notes(),
            study.progress(),
            note.title
        )?;
        writeln!(out, "{}", note.content)?;
        write!(out, "Enter = next, p = previous, q = quit: ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        match parse_input(&line) {
            Input::Next if !study.can_go_next() => return Ok(()),
            Input::Next => study.go_to_next(),
            Input::Previous => study.go_to_previous(),
            Input::Quit | Input::Finish => return Ok(()),
            Input::Answer(_) | Input::Unknown => writeln!(out, "Unrecognised input.")?,
        }
    }
}

pub fn print_categories(content: &ContentData, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Quiz categories:")?;
    for category in &content.quiz_categories {
        writeln!(
            out,
            "  {:<20} {} ({} questions)",
            category.id.as_str(),
            category.name,
            category.questions.len()
        )?;
    }
    if !content.topics.is_empty() {
        writeln!(out, "Study topics:")?;
        for topic in &content.topics {
            writeln!(out, "  {:<20} {} ({} notes)", topic.id.as_str(), topic.name, topic.notes.len())?;
        }
    }
    Ok(())
}

pub fn print_leaderboard(entries: &[LeaderboardEntry], out: &mut impl Write) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No scores yet.");
    }
    for entry in entries {
        writeln!(
            out,
            "{:>3}. {:<20} {:>3}% ({} correct)  {}",
            entry.rank,
            entry.user_name,
            entry.percentage,
            entry.score,
            entry.timestamp.format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(())
}

pub fn print_users(users: &[User], current: Option<&User>, out: &mut impl Write) -> io::Result<()> {
    if users.is_empty() {
        return writeln!(out, "No users yet.");
    }
    for user in users {
        let marker = if current.is_some_and(|c| c.id() == user.id()) {
            "*"
        } else {
            " "
        };
        writeln!(out, "{marker} {}", user.name())?;
    }
    Ok(())
}
