// src/interactions/terminal.rs

//! Interactive review on the controlling terminal

use super::{Action, Interactor, SegmentChoice};
use crate::error::{Error, Result};
use crate::programs::{self, Program};
use crate::updaters::Target;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::debug;

/// What the console delivered in answer to a prompt
#[derive(Debug)]
enum Input {
    Line(String),
    Eof,
    Interrupted,
    Failed(io::Error),
}

/// Console answers and Ctrl-C arrive on one channel, so an interrupt
/// unblocks a pending prompt instead of killing the process mid-update.
#[derive(Debug)]
struct Console {
    inputs: Receiver<Input>,
}

impl Console {
    fn spawn() -> Self {
        let (sender, inputs) = mpsc::channel();
        let interrupts = sender.clone();
        thread::spawn(move || read_lines(sender));
        thread::spawn(move || watch_interrupts(interrupts));
        Self { inputs }
    }

    /// Print `prompt` and wait for a trimmed, lowercased answer
    fn ask(&self, prompt: &str) -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        match self.inputs.recv() {
            Ok(input) => answer(input),
            Err(_) => Err(Error::UserOperateCancellation(
                "console input closed".to_string(),
            )),
        }
    }
}

fn read_lines(sender: Sender<Input>) {
    let stdin = io::stdin();
    loop {
        let mut line = String::new();
        let input = match stdin.lock().read_line(&mut line) {
            Ok(0) => Input::Eof,
            Ok(_) => Input::Line(line),
            Err(e) => Input::Failed(e),
        };
        let last = !matches!(input, Input::Line(_));
        if sender.send(input).is_err() || last {
            return;
        }
    }
}

fn watch_interrupts(sender: Sender<Input>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            debug!("Interrupt handling unavailable: {}", e);
            return;
        }
    };
    runtime.block_on(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            if sender.send(Input::Interrupted).is_err() {
                return;
            }
        }
    });
}

fn answer(input: Input) -> Result<String> {
    match input {
        Input::Line(line) => Ok(line.trim().to_lowercase()),
        Input::Eof => Err(Error::UserOperateCancellation(
            "end of input at prompt".to_string(),
        )),
        Input::Interrupted => Err(Error::UserOperateCancellation(
            "interrupted at prompt".to_string(),
        )),
        Input::Failed(e) if e.kind() == io::ErrorKind::Interrupted => Err(
            Error::UserOperateCancellation("interrupted at prompt".to_string()),
        ),
        Input::Failed(e) => Err(Error::Io(e)),
    }
}

/// Reads single-line answers from stdin and shows content through the
/// pager and editor programs
#[derive(Debug, Default)]
pub struct TerminalInteractor {
    pager: Option<Program>,
    editor: Option<Program>,
    console: Option<Console>,
}

impl TerminalInteractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit programs instead of discovering them
    pub fn with_programs(pager: Option<Program>, editor: Option<Program>) -> Self {
        Self {
            pager,
            editor,
            console: None,
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.console.get_or_insert_with(Console::spawn).ask(prompt)
    }

    fn pager(&mut self) -> Option<&Program> {
        if self.pager.is_none() {
            match programs::discover_pager() {
                Ok(pager) => self.pager = Some(pager),
                Err(e) => debug!("{}; printing directly", e),
            }
        }
        self.pager.as_ref()
    }

    fn editor(&mut self) -> Result<&Program> {
        if self.editor.is_none() {
            self.editor = Some(programs::discover_editor()?);
        }
        self.editor
            .as_ref()
            .ok_or_else(|| Error::ProgramAbsence("editor".to_string()))
    }

    fn display(&mut self, text: &str) -> Result<()> {
        match self.pager() {
            Some(pager) => pager.page(text),
            None => {
                let mut stdout = io::stdout();
                writeln!(stdout, "{text}")?;
                stdout.flush()?;
                Ok(())
            }
        }
    }
}

impl Interactor for TerminalInteractor {
    fn stdin_is_tty(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn prompt_action(&mut self, target: &Target, locked: bool) -> Result<Action> {
        let mut stdout = io::stdout();
        writeln!(stdout)?;
        writeln!(
            stdout,
            "{} -> {} [{}]",
            target.part.location,
            target.destination.display(),
            target.protection.description()
        )?;
        let choices = if locked {
            "Action [a]pply (locked) [i]gnore [v]iew [d]iff [e]dit [s]elect [p]rotection override: "
        } else {
            "Action [a]pply [i]gnore [v]iew [d]iff [e]dit [s]elect [p]rotection override: "
        };
        loop {
            let answer = self.ask(choices)?;
            match Action::from_key(&answer) {
                Some(action) => return Ok(action),
                None => writeln!(stdout, "Unknown option '{answer}'. Please try again.")?,
            }
        }
    }

    fn show_content(&mut self, _target: &Target, content: &str) -> Result<()> {
        self.display(content)
    }

    fn show_diff(&mut self, target: &Target, current: &str, revision: &str) -> Result<()> {
        if current == revision {
            writeln!(io::stdout(), "No changes for {}", target.destination.display())?;
            return Ok(());
        }
        let patch = diffy::create_patch(current, revision);
        self.display(&patch.to_string())
    }

    fn edit(&mut self, target: &Target, content: &str) -> Result<String> {
        let suffix = target
            .destination
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| ".txt".to_string());
        self.editor()?.edit(content, &suffix)
    }

    fn choose_segment(
        &mut self,
        _target: &Target,
        current: &str,
        incoming: &str,
    ) -> Result<SegmentChoice> {
        let mut stdout = io::stdout();
        writeln!(stdout)?;
        for line in current.lines() {
            writeln!(stdout, "- {line}")?;
        }
        for line in incoming.lines() {
            writeln!(stdout, "+ {line}")?;
        }
        loop {
            match self.ask("Take this change? [y]es [n]o [v]iew: ")?.as_str() {
                "y" | "yes" => return Ok(SegmentChoice::Accept),
                "n" | "no" => return Ok(SegmentChoice::Reject),
                "v" | "view" => return Ok(SegmentChoice::View),
                other => writeln!(stdout, "Unknown option '{other}'. Please enter y, n, or v.")?,
            }
        }
    }
}
