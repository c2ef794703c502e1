use std::io::{self, BufRead, Write};

use chrono::NaiveDate;

use scrum_helper::core::record::{DEFAULT_NOTES_TEMPLATE, EntryInput};
use scrum_helper::core::schema::ChecklistSchema;
use scrum_helper::workflow::FormValues;

/// Line that ends the multi-line notes field.
const NOTES_END: &str = ".";

/// Prompts for the day's form on a terminal.
pub struct TerminalForm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalForm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn show(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    /// Read one line; end of input reads as an empty answer.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub fn ask_yes_no(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let answer = self.ask(&format!("{} {}", prompt, hint))?;
        Ok(match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        })
    }

    pub fn collect(&mut self, schema: &ChecklistSchema, date: NaiveDate) -> io::Result<FormValues> {
        self.show(&format!("Daily Scrum for {}", date.format("%Y-%m-%d")))?;
        let goal = self.ask("Sprint goal")?.trim().to_string();

        let mut entries = Vec::new();
        for section in schema.sections() {
            self.show(&format!("\n{}", section.title))?;
            for item in &section.items {
                let checked = self.ask_yes_no(&format!("  {}", item), false)?;
                let detail = self.ask("    detail (optional)")?.trim().to_string();
                let detail = (!detail.is_empty()).then_some(detail);
                entries.push((item.clone(), EntryInput { checked, detail }));
            }
        }

        let notes = self.read_notes()?;
        Ok(FormValues {
            date,
            goal,
            entries,
            notes,
        })
    }

    /// Multi-line notes ending with a lone `.`; nothing entered keeps the template.
    fn read_notes(&mut self) -> io::Result<String> {
        self.show(&format!(
            "\nRetrospective notes (finish with a line containing only '{}', leave empty for the template):",
            NOTES_END
        ))?;

        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line == NOTES_END {
                break;
            }
            lines.push(line.to_string());
        }

        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return Ok(DEFAULT_NOTES_TEMPLATE.to_string());
        }
        Ok(lines.join("\n"))
    }
}
