pub mod catalog;
pub mod run;
pub mod status;
pub mod verify;

/// Outcome of one CLI command: human-readable detail lines plus any
/// issues that should fail the invocation.
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, line: impl Into<String>) {
        self.details.push(line.into());
    }

    pub fn issue(&mut self, line: impl Into<String>) {
        self.ok = false;
        self.issues.push(line.into());
    }

    pub fn merge(&mut self, other: CommandReport) {
        self.ok = self.ok && other.ok;
        self.details.extend(other.details);
        self.issues.extend(other.issues);
    }

    pub fn print(&self) {
        println!("[{}] {}", self.command, if self.ok { "ok" } else { "failed" });
        for line in &self.details {
            println!("  {line}");
        }
        for line in &self.issues {
            eprintln!("  issue: {line}");
        }
    }
}
