/// Counts collected while a command runs, printed once at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    title: String,
    counts: Vec<(String, usize)>,
    notes: Vec<String>,
}

impl RunSummary {
    pub fn new(title: impl Into<String>) -> Self {
        RunSummary {
            title: title.into(),
            counts: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn count(&mut self, label: impl Into<String>, value: usize) {
        self.counts.push((label.into(), value));
    }

    /// Free-form line printed under the counts: unresolved items, output paths.
    pub fn note(&mut self, line: impl Into<String>) {
        self.notes.push(line.into());
    }

    #[allow(dead_code)]
    pub fn get(&self, label: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    pub fn render(&self) -> String {
        let width = self.counts.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&"=".repeat(self.title.chars().count()));
        out.push('\n');
        for (label, value) in &self.counts {
            let label = format!("{}:", label);
            out.push_str(&format!("  {:<width$}  {}\n", label, value, width = width + 1));
        }
        if !self.notes.is_empty() {
            out.push_str("\nNotes:\n");
            for note in &self.notes {
                out.push_str(&format!("  - {}\n", note));
            }
        }
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_aligned_counts_and_notes() {
        let mut summary = RunSummary::new("Patch");
        summary.count("applied", 3);
        summary.count("not found", 1);
        summary.note("P-1 [benefits] index 4");
        let out = summary.render();
        assert_eq!(
            out,
            "Patch\n=====\n  applied:    3\n  not found:  1\n\nNotes:\n  - P-1 [benefits] index 4\n"
        );
        assert_eq!(summary.get("applied"), Some(3));
        assert_eq!(summary.get("missing"), None);
    }
}
