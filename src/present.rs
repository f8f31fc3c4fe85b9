// src/present.rs
use crate::headline::HeadlineSet;

const SEPARATOR: &str = "---------------------------------------";

/// Output sink for finished headline sets.
pub trait Present: Send + Sync {
    fn present(&self, article: &str, headlines: &HeadlineSet);
}

/// Prints each article block to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn render(article: &str, headlines: &HeadlineSet) -> String {
        let mut out = format!("{SEPARATOR}\n{article}\n\n");
        for h in headlines {
            out.push('\t');
            out.push_str(h);
            out.push('\n');
        }
        out.push_str(SEPARATOR);
        out.push('\n');
        out
    }
}

impl Present for ConsolePresenter {
    fn present(&self, article: &str, headlines: &HeadlineSet) {
        tracing::info!(article, count = headlines.len(), "suggested headlines");
        print!("{}", Self::render(article, headlines));
    }
}
