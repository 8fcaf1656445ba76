//! Ordered queue of print jobs built from user input.

use crate::error::Error;

/// Maximum number of text lines a single text job may hold.
pub const MAX_LINES: usize = 8;

/// One unit of print content, queued for composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// A block of up to [`MAX_LINES`] lines sharing one font size.
    Text(Vec<String>),
    /// Path to a monochrome PNG; `-` reads from standard input.
    Image(String),
    /// Dashed cut-here marker.
    Cutmark,
    /// Blank tape of the given length in pixels.
    Pad(u32),
}

/// Append-only sequence of jobs, consumed in order by the pipeline.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        JobQueue::default()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn push_image(&mut self, path: impl Into<String>) {
        self.jobs.push(Job::Image(path.into()));
    }

    pub fn push_cutmark(&mut self) {
        self.jobs.push(Job::Cutmark);
    }

    pub fn push_pad(&mut self, length: u32) {
        self.jobs.push(Job::Pad(length));
    }

    /// Add text, splitting on embedded newlines.
    ///
    /// `raw` is split at each literal `\n` escape (two characters) or real
    /// newline byte, whichever comes first. The first segment starts a new
    /// text job when `start_new_job` is set or the queue's tail is not a
    /// text job; otherwise it continues the tail job. Later segments always
    /// continue the job the first segment landed in.
    ///
    /// A continuation past [`MAX_LINES`] aborts with
    /// [`Error::TooManyLines`]; input processing must not truncate.
    pub fn add_text(&mut self, raw: &str, start_new_job: bool) -> Result<(), Error> {
        let mut rest = raw;
        let mut first_part = true;
        loop {
            let literal = rest.find("\\n");
            let real = rest.find('\n');
            let cut = match (literal, real) {
                (Some(l), Some(r)) => {
                    if l < r {
                        Some((l, 2))
                    } else {
                        Some((r, 1))
                    }
                }
                (Some(l), None) => Some((l, 2)),
                (None, Some(r)) => Some((r, 1)),
                (None, None) => None,
            };
            let (segment, next) = match cut {
                Some((at, skip)) => (&rest[..at], Some(&rest[at + skip..])),
                None => (rest, None),
            };

            let starts_new = (start_new_job && first_part)
                || !matches!(self.jobs.last(), Some(Job::Text(_)));
            if starts_new {
                self.jobs.push(Job::Text(vec![segment.to_string()]));
            } else if let Some(Job::Text(lines)) = self.jobs.last_mut() {
                if lines.len() >= MAX_LINES {
                    return Err(Error::TooManyLines(MAX_LINES));
                }
                lines.push(segment.to_string());
            }

            match next {
                Some(r) => rest = r,
                None => break,
            }
            first_part = false;
        }
        Ok(())
    }
}

impl IntoIterator for JobQueue {
    type Item = Job;
    type IntoIter = std::vec::IntoIter<Job>;

    /// Head-to-tail, single pass; the queue is consumed.
    fn into_iter(self) -> Self::IntoIter {
        self.jobs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(job: &Job) -> &[String] {
        match job {
            Job::Text(lines) => lines,
            other => panic!("expected text job, got {:?}", other),
        }
    }

    #[test]
    fn literal_escape_splits_into_lines() {
        let mut q = JobQueue::new();
        q.add_text("A\\nB", true).unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(lines(&q.jobs()[0]), ["A", "B"]);
    }

    #[test]
    fn real_newline_splits_into_lines() {
        let mut q = JobQueue::new();
        q.add_text("A\nB", true).unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(lines(&q.jobs()[0]), ["A", "B"]);
    }

    #[test]
    fn earliest_separator_wins() {
        let mut q = JobQueue::new();
        q.add_text("A\nB\\nC", true).unwrap();
        assert_eq!(lines(&q.jobs()[0]), ["A", "B", "C"]);
    }

    #[test]
    fn continuation_appends_to_tail_text_job() {
        let mut q = JobQueue::new();
        q.add_text("first", true).unwrap();
        q.add_text("second", false).unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(lines(&q.jobs()[0]), ["first", "second"]);
    }

    #[test]
    fn start_new_job_breaks_the_block() {
        let mut q = JobQueue::new();
        q.add_text("first", true).unwrap();
        q.add_text("second", true).unwrap();
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn continuation_after_non_text_starts_a_job() {
        let mut q = JobQueue::new();
        q.add_text("first", true).unwrap();
        q.push_cutmark();
        q.add_text("second", false).unwrap();
        assert_eq!(q.len(), 3);
        assert_eq!(lines(&q.jobs()[2]), ["second"]);
    }

    #[test]
    fn too_many_lines_aborts() {
        let mut q = JobQueue::new();
        q.add_text("1\\n2\\n3\\n4\\n5\\n6\\n7\\n8", true).unwrap();
        let err = q.add_text("9", false).unwrap_err();
        assert!(matches!(err, Error::TooManyLines(n) if n == MAX_LINES));
    }

    #[test]
    fn too_many_lines_within_one_argument() {
        let mut q = JobQueue::new();
        let err = q
            .add_text("1\\n2\\n3\\n4\\n5\\n6\\n7\\n8\\n9", true)
            .unwrap_err();
        assert!(matches!(err, Error::TooManyLines(_)));
    }

    #[test]
    fn mixed_queue_keeps_order() {
        let mut q = JobQueue::new();
        q.add_text("hello", true).unwrap();
        q.push_cutmark();
        q.push_pad(10);
        q.push_image("label.png");
        let jobs: Vec<Job> = q.into_iter().collect();
        assert_eq!(jobs.len(), 4);
        assert!(matches!(jobs[1], Job::Cutmark));
        assert!(matches!(jobs[2], Job::Pad(10)));
        assert!(matches!(jobs[3], Job::Image(ref p) if p == "label.png"));
    }
}
