//! One-command lookahead over a reader
//!
//! The reader can only be consumed once, so fusion decisions are made
//! with an explicit two-slot buffer: the command being decided on and
//! the one after it. A command pulled into the second slot that does not
//! complete a fused pair becomes the next current command.

use vmt_common::{Command, VmError};

/// What the emitter should do next
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Single(Command),
    /// A push immediately followed by a pop
    Fused(Command, Command),
    /// The reader rejected a line
    Error(VmError),
}

pub struct LookaheadBuffer<I>
where
    I: Iterator<Item = Result<Command, VmError>>,
{
    source: I,
    next: Option<Result<Command, VmError>>,
    fuse: bool,
}

impl<I> LookaheadBuffer<I>
where
    I: Iterator<Item = Result<Command, VmError>>,
{
    pub fn new(source: I, fuse: bool) -> Self {
        Self {
            source,
            next: None,
            fuse,
        }
    }

    fn pull(&mut self) -> Option<Result<Command, VmError>> {
        self.next.take().or_else(|| self.source.next())
    }
}

impl<I> Iterator for LookaheadBuffer<I>
where
    I: Iterator<Item = Result<Command, VmError>>,
{
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let current = match self.pull()? {
            Ok(command) => command,
            Err(error) => return Some(Step::Error(error)),
        };

        if !self.fuse || !current.is_push() {
            return Some(Step::Single(current));
        }

        match self.source.next() {
            Some(Ok(following)) if following.is_pop() => Some(Step::Fused(current, following)),
            other => {
                self.next = other;
                Some(Step::Single(current))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vmt_common::{Opcode, SourceLocation};

    fn push(index: u16) -> Result<Command, VmError> {
        Ok(Command::synthetic(Opcode::Push {
            segment: "constant".to_string(),
            index,
        }))
    }

    fn pop(index: u16) -> Result<Command, VmError> {
        Ok(Command::synthetic(Opcode::Pop {
            segment: "local".to_string(),
            index,
        }))
    }

    fn add() -> Result<Command, VmError> {
        Ok(Command::synthetic(Opcode::Arithmetic("add".to_string())))
    }

    fn kinds(steps: Vec<Step>) -> Vec<&'static str> {
        steps
            .iter()
            .map(|step| match step {
                Step::Single(_) => "single",
                Step::Fused(_, _) => "fused",
                Step::Error(_) => "error",
            })
            .collect()
    }

    #[test]
    fn test_push_pop_pairs_fuse() {
        let input = vec![push(1), pop(0), push(2), push(3), add(), pop(1)];
        let steps: Vec<_> = LookaheadBuffer::new(input.into_iter(), true).collect();
        assert_eq!(kinds(steps), vec!["fused", "single", "single", "single", "single"]);
    }

    #[test]
    fn test_second_push_is_not_lost() {
        let input = vec![push(1), push(2), pop(0)];
        let steps: Vec<_> = LookaheadBuffer::new(input.into_iter(), true).collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0], Step::Single(push(1).unwrap()));
        assert_eq!(steps[1], Step::Fused(push(2).unwrap(), pop(0).unwrap()));
    }

    #[test]
    fn test_disabled_fusion_yields_singles() {
        let input = vec![push(1), pop(0)];
        let steps: Vec<_> = LookaheadBuffer::new(input.into_iter(), false).collect();
        assert_eq!(kinds(steps), vec!["single", "single"]);
    }

    #[test]
    fn test_error_breaks_a_pair() {
        let error = VmError::parse_error("bad".to_string(), SourceLocation::new("Main", 2));
        let input = vec![push(1), Err(error.clone()), pop(0)];
        let steps: Vec<_> = LookaheadBuffer::new(input.into_iter(), true).collect();
        assert_eq!(steps[1], Step::Error(error));
        assert_eq!(kinds(steps), vec!["single", "error", "single"]);
    }

    #[test]
    fn test_trailing_push() {
        let steps: Vec<_> = LookaheadBuffer::new(vec![push(4)].into_iter(), true).collect();
        assert_eq!(kinds(steps), vec!["single"]);
    }
}
