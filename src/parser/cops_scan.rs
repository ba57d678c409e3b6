use heapless::Vec;

use crate::command::network_service::types::{OperatorStatus, ScannedOperator};

/// Field of a `(<stat>,<long>,<short>,<numeric>)` group being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Status,
    LongName,
    ShortName,
    Numeric,
    /// Trailing fields such as `<AcT>` are not stored.
    Ignored,
}

impl Term {
    fn next(self) -> Self {
        match self {
            Self::Status => Self::LongName,
            Self::LongName => Self::ShortName,
            Self::ShortName => Self::Numeric,
            Self::Numeric | Self::Ignored => Self::Ignored,
        }
    }
}

/// Byte incremental parser for the `+COPS=?` result line.
///
/// The scan line can be far longer than any line buffer, so it is fed one
/// byte at a time, starting right after the `+COPS:` prefix. Call
/// [`CopsScan::reset`] before each new scan.
#[derive(Debug, Clone, Default)]
pub enum CopsScan {
    #[default]
    AwaitingFirst,
    Outside {
        prev: u8,
    },
    Inside {
        term: Term,
        status: u32,
        entry: ScannedOperator,
    },
    /// The modem reported no operators, or the list has ended. Everything
    /// else on the line is ignored.
    Done,
}

impl CopsScan {
    pub fn reset(&mut self) {
        *self = Self::AwaitingFirst;
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn feed<const N: usize>(&mut self, c: u8, results: &mut Vec<ScannedOperator, N>) {
        if let Self::AwaitingFirst = self {
            match c {
                b' ' => return,
                b',' => {
                    *self = Self::Done;
                    return;
                }
                _ => *self = Self::Outside { prev: 0 },
            }
        }

        if results.is_full() {
            return;
        }

        match self {
            Self::AwaitingFirst | Self::Done => {}
            Self::Outside { prev } => match c {
                b'(' => {
                    *self = Self::Inside {
                        term: Term::Status,
                        status: 0,
                        entry: ScannedOperator::default(),
                    }
                }
                // `,,` separates the operator list from the supported
                // modes and formats.
                b',' if *prev == b',' => *self = Self::Done,
                _ => *prev = c,
            },
            Self::Inside {
                term,
                status,
                entry,
            } => match c {
                b')' => {
                    entry.status = OperatorStatus::from(*status);
                    results.push(core::mem::take(entry)).ok();
                    *self = Self::Outside { prev: b')' };
                }
                b',' => *term = term.next(),
                b'"' => {}
                c => match term {
                    Term::Status => {
                        if c.is_ascii_digit() {
                            *status = status.wrapping_mul(10).wrapping_add(u32::from(c - b'0'));
                        }
                    }
                    Term::LongName => {
                        entry.long_name.push(c as char).ok();
                    }
                    Term::ShortName => {
                        entry.short_name.push(c as char).ok();
                    }
                    Term::Numeric => {
                        if c.is_ascii_digit() {
                            entry.numeric = entry
                                .numeric
                                .wrapping_mul(10)
                                .wrapping_add(u32::from(c - b'0'));
                        }
                    }
                    Term::Ignored => {}
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan<const N: usize>(line: &[u8]) -> (CopsScan, Vec<ScannedOperator, N>) {
        let mut machine = CopsScan::default();
        machine.reset();
        let mut results = Vec::new();
        for &c in line {
            machine.feed(c, &mut results);
        }
        (machine, results)
    }

    #[test]
    fn single_operator() {
        let (_, results) = scan::<4>(b"(1,\"Operator A\",\"OpA\",310260)");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, OperatorStatus::Available);
        assert_eq!(results[0].long_name.as_str(), "Operator A");
        assert_eq!(results[0].short_name.as_str(), "OpA");
        assert_eq!(results[0].numeric, 310260);
    }

    #[test]
    fn full_line_with_trailer() {
        let (machine, results) = scan::<4>(
            b" (2,\"Telia\",\"Telia\",\"24001\",7),(3,\"Tre\",\"3 SE\",\"24002\",7),,(0,1,2,3,4),(0,1,2)",
        );
        assert!(machine.is_done());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, OperatorStatus::Current);
        assert_eq!(results[0].numeric, 24001);
        assert_eq!(results[1].status, OperatorStatus::Forbidden);
        assert_eq!(results[1].short_name.as_str(), "3 SE");
    }

    #[test]
    fn leading_comma_means_no_operators() {
        let (machine, results) = scan::<4>(b",,(0,1,2,3,4),(0,1,2)");
        assert!(machine.is_done());
        assert!(results.is_empty());
    }

    #[test]
    fn stops_when_results_are_full() {
        let (_, results) = scan::<1>(b"(1,\"A\",\"A\",1),(1,\"B\",\"B\",2)");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].long_name.as_str(), "A");
    }

    #[test]
    fn reset_between_scans() {
        let mut machine = CopsScan::default();
        let mut results: Vec<ScannedOperator, 2> = Vec::new();
        for &c in b",," {
            machine.feed(c, &mut results);
        }
        assert!(machine.is_done());

        machine.reset();
        for &c in b"(1,\"B\",\"B\",2)" {
            machine.feed(c, &mut results);
        }
        assert_eq!(results.len(), 1);
    }
}
