//! Marker scanning.
//!
//! A single forward pass over a file's lines that pairs each start marker
//! with the next end marker. Directives are resolved as soon as their start
//! marker is seen, so a bad directive fails before anything is spliced.

use crate::{Directive, DirectiveResolver, MarkerSyntax, Result, WeaveError};
use tracing::{debug, warn};

/// A half-open line range `[start, end)` whose contents get replaced.
///
/// `start` is the index of the line after the start marker and `end` the
/// index of the end marker line, so both markers survive a splice.
#[derive(Debug)]
pub struct Region<'a> {
    pub start: usize,
    pub end: usize,
    pub directive: Directive<'a>,
}

/// Result of scanning one file.
#[derive(Debug, Default)]
pub struct Scan<'a> {
    /// Complete regions, in file order.
    pub regions: Vec<Region<'a>>,
    /// 1-based line of a start marker that was never closed.
    pub unterminated: Option<usize>,
}

enum State<'a> {
    Searching,
    Inside {
        start: usize,
        marker_line: usize,
        directive: Directive<'a>,
    },
}

/// Scan `lines` for regions, resolving each start marker with `resolver`.
pub fn scan<'r, S: AsRef<str>>(
    lines: &[S],
    markers: &MarkerSyntax,
    resolver: &'r dyn DirectiveResolver,
) -> Result<Scan<'r>> {
    let mut scan = Scan::default();
    let mut state = State::Searching;

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let line_no = idx + 1;

        state = match state {
            State::Searching if line.contains(markers.start.as_str()) => {
                let directive = resolver.resolve(line, line_no)?;
                State::Inside {
                    start: idx + 1,
                    marker_line: line_no,
                    directive,
                }
            }
            State::Searching => State::Searching,
            State::Inside {
                start, directive, ..
            } if line.contains(markers.end.as_str()) => {
                debug!(start, end = idx, generator = directive.generator_name(), "Found region");
                scan.regions.push(Region {
                    start,
                    end: idx,
                    directive,
                });
                State::Searching
            }
            State::Inside { .. } if line.contains(markers.start.as_str()) => {
                return Err(WeaveError::NestedMarker { line: line_no });
            }
            inside @ State::Inside { .. } => inside,
        };
    }

    if let State::Inside { marker_line, .. } = state {
        warn!(line = marker_line, "Start marker is never closed, leaving the rest of the file as is");
        scan.unterminated = Some(marker_line);
    }

    Ok(scan)
}
