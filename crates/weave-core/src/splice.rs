//! Region splicing: verbatim line ranges interleaved with generated blocks.

use crate::{Region, Result, WeaveError};

/// The new content of a file, as an ordered sequence of chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRewritePlan {
    chunks: Vec<String>,
    generated_blocks: usize,
}

impl FileRewritePlan {
    /// Chunks in output order: original lines (with their terminators) and
    /// generated blocks.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Number of generated blocks in the plan.
    pub fn generated_blocks(&self) -> usize {
        self.generated_blocks
    }

    /// The full file content.
    pub fn content(&self) -> String {
        self.chunks.concat()
    }

    fn push_verbatim<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.chunks
            .extend(lines.iter().map(|l| l.as_ref().to_string()));
    }

    fn push_block(&mut self, mut block: String, eol: &str) {
        if !block.ends_with('\n') {
            block.push_str(eol);
        }
        self.chunks.push(block);
        self.generated_blocks += 1;
    }
}

/// Build the rewrite plan for `lines` given its regions in file order.
///
/// Each region's lines are dropped and replaced with one block per target
/// of its directive. A generator returning `None` contributes nothing; a
/// block that does not end in a newline gets the start marker line's
/// terminator, so an empty string becomes an empty line.
pub fn splice<S: AsRef<str>>(lines: &[S], regions: &[Region<'_>]) -> Result<FileRewritePlan> {
    let mut plan = FileRewritePlan::default();
    let mut cursor = 0;

    for region in regions {
        plan.push_verbatim(&lines[cursor..region.start]);
        let eol = line_terminator(region.start.checked_sub(1).and_then(|i| lines.get(i)));

        if let Some(generator) = region.directive.generator() {
            for (label, descriptor) in region.directive.targets() {
                let block = generator
                    .generate(descriptor)
                    .map_err(|e| WeaveError::Generator {
                        name: region.directive.generator_name().to_string(),
                        label: label.to_string(),
                        message: e.to_string(),
                    })?;

                if let Some(block) = block {
                    plan.push_block(block, eol);
                }
            }
        }

        cursor = region.end;
    }

    plan.push_verbatim(&lines[cursor..]);
    Ok(plan)
}

fn line_terminator<S: AsRef<str>>(marker: Option<&S>) -> &'static str {
    match marker {
        Some(line) if line.as_ref().ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}
