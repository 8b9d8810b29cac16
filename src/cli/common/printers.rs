// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information.

use std::{
    borrow::Cow,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::Level;

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

type Block = Vec<Cow<'static, str>>;

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Vec<Block>> = Mutex::new(vec![]);
}

/// A titled tree of lines, logged at the info level, e.g.
///
/// ```text
/// Results
/// ├ mapfile: out/files.mapfile
/// └ num_skipped: 1
/// ```
pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Block>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        log_tree(Level::Info, &self.title, &self.blocks);
    }
}

/// The symbol drawn in front of a line. Only the first line of a block gets a
/// branch; the first line of the final block closes the tree.
fn tree_symbol(i_line: usize, is_last_line: bool, is_last_block: bool) -> char {
    match (i_line, is_last_line, is_last_block) {
        (0, true, true) => UP_AND_RIGHT,
        (0, _, _) => VERTICAL_AND_RIGHT,
        _ => VERTICAL,
    }
}

fn log_tree(level: Level, title: &str, blocks: &[Block]) {
    log::log!(level, "{}", console::style(title).bold());
    let num_blocks = blocks.len();
    for (i_block, block) in blocks.iter().enumerate() {
        let num_lines = block.len();
        for (i_line, line) in block.iter().enumerate() {
            let symbol = tree_symbol(i_line, i_line + 1 == num_lines, i_block + 1 == num_blocks);
            log::log!(level, "{symbol} {line}");
        }
    }
    log::log!(level, "");
}

fn warnings() -> MutexGuard<'static, Vec<Block>> {
    // Warnings are only appended or drained; a poisoned lock's data is still
    // usable.
    WARNINGS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Defer a warning until [`display_warnings`] is called.
pub(crate) trait Warn {
    fn warn(self);
}

impl Warn for &'static str {
    fn warn(self) {
        warnings().push(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        warnings().push(vec![self.into()]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        warnings().push(self);
    }
}

/// Print out any warnings that have been collected as step arguments have been
/// parsed. This should only be called once, after all arguments have been
/// parsed into parameters.
pub(crate) fn display_warnings() {
    log::debug!("Displaying warnings");
    let blocks = std::mem::take(&mut *warnings());
    if !blocks.is_empty() {
        log_tree(Level::Warn, "Warnings", &blocks);
    }
}
