// SPDX-License-Identifier: MIT
//
// n-term: the terminal layer of n-mark.
//
// Raw mode and the alternate screen over termios, an input parser for
// legacy key sequences and bracketed paste, a cell frame with a row-diffing
// renderer, and the event loop that ties them to an application.
//
// No TUI framework underneath: output is plain ANSI escape sequences
// written by `ansi`, input is the bytes stdin delivers.

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod reader;
pub mod screen;
pub mod style;
pub mod terminal;
