//! # n-editor: editor core for n-mark
//!
//! Everything the editor knows lives here; nothing in this crate talks to
//! the terminal.
//!
//! - **[`position`]**: `Position` (line, col), 0-indexed, columns in chars
//! - **[`buffer`]**: `Buffer` wrapping a rope with total editing primitives
//! - **[`file`]**: load guards (size, binary sniffing), backups, typed errors
//! - **[`cursor`]**: cursor with sticky column and motions
//! - **[`word`]**: `w` / `b` / `e` word motions
//! - **[`viewport`]**: scroll offsets that keep the cursor on screen
//! - **[`mode`]**: `Normal` / `Insert` and the editor / preview tabs
//! - **[`keymap`]**: pure key-to-command resolution
//! - **[`session`]**: the owned session state and command dispatcher
//! - **[`paste`]** / **[`clipboard`]**: paste splicing and clipboard reads
//! - **[`code_span`]**: lazily rebuilt index of fenced code blocks
//! - **[`markdown`]** / **[`highlight`]**: line styling and code tokens
//! - **[`config`]**: user preferences from TOML

pub mod buffer;
pub mod clipboard;
pub mod code_span;
pub mod config;
pub mod cursor;
pub mod file;
pub mod highlight;
pub mod keymap;
pub mod markdown;
pub mod mode;
pub mod paste;
pub mod position;
pub mod session;
pub mod viewport;
pub mod word;
