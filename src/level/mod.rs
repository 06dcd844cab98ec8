//! Level text format.
//!
//! A level is a sequence of equal-width rows:
//!
//! | Char | Meaning |
//! |------|---------|
//! | `#`  | Wall |
//! | `.`  | Path |
//! | ` `  | Blank |
//! | `p`  | Path with a unicorn (players numbered row-major) |
//! | `c`  | Path with a cloud |
//! | `m`  | Path with a marker |
//!
//! ```
//! use unicorn_board::level::Level;
//! use unicorn_board::core::Position;
//!
//! let level = Level::parse(&["#####", "#p.c#", "#####"]).unwrap();
//! assert_eq!(level.unicorns, vec![Position::new(1, 1)]);
//! assert_eq!(level.clouds.len(), 1);
//! ```

mod parser;

pub use parser::{render_rows, Level};
