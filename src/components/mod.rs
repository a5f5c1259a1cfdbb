//! Components: one command of the command file each
//!
//! A component turns its validated fields into one or more
//! [`TokenLine`]s through [`Component::cmd`]. Several token lines mean the
//! command is emitted as several adjacent instructions in that order (an
//! input grid followed by its read instruction, for instance).

use crate::error::Result;
use crate::render::{render_lines, TokenLine};

pub mod boundary;
pub mod cgrid;
pub mod inpgrid;
pub mod lockup;
pub mod numerics;
pub mod output;
pub mod physics;
pub mod startup;

pub trait Component {
    /// Token lines of the command, in emission order.
    fn cmd(&self) -> Result<Vec<TokenLine>>;

    /// Command text with the line-format policy applied.
    fn render(&self) -> Result<String> {
        Ok(render_lines(&self.cmd()?))
    }
}

impl<T: Component + ?Sized> Component for Box<T> {
    fn cmd(&self) -> Result<Vec<TokenLine>> {
        (**self).cmd()
    }
}
