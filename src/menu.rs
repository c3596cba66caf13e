use crate::config::Profile;
use crate::error::Result;
use crate::session::Tube;

/// The challenge's heap menu: create, edit, delete and view slots.
pub struct Menu<'a> {
    tube: &'a mut Tube,
    menu_prompt: Vec<u8>,
    value_prompt: Vec<u8>,
}

impl<'a> Menu<'a> {
    pub fn new(tube: &'a mut Tube, profile: &Profile) -> Self {
        Self {
            tube,
            menu_prompt: profile.menu_prompt.clone().into_bytes(),
            value_prompt: profile.value_prompt.clone().into_bytes(),
        }
    }

    pub fn create(&mut self, size: usize, value: impl AsRef<[u8]>) -> Result<()> {
        self.tube.send_line_after(&self.menu_prompt, size.to_string())?;
        self.tube.send_line_after(&self.value_prompt, value)?;
        Ok(())
    }

    pub fn edit(&mut self, index: usize, value: impl AsRef<[u8]>) -> Result<()> {
        self.tube.send_line_after(&self.menu_prompt, index.to_string())?;
        self.tube.send_line_after(&self.value_prompt, value)?;
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<()> {
        self.tube.send_line_after(&self.menu_prompt, index.to_string())?;
        Ok(())
    }

    /// Returns the slot's content line, newline included.
    pub fn view(&mut self, index: usize) -> Result<Vec<u8>> {
        self.tube.send_line_after(&self.menu_prompt, index.to_string())?;
        self.tube.recv_until(&self.value_prompt)?;
        self.tube.recv_line()
    }
}

/// Little-endian integer from up to eight leaked bytes.
pub fn unpack_le(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}
