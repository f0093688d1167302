//! Physical actuation: newline-delimited ASCII to a servo controller.
//!
//! Wire format: one command per line, comma-joined integer degrees root to
//! tip (`"90,180\n"`); the controller answers with a single acknowledgement
//! line. There is no further framing.

use std::io::{BufRead, Write};

use crate::error::DeviceError;

/// Line-oriented transport with an explicit open/close lifecycle.
pub trait DeviceChannel {
    fn open(&mut self) -> Result<(), DeviceError>;
    fn close(&mut self) -> Result<(), DeviceError>;
    fn is_open(&self) -> bool;
    /// Send `text` as one line; the terminator is appended here.
    fn write(&mut self, text: &str) -> Result<(), DeviceError>;
    /// Next line without its terminator.
    fn readline(&mut self) -> Result<String, DeviceError>;
}

/// Channel over any reader/writer pair (serial device file, pipe, socket,
/// in-memory buffers in tests). Starts closed.
#[derive(Debug)]
pub struct StreamChannel<R, W> {
    reader: R,
    writer: W,
    open: bool,
}

impl<R: BufRead, W: Write> StreamChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            open: false,
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn ensure_open(&self) -> Result<(), DeviceError> {
        if self.open {
            Ok(())
        } else {
            Err(DeviceError::Closed)
        }
    }
}

impl<R: BufRead, W: Write> DeviceChannel for StreamChannel<R, W> {
    fn open(&mut self) -> Result<(), DeviceError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if self.open {
            self.writer.flush()?;
            self.open = false;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write(&mut self, text: &str) -> Result<(), DeviceError> {
        self.ensure_open()?;
        self.writer.write_all(text.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn readline(&mut self) -> Result<String, DeviceError> {
        self.ensure_open()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(DeviceError::EmptyReply);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}

/// Round reported angles to whole degrees for the wire.
pub fn degrees_to_command(degrees: &[f64]) -> Vec<i32> {
    degrees.iter().map(|d| d.round() as i32).collect()
}

/// `[90, 180]` → `"90,180"`.
pub fn format_command(angles: &[i32]) -> String {
    angles
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Servo controller driven over a [`DeviceChannel`].
#[derive(Debug)]
pub struct ArmController<C> {
    channel: C,
}

impl<C: DeviceChannel> ArmController<C> {
    /// Rest pose sent by [`ArmController::reset`].
    pub const HOME: [i32; 2] = [0, 90];

    /// Open `channel` and wrap it.
    pub fn connect(mut channel: C) -> Result<Self, DeviceError> {
        channel.open()?;
        tracing::debug!("device channel opened");
        Ok(Self { channel })
    }

    /// Command every servo and return the controller's acknowledgement.
    pub fn move_to(&mut self, angles: &[i32]) -> Result<String, DeviceError> {
        let command = format_command(angles);
        self.channel.write(&command)?;
        let ack = self.channel.readline()?;
        tracing::debug!(%command, %ack, "device ack");
        Ok(ack)
    }

    pub fn reset(&mut self) -> Result<String, DeviceError> {
        self.move_to(&Self::HOME)
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_open()
    }

    pub fn close(&mut self) -> Result<(), DeviceError> {
        self.channel.close()
    }

    pub fn into_inner(self) -> C {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    type Mem = StreamChannel<Cursor<Vec<u8>>, Vec<u8>>;

    fn channel(replies: &str) -> Mem {
        StreamChannel::new(Cursor::new(replies.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn command_formatting() {
        assert_eq!(format_command(&[90, 180]), "90,180");
        assert_eq!(format_command(&[]), "");
        assert_eq!(degrees_to_command(&[89.6, 0.4, -0.6]), vec![90, 0, -1]);
    }

    #[test]
    fn closed_channel_refuses_io() {
        let mut ch = channel("ok\n");
        assert!(matches!(ch.write("1"), Err(DeviceError::Closed)));
        assert!(matches!(ch.readline(), Err(DeviceError::Closed)));
    }

    #[test]
    fn controller_round_trip() {
        let mut ctl = ArmController::connect(channel("moved\r\nhome\n")).unwrap();
        assert!(ctl.is_connected());
        assert_eq!(ctl.move_to(&[90, 180]).unwrap(), "moved");
        assert_eq!(ctl.reset().unwrap(), "home");
        // Reply stream exhausted.
        assert!(matches!(ctl.move_to(&[1, 2]), Err(DeviceError::EmptyReply)));
        ctl.close().unwrap();
        assert!(!ctl.is_connected());

        let (_, written) = ctl.into_inner().into_parts();
        assert_eq!(String::from_utf8(written).unwrap(), "90,180\n0,90\n1,2\n");
    }
}
