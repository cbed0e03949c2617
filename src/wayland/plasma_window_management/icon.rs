use std::fs::File;
use std::io::{self, Write};
use std::os::unix::io::OwnedFd;
use std::thread::{self, JoinHandle};

use tracing::warn;

/// Icon of a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowIcon {
    /// An icon of the icon theme, by name
    Themed(String),
    /// A pixel icon
    Pixels {
        /// width in pixels
        width: u32,
        /// height in pixels
        height: u32,
        /// ARGB32 pixels, row after row
        data: Vec<u8>,
    },
}

impl WindowIcon {
    /// The themed icon name, empty for pixel icons
    pub fn themed_name(&self) -> &str {
        match self {
            WindowIcon::Themed(name) => name,
            WindowIcon::Pixels { .. } => "",
        }
    }
}

/// Serialized form of an icon, as written by `get_icon`
pub(crate) fn serialize(icon: Option<&WindowIcon>) -> Vec<u8> {
    match icon {
        None => Vec::new(),
        Some(WindowIcon::Themed(name)) => {
            let mut out = Vec::with_capacity(4 + name.len());
            out.extend_from_slice(b"THEM");
            out.extend_from_slice(name.as_bytes());
            out
        }
        Some(WindowIcon::Pixels { width, height, data }) => {
            let mut out = Vec::with_capacity(12 + data.len());
            out.extend_from_slice(b"ARGB");
            out.extend_from_slice(&width.to_le_bytes());
            out.extend_from_slice(&height.to_le_bytes());
            out.extend_from_slice(data);
            out
        }
    }
}

/// Write the icon into `fd` on a background thread, the fd is closed afterwards
pub(crate) fn spawn_writer(icon: Option<WindowIcon>, fd: OwnedFd) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("plasma-window-icon".into())
        .spawn(move || {
            let bytes = serialize(icon.as_ref());
            if bytes.is_empty() {
                return;
            }
            let mut file = File::from(fd);
            if let Err(err) = file.write_all(&bytes) {
                warn!(%err, "Failed to write the window icon");
            }
        })
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Seek, SeekFrom};

    use super::*;

    #[test]
    fn serialized_formats() {
        assert!(serialize(None).is_empty());
        assert_eq!(serialize(Some(&WindowIcon::Themed("konsole".into()))), b"THEMkonsole");

        let pixels = WindowIcon::Pixels {
            width: 1,
            height: 2,
            data: vec![0xff, 0, 0, 0xff, 0xff, 0, 0xff, 0],
        };
        let bytes = serialize(Some(&pixels));
        assert_eq!(&bytes[..4], b"ARGB");
        assert_eq!(&bytes[4..8], &[1, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[2, 0, 0, 0]);
        assert_eq!(&bytes[12..], &[0xff, 0, 0, 0xff, 0xff, 0, 0xff, 0]);
    }

    #[test]
    fn writer_fills_the_fd() {
        let mut file = tempfile::tempfile().unwrap();
        let fd = OwnedFd::from(file.try_clone().unwrap());
        spawn_writer(Some(WindowIcon::Themed("dolphin".into())), fd)
            .unwrap()
            .join()
            .unwrap();

        file.seek(SeekFrom::Start(0)).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"THEMdolphin");
    }
}
