//! The carrier's FTPS server

use super::{TimetableSource, extract_timetable, resolve_credentials};
use crate::app::services::version_tracker::parse_mdtm;
use crate::constants::{FTP_HOST, FTP_PORT};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use suppaftp::native_tls::TlsConnector;
use suppaftp::types::FileType;
use suppaftp::{NativeTlsConnector, NativeTlsFtpStream, Status};
use tracing::{debug, info, warn};

fn upstream(message: impl Into<String>, e: suppaftp::FtpError) -> Error {
    Error::upstream(message, Some(Box::new(e)))
}

/// Timetable archive on the carrier's FTPS server
pub struct FtpTimetableSource {
    remote_path: String,
    stream: Option<NativeTlsFtpStream>,
}

impl FtpTimetableSource {
    pub fn new(remote_path: impl Into<String>) -> Self {
        Self {
            remote_path: remote_path.into(),
            stream: None,
        }
    }

    /// Open a protected session, reusing it between calls
    fn session(&mut self) -> Result<&mut NativeTlsFtpStream> {
        if self.stream.is_none() {
            let credentials = resolve_credentials()?;
            debug!("Connecting to {}:{}", FTP_HOST, FTP_PORT);

            let plain = NativeTlsFtpStream::connect((FTP_HOST, FTP_PORT))
                .map_err(|e| upstream(format!("Failed to connect to {}", FTP_HOST), e))?;
            let connector = TlsConnector::new()
                .map_err(|e| Error::upstream("Failed to set up TLS", Some(Box::new(e))))?;
            let mut stream = plain
                .into_secure(NativeTlsConnector::from(connector), FTP_HOST)
                .map_err(|e| upstream("Failed to secure the FTP session", e))?;
            stream
                .login(&credentials.username, &credentials.password)
                .map_err(|e| upstream("FTP login rejected", e))?;

            // The server advertises unroutable addresses in PASV replies
            stream.set_passive_nat_workaround(true);
            stream
                .transfer_type(FileType::Binary)
                .map_err(|e| upstream("Failed to switch to binary mode", e))?;

            info!("Logged in to {}", FTP_HOST);
            self.stream = Some(stream);
        }

        self.stream
            .as_mut()
            .ok_or_else(|| Error::upstream("FTP session unavailable", None))
    }
}

impl TimetableSource for FtpTimetableSource {
    fn describe(&self) -> String {
        format!("ftps://{}/{}", FTP_HOST, self.remote_path)
    }

    fn modified(&mut self) -> Result<DateTime<Utc>> {
        let command = format!("MDTM {}", self.remote_path);
        let response = self
            .session()?
            .custom_command(command, &[Status::File])
            .map_err(|e| upstream("MDTM request failed", e))?;
        parse_mdtm(&String::from_utf8_lossy(&response.body))
    }

    fn fetch(&mut self, workdir: &Path) -> Result<PathBuf> {
        let remote_path = self.remote_path.clone();
        let buffer = self
            .session()?
            .retr_as_buffer(&remote_path)
            .map_err(|e| upstream(format!("Failed to download {}", remote_path), e))?;
        info!(
            "Downloaded {} ({} bytes)",
            remote_path,
            buffer.get_ref().len()
        );

        extract_timetable(buffer, workdir)
    }
}

impl Drop for FtpTimetableSource {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.quit() {
                warn!("Failed to close FTP session: {}", e);
            }
        }
    }
}
