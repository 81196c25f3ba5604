//! Live capture driver: opens an interface, feeds captured frames to a
//! packet handler one at a time and mirrors every frame into a
//! timestamped pcap dump.

use crate::error::{PtridError, Result};
use chrono::Local;
use log::{debug, info};
use pcap::{Active, Capture, Device, Linktype, PacketHeader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Read timeout for one poll of the capture handle, in milliseconds.
const READ_TIMEOUT_MS: i32 = 1000;

/// Names of every capture device the library reports.
pub fn available_interfaces() -> Result<Vec<String>> {
    Ok(Device::list()?.into_iter().map(|d| d.name).collect())
}

pub struct Sniffer {
    capture: Capture<Active>,
    interface: String,
    save_dir: PathBuf,
}

impl Sniffer {
    /// Opens `interface` and verifies it captures Ethernet frames.
    pub fn open(
        interface: &str,
        save_dir: &Path,
        snaplen: i32,
        promiscuous: bool,
    ) -> Result<Self> {
        let capture = Capture::from_device(interface)?
            .promisc(promiscuous)
            .snaplen(snaplen)
            .timeout(READ_TIMEOUT_MS)
            .open()?;
        if capture.get_datalink() != Linktype::ETHERNET {
            return Err(PtridError::InvalidInput(format!(
                "interface {interface} does not use an Ethernet link layer"
            )));
        }
        Ok(Self {
            capture,
            interface: interface.to_string(),
            save_dir: save_dir.to_path_buf(),
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Runs the capture loop for `duration`, invoking `handler` for
    /// every frame and appending each one to the dump file. The loop
    /// suspends only between packets; read timeouts just poll the
    /// clock. Returns the dump path.
    pub fn run<F>(&mut self, duration: Duration, mut handler: F) -> Result<PathBuf>
    where
        F: FnMut(&PacketHeader, &[u8]),
    {
        let dump_path = self.dump_name();
        info!("writing packets to {}", dump_path.display());
        let mut dump = self.capture.savefile(&dump_path)?;

        let start = Instant::now();
        let mut packet_count: u64 = 0;
        while start.elapsed() < duration {
            let packet = match self.capture.next_packet() {
                Ok(packet) => packet,
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(e) => return Err(e.into()),
            };
            packet_count += 1;
            debug!("packet {packet_count}: {} captured bytes", packet.header.caplen);
            handler(packet.header, packet.data);
            dump.write(&packet);
        }
        info!("capture finished after {packet_count} packets");
        Ok(dump_path)
    }

    /// `<save_dir>/<Www_Mmm_dd_HH_MM_SS_yyyy>.pcap`
    fn dump_name(&self) -> PathBuf {
        let stamp = Local::now().format("%a_%b_%d_%H_%M_%S_%Y");
        self.save_dir.join(format!("{stamp}.pcap"))
    }
}
