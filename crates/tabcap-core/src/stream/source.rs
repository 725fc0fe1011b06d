//! Capture sources backed by the pcap collaborator.
//!
//! These wrappers own the underlying capture handle exclusively and expose
//! the minimal capability set the aggregator needs: apply a filter, pull the
//! next frame, report the link-layer framing.

use std::path::Path;

use pcap::{Active, Capture, Linktype, Offline};

use super::error::SourceError;
use crate::packet::LinkLayer;
use crate::record::RawFrame;

/// Capability set the stream aggregator requires from a capture source.
pub trait CaptureSource {
    /// Compile and apply a BPF filter expression to the source.
    fn set_filter(&mut self, expression: &str) -> Result<(), SourceError>;

    /// Pull the next frame, blocking until one arrives. `Ok(None)` signals
    /// source exhaustion (offline end-of-file).
    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError>;

    /// Link-layer framing of every frame this source delivers.
    fn link_layer(&self) -> LinkLayer;
}

/// Tuning parameters for live capture.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Maximum captured bytes per frame (snapshot length).
    pub max_packet: i32,
    /// Read timeout handed to the capture source, in milliseconds.
    pub timeout_ms: i32,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            max_packet: 65536,
            timeout_ms: 1000,
        }
    }
}

/// Real-time capture from a network interface.
pub struct LiveSource {
    capture: Capture<Active>,
    link: LinkLayer,
}

impl LiveSource {
    /// Open `interface` for live capture. Promiscuous mode is always on.
    pub fn open(interface: &str, config: &LiveConfig) -> Result<Self, SourceError> {
        let capture = Capture::from_device(interface)?
            .promisc(true)
            .snaplen(config.max_packet)
            .timeout(config.timeout_ms)
            .open()?;
        let link = link_layer_of(capture.get_datalink())?;
        Ok(Self { capture, link })
    }
}

impl CaptureSource for LiveSource {
    fn set_filter(&mut self, expression: &str) -> Result<(), SourceError> {
        Ok(self.capture.filter(expression, true)?)
    }

    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError> {
        loop {
            match self.capture.next_packet() {
                Ok(packet) => return Ok(Some(raw_frame(&packet))),
                // The read timeout bounds one poll, not the capture; keep
                // blocking until a frame arrives.
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(pcap::Error::NoMorePackets) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn link_layer(&self) -> LinkLayer {
        self.link
    }
}

/// Replay from a previously saved capture file.
pub struct FileSource {
    capture: Capture<Offline>,
    link: LinkLayer,
}

impl FileSource {
    /// Open a capture file for replay.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let capture = Capture::from_file(path)?;
        let link = link_layer_of(capture.get_datalink())?;
        Ok(Self { capture, link })
    }
}

impl CaptureSource for FileSource {
    fn set_filter(&mut self, expression: &str) -> Result<(), SourceError> {
        Ok(self.capture.filter(expression, true)?)
    }

    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError> {
        match self.capture.next_packet() {
            Ok(packet) => Ok(Some(raw_frame(&packet))),
            Err(pcap::Error::NoMorePackets) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn link_layer(&self) -> LinkLayer {
        self.link
    }
}

fn raw_frame(packet: &pcap::Packet<'_>) -> RawFrame {
    RawFrame {
        ts_sec: packet.header.ts.tv_sec as i64,
        ts_usec: packet.header.ts.tv_usec as i64,
        data: packet.data.to_vec(),
    }
}

fn link_layer_of(linktype: Linktype) -> Result<LinkLayer, SourceError> {
    match linktype {
        Linktype::ETHERNET => Ok(LinkLayer::Ethernet),
        Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => Ok(LinkLayer::Raw),
        Linktype::NULL | Linktype::LOOP => Ok(LinkLayer::Null),
        other => Err(SourceError::UnsupportedLinkType {
            name: other
                .get_name()
                .unwrap_or_else(|_| format!("linktype {}", other.0)),
        }),
    }
}
