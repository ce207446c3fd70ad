//! Feature detection: which optional platform capabilities the host offers.
//!
//! Each capability has one predicate in `PREDICATES`. Predicates only look
//! at the shape of the host (is a global defined, is it callable, does a CSS
//! query pass); they never call into the feature. A probe that errors counts
//! as unsupported.
//!
//! Architecture:
//! - `host.rs`: HostEnvironment trait and the declarative HostProfile
//! - `error.rs`: ProbeError

pub mod error;
pub mod host;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use host::HostEnvironment;

/// An optional platform capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    IntersectionObserver,
    ResizeObserver,
    ViewTransitions,
    Wasm,
    WebCrypto,
    WebGpu,
    WebRtc,
    FileSystemAccess,
    WebShare,
    ContainerQueries,
    HasSelector,
}

const CAPABILITY_COUNT: usize = 11;

impl Capability {
    /// Every capability, in canonical order.
    pub const ALL: [Capability; CAPABILITY_COUNT] = [
        Capability::IntersectionObserver,
        Capability::ResizeObserver,
        Capability::ViewTransitions,
        Capability::Wasm,
        Capability::WebCrypto,
        Capability::WebGpu,
        Capability::WebRtc,
        Capability::FileSystemAccess,
        Capability::WebShare,
        Capability::ContainerQueries,
        Capability::HasSelector,
    ];

    /// Key used in the published feature map.
    pub fn name(self) -> &'static str {
        match self {
            Capability::IntersectionObserver => "intersectionObserver",
            Capability::ResizeObserver => "resizeObserver",
            Capability::ViewTransitions => "viewTransitions",
            Capability::Wasm => "wasm",
            Capability::WebCrypto => "webCrypto",
            Capability::WebGpu => "webGPU",
            Capability::WebRtc => "webRTC",
            Capability::FileSystemAccess => "fileSystemAccess",
            Capability::WebShare => "webShare",
            Capability::ContainerQueries => "containerQueries",
            Capability::HasSelector => "hasSelector",
        }
    }

    /// Name used in document-root CSS hooks.
    pub fn css_name(self) -> &'static str {
        match self {
            Capability::IntersectionObserver => "intersection-observer",
            Capability::ResizeObserver => "resize-observer",
            Capability::ViewTransitions => "view-transitions",
            Capability::Wasm => "wasm",
            Capability::WebCrypto => "web-crypto",
            Capability::WebGpu => "webgpu",
            Capability::WebRtc => "webrtc",
            Capability::FileSystemAccess => "file-system-access",
            Capability::WebShare => "web-share",
            Capability::ContainerQueries => "container-queries",
            Capability::HasSelector => "has-selector",
        }
    }

    /// Look up a capability by its feature-map key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable capability flags for one page/session.
///
/// Every capability always has a flag; there is no partial map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityMap {
    flags: [bool; CAPABILITY_COUNT],
}

impl CapabilityMap {
    /// Whether the host supports `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.flags[capability.index()]
    }

    /// All (capability, flag) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        Capability::ALL.into_iter().map(|c| (c, self.supports(c)))
    }

    /// Supported capabilities in canonical order.
    pub fn supported(&self) -> impl Iterator<Item = Capability> + '_ {
        self.iter().filter(|(_, on)| *on).map(|(c, _)| c)
    }

    /// Class list for the document root: `supports-<name>` or `no-<name>`
    /// for each capability.
    pub fn html_classes(&self) -> String {
        self.iter()
            .map(|(c, on)| {
                let prefix = if on { "supports" } else { "no" };
                format!("{prefix}-{}", c.css_name())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[cfg(test)]
    pub(crate) fn from_flags(pairs: &[(Capability, bool)]) -> Self {
        let mut flags = [false; CAPABILITY_COUNT];
        for (c, on) in pairs {
            flags[c.index()] = *on;
        }
        Self { flags }
    }
}

impl Serialize for CapabilityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CAPABILITY_COUNT))?;
        for (c, on) in self.iter() {
            map.serialize_entry(c.name(), &on)?;
        }
        map.end()
    }
}

type Predicate = fn(&dyn HostEnvironment) -> bool;

const PREDICATES: [(Capability, Predicate); CAPABILITY_COUNT] = [
    (Capability::IntersectionObserver, intersection_observer),
    (Capability::ResizeObserver, resize_observer),
    (Capability::ViewTransitions, view_transitions),
    (Capability::Wasm, wasm),
    (Capability::WebCrypto, web_crypto),
    (Capability::WebGpu, web_gpu),
    (Capability::WebRtc, web_rtc),
    (Capability::FileSystemAccess, file_system_access),
    (Capability::WebShare, web_share),
    (Capability::ContainerQueries, container_queries),
    (Capability::HasSelector, has_selector),
];

/// Probe the host once for every capability.
pub fn detect_features(host: &dyn HostEnvironment) -> CapabilityMap {
    let mut flags = [false; CAPABILITY_COUNT];
    for (capability, probe) in PREDICATES {
        flags[capability.index()] = probe(host);
    }
    let map = CapabilityMap { flags };
    debug!(classes = %map.html_classes(), "feature detection complete");
    map
}

fn defined(host: &dyn HostEnvironment, path: &[&str]) -> bool {
    match host.lookup(path) {
        Ok(value) => value.is_defined(),
        Err(e) => {
            debug!("probe {} failed: {e}", path.join("."));
            false
        }
    }
}

fn callable(host: &dyn HostEnvironment, path: &[&str]) -> bool {
    match host.lookup(path) {
        Ok(value) => value.is_callable(),
        Err(e) => {
            debug!("probe {} failed: {e}", path.join("."));
            false
        }
    }
}

fn css_supports(host: &dyn HostEnvironment, condition: &str) -> bool {
    match host.css_supports(condition) {
        Ok(supported) => supported,
        Err(e) => {
            debug!("css probe '{condition}' failed: {e}");
            false
        }
    }
}

fn intersection_observer(host: &dyn HostEnvironment) -> bool {
    defined(host, &["IntersectionObserver"])
}

fn resize_observer(host: &dyn HostEnvironment) -> bool {
    defined(host, &["ResizeObserver"])
}

fn view_transitions(host: &dyn HostEnvironment) -> bool {
    defined(host, &["document", "startViewTransition"])
}

fn wasm(host: &dyn HostEnvironment) -> bool {
    defined(host, &["WebAssembly"]) && callable(host, &["WebAssembly", "instantiate"])
}

fn web_crypto(host: &dyn HostEnvironment) -> bool {
    callable(host, &["crypto", "subtle", "digest"])
}

fn web_gpu(host: &dyn HostEnvironment) -> bool {
    defined(host, &["navigator", "gpu"])
}

fn web_rtc(host: &dyn HostEnvironment) -> bool {
    defined(host, &["RTCPeerConnection"])
}

fn file_system_access(host: &dyn HostEnvironment) -> bool {
    defined(host, &["showOpenFilePicker"])
}

fn web_share(host: &dyn HostEnvironment) -> bool {
    defined(host, &["navigator", "share"])
}

fn container_queries(host: &dyn HostEnvironment) -> bool {
    css_supports(host, "container-type: inline-size")
}

fn has_selector(host: &dyn HostEnvironment) -> bool {
    css_supports(host, "selector(:has(*))")
}
