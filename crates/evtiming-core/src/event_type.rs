//! Supported event registry
//!
//! Maps raw platform event names (`topClick`, `topKeyDown`, ...) to the public
//! event type reported in timing entries (`click`, `keydown`, ...). The set
//! follows the W3C Event Timing list of exposed events. Some of these are not
//! dispatched by every host yet; they are mapped anyway so hosts can adopt
//! them without touching the registry.
//!
//! The table is immutable and built once on first use. Lookups compare full
//! strings, so two raw names can never alias each other.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Raw platform name and public event type, in registry order
const SUPPORTED_EVENTS: &[(&str, &str)] = &[
    ("topAuxClick", "auxclick"),
    ("topClick", "click"),
    ("topContextMenu", "contextmenu"),
    ("topDblClick", "dblclick"),
    ("topMouseDown", "mousedown"),
    ("topMouseEnter", "mouseenter"),
    ("topMouseLeave", "mouseleave"),
    ("topMouseOut", "mouseout"),
    ("topMouseOver", "mouseover"),
    ("topMouseUp", "mouseup"),
    ("topPointerOver", "pointerover"),
    ("topPointerEnter", "pointerenter"),
    ("topPointerDown", "pointerdown"),
    ("topPointerUp", "pointerup"),
    ("topPointerCancel", "pointercancel"),
    ("topPointerOut", "pointerout"),
    ("topPointerLeave", "pointerleave"),
    ("topGotPointerCapture", "gotpointercapture"),
    ("topLostPointerCapture", "lostpointercapture"),
    ("topTouchStart", "touchstart"),
    ("topTouchEnd", "touchend"),
    ("topTouchCancel", "touchcancel"),
    ("topKeyDown", "keydown"),
    ("topKeyPress", "keypress"),
    ("topKeyUp", "keyup"),
    ("topBeforeInput", "beforeinput"),
    ("topInput", "input"),
    ("topCompositionStart", "compositionstart"),
    ("topCompositionUpdate", "compositionupdate"),
    ("topCompositionEnd", "compositionend"),
    ("topDragStart", "dragstart"),
    ("topDragEnd", "dragend"),
    ("topDragEnter", "dragenter"),
    ("topDragLeave", "dragleave"),
    ("topDragOver", "dragover"),
    ("topDrop", "drop"),
];

fn registry() -> &'static HashMap<&'static str, &'static str> {
    static REGISTRY: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    REGISTRY.get_or_init(|| SUPPORTED_EVENTS.iter().copied().collect())
}

/// Public event type for a raw platform event name, if it is timed
#[inline]
pub fn reported_name(raw_name: &str) -> Option<&'static str> {
    registry().get(raw_name).copied()
}

/// Is this raw platform event name timed?
#[inline]
pub fn is_supported(raw_name: &str) -> bool {
    registry().contains_key(raw_name)
}

/// All raw platform names in the registry, in declaration order
pub fn supported_raw_names() -> impl Iterator<Item = &'static str> {
    SUPPORTED_EVENTS.iter().map(|(raw, _)| *raw)
}
